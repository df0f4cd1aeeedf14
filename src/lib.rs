//! # Sales Insight
//!
//! Workspace facade for the sales forecasting crates.
//!
//! - [`math`]: regression families and trailing-window statistics
//! - [`forecast`]: aggregation, features, training and recursive forecasting
//!
//! ## Example
//!
//! ```
//! use sales_insight_workspace::forecast::{ModelFamily, FEATURE_NAMES};
//!
//! let family: ModelFamily = "linear".parse().unwrap();
//! assert_eq!(family, ModelFamily::Linear);
//! assert_eq!(FEATURE_NAMES[0], "year");
//! ```

pub use sales_forecast as forecast;
pub use sales_math as math;
