//! Autoregressive feature engineering over a daily series
//!
//! Each feature row combines calendar fields of its date, the day's carried
//! over metrics, positional sales lags at offsets 1, 7 and 30, trailing
//! sales means over 7 and 30 days (current day included, growing window
//! until full) and a trend index. Rows whose 30-day lag is undefined are
//! dropped, so the first 30 days of a series never produce a row.

use crate::aggregate::DailySeries;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use ndarray::{Array1, Array2};
use sales_math::rolling::trailing_means;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Names of the model inputs, in column order
pub const FEATURE_NAMES: [&str; 19] = [
    "year",
    "month",
    "day",
    "day_of_week",
    "day_of_year",
    "week_of_year",
    "quarter",
    "is_weekend",
    "is_month_start",
    "is_month_end",
    "total_quantity",
    "num_transactions",
    "avg_discount",
    "sales_lag_1",
    "sales_lag_7",
    "sales_lag_30",
    "sales_ma_7",
    "sales_ma_30",
    "trend",
];

/// Largest lag offset; also the number of leading days without a row
pub const MAX_LAG: usize = 30;

const SHORT_WINDOW: usize = 7;
const LONG_WINDOW: usize = 30;

/// Calendar fields derived from a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Monday = 0
    pub day_of_week: u32,
    pub day_of_year: u32,
    /// ISO 8601 week number
    pub week_of_year: u32,
    pub quarter: u32,
    pub is_weekend: bool,
    pub is_month_start: bool,
    pub is_month_end: bool,
}

impl CalendarFeatures {
    /// Derive calendar fields for `date`
    pub fn from_date(date: NaiveDate) -> Self {
        let weekday = date.weekday();
        let is_month_end = date
            .succ_opt()
            .map_or(true, |next| next.month() != date.month());

        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week: weekday.num_days_from_monday(),
            day_of_year: date.ordinal(),
            week_of_year: date.iso_week().week(),
            quarter: (date.month() - 1) / 3 + 1,
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            is_month_start: date.day() == 1,
            is_month_end,
        }
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// One model input row together with its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub calendar: CalendarFeatures,
    pub total_quantity: f64,
    pub num_transactions: f64,
    pub avg_discount: f64,
    pub sales_lag_1: f64,
    pub sales_lag_7: f64,
    pub sales_lag_30: f64,
    pub sales_ma_7: f64,
    pub sales_ma_30: f64,
    /// 0-based position of the day in the daily series
    pub trend: f64,
    /// Total sales of the day
    pub target: f64,
}

impl FeatureRow {
    /// Feature values in `FEATURE_NAMES` order
    pub fn values(&self) -> [f64; 19] {
        let c = &self.calendar;
        [
            f64::from(c.year),
            f64::from(c.month),
            f64::from(c.day),
            f64::from(c.day_of_week),
            f64::from(c.day_of_year),
            f64::from(c.week_of_year),
            f64::from(c.quarter),
            flag(c.is_weekend),
            flag(c.is_month_start),
            flag(c.is_month_end),
            self.total_quantity,
            self.num_transactions,
            self.avg_discount,
            self.sales_lag_1,
            self.sales_lag_7,
            self.sales_lag_30,
            self.sales_ma_7,
            self.sales_ma_30,
            self.trend,
        ]
    }
}

/// Named feature matrix handed to a trained model
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    data: Array2<f64>,
}

impl FeatureMatrix {
    /// Wrap a matrix whose columns are labelled by `names`
    pub fn new(names: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if names.len() != data.ncols() {
            return Err(ForecastError::InvalidInput(format!(
                "{} feature names for {} columns",
                names.len(),
                data.ncols()
            )));
        }
        Ok(Self { names, data })
    }

    /// Matrix of the given rows in `FEATURE_NAMES` order
    pub fn from_rows(rows: &[FeatureRow]) -> Self {
        let values: Vec<[f64; 19]> = rows.iter().map(FeatureRow::values).collect();
        let data = Array2::from_shape_fn((rows.len(), FEATURE_NAMES.len()), |(i, j)| values[i][j]);
        Self {
            names: feature_names(),
            data,
        }
    }

    /// Column names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Raw values, one row per sample
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Number of samples
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }
}

/// Owned copy of `FEATURE_NAMES`
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Ordered feature rows of a daily series
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Build a table from rows that are already in date order
    pub fn from_rows(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    /// Rows, oldest first
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row
    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// Column names of the table's matrix
    pub fn feature_names(&self) -> Vec<String> {
        feature_names()
    }

    /// Dates of the rows
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Feature matrix of every row
    pub fn to_matrix(&self) -> FeatureMatrix {
        FeatureMatrix::from_rows(&self.rows)
    }

    /// Total sales targets of every row
    pub fn targets(&self) -> Array1<f64> {
        self.rows.iter().map(|r| r.target).collect()
    }

    /// Split into the first `at` rows and the rest
    pub fn split_at(&self, at: usize) -> (FeatureTable, FeatureTable) {
        let at = at.min(self.rows.len());
        let (head, tail) = self.rows.split_at(at);
        (Self::from_rows(head.to_vec()), Self::from_rows(tail.to_vec()))
    }
}

/// Derive feature rows from a daily series
///
/// Series of `MAX_LAG` days or fewer yield an empty table.
pub fn build_features(series: &DailySeries) -> Result<FeatureTable> {
    let records = series.records();
    let sales = series.total_sales();
    let ma_short = trailing_means(&sales, SHORT_WINDOW)?;
    let ma_long = trailing_means(&sales, LONG_WINDOW)?;

    let rows: Vec<FeatureRow> = records
        .iter()
        .enumerate()
        .skip(MAX_LAG)
        .map(|(i, record)| FeatureRow {
            date: record.date,
            calendar: CalendarFeatures::from_date(record.date),
            total_quantity: record.total_quantity as f64,
            num_transactions: record.num_transactions as f64,
            avg_discount: record.avg_discount,
            sales_lag_1: sales[i - 1],
            sales_lag_7: sales[i - 7],
            sales_lag_30: sales[i - 30],
            sales_ma_7: ma_short[i],
            sales_ma_30: ma_long[i],
            trend: i as f64,
            target: record.total_sales,
        })
        .collect();

    info!(
        days = records.len(),
        rows = rows.len(),
        "Built feature table"
    );

    Ok(FeatureTable::from_rows(rows))
}
