//! Recursive multi-day forecasting
//!
//! Each step predicts one day and feeds the clamped prediction back as the
//! next day's `sales_lag_1`. The 7 and 30 day lags and the trailing means
//! stay frozen at the last observed row for the whole horizon, so long
//! horizons flatten out toward what those frozen inputs imply.

use crate::error::{ForecastError, Result};
use crate::features::{CalendarFeatures, FeatureMatrix, FeatureRow, FeatureTable};
use crate::model::TrainedModel;
use chrono::{Days, NaiveDate};
use sales_math::MathError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Predicted sales for one future day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_sales: f64,
}

/// Contiguous daily forecast following the last observed date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesForecast {
    points: Vec<ForecastPoint>,
}

#[derive(Serialize)]
struct CsvRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Predicted_Sales")]
    predicted_sales: f64,
}

impl SalesForecast {
    /// Wrap forecast points that are already in date order
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    /// Forecast points in date order
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Predicted values in date order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_sales).collect()
    }

    /// Forecast dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Number of forecast days
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    /// Sum of predicted sales over the horizon
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.predicted_sales).sum()
    }

    /// Serialize to a JSON array of points
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.points)
            .map_err(|e| ForecastError::InvalidInput(e.to_string()))
    }

    /// Write `Date,Predicted_Sales` rows to any writer
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for point in &self.points {
            writer.serialize(CsvRecord {
                date: point.date.format("%Y-%m-%d").to_string(),
                predicted_sales: point.predicted_sales,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the forecast to a CSV file
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(file)?;
        info!(path = %path.as_ref().display(), days = self.horizon(), "Forecast written");
        Ok(())
    }
}

/// Input row for the day `step + 1` days after `last`
fn next_row(last: &FeatureRow, step: usize, lag_1: f64) -> Result<FeatureRow> {
    let date = last
        .date
        .checked_add_days(Days::new(step as u64 + 1))
        .ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Horizon runs past the last representable date from {}",
                last.date
            ))
        })?;

    Ok(FeatureRow {
        date,
        calendar: CalendarFeatures::from_date(date),
        sales_lag_1: lag_1,
        trend: last.trend + step as f64 + 1.0,
        target: f64::NAN,
        ..last.clone()
    })
}

/// Forecast `horizon` days after the last row of `table`
pub fn recursive_forecast(
    model: &TrainedModel,
    table: &FeatureTable,
    horizon: usize,
) -> Result<SalesForecast> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Forecast horizon must be at least one day".to_string(),
        ));
    }
    let last = table.last().ok_or_else(|| {
        ForecastError::InvalidInput("No feature rows to forecast from".to_string())
    })?;

    let mut points = Vec::with_capacity(horizon);
    let mut lag_1 = last.target;

    for step in 0..horizon {
        let row = next_row(last, step, lag_1)?;
        let raw = model.predict(&FeatureMatrix::from_rows(std::slice::from_ref(&row)))?[0];
        if !raw.is_finite() {
            return Err(ForecastError::Model(MathError::CalculationError(format!(
                "Non-finite prediction {} for {}",
                raw, row.date
            ))));
        }

        let predicted_sales = if raw >= 0.0 {
            raw
        } else {
            warn!(date = %row.date, raw, "Clamping negative prediction to zero");
            0.0
        };
        debug!(step, date = %row.date, lag_1, predicted_sales, "Forecast step");

        points.push(ForecastPoint {
            date: row.date,
            predicted_sales,
        });
        lag_1 = predicted_sales;
    }

    info!(
        horizon,
        from = %last.date,
        "Generated recursive forecast"
    );

    Ok(SalesForecast { points })
}
