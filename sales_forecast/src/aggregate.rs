//! Daily aggregation of transaction logs

use crate::data::TransactionRow;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::info;

/// Sales totals for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar date
    pub date: NaiveDate,
    /// Sum of transaction amounts
    pub total_sales: f64,
    /// Sum of units sold
    pub total_quantity: u64,
    /// Number of transactions
    pub num_transactions: usize,
    /// Mean discount percent over the day's transactions
    pub avg_discount: f64,
}

/// Daily records with unique dates in ascending order
///
/// Missing days are not filled in, so consecutive records are not
/// necessarily consecutive calendar dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DailyRecord>", into = "Vec<DailyRecord>")]
pub struct DailySeries {
    records: Vec<DailyRecord>,
}

impl TryFrom<Vec<DailyRecord>> for DailySeries {
    type Error = ForecastError;

    fn try_from(records: Vec<DailyRecord>) -> Result<Self> {
        Self::from_records(records)
    }
}

impl From<DailySeries> for Vec<DailyRecord> {
    fn from(series: DailySeries) -> Self {
        series.records
    }
}

impl DailySeries {
    /// Build a series from records, which must have strictly ascending dates
    pub fn from_records(records: Vec<DailyRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(ForecastError::InvalidInput(
                "Daily series must not be empty".to_string(),
            ));
        }
        if let Some(pair) = records.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(ForecastError::InvalidInput(format!(
                "Daily records out of order at {} -> {}",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { records })
    }

    /// All records, oldest first
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    /// Number of days in the series
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the series has no days
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dates of the series
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// Daily sales totals
    pub fn total_sales(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.total_sales).collect()
    }

    /// First observed date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    /// Last observed date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }
}

#[derive(Default)]
struct DayAccumulator {
    total_sales: f64,
    total_quantity: u64,
    discounts: Vec<f64>,
}

/// Collapse transactions into one record per distinct date
pub fn aggregate_daily(rows: &[TransactionRow]) -> Result<DailySeries> {
    if rows.is_empty() {
        return Err(ForecastError::InvalidInput(
            "No transactions to aggregate".to_string(),
        ));
    }

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for row in rows {
        row.validate()?;
        let day = days.entry(row.date).or_default();
        day.total_sales += row.amount;
        day.total_quantity += u64::from(row.quantity);
        day.discounts.push(row.discount_percent);
    }

    let records: Vec<DailyRecord> = days
        .into_iter()
        .map(|(date, day)| DailyRecord {
            date,
            total_sales: day.total_sales,
            total_quantity: day.total_quantity,
            num_transactions: day.discounts.len(),
            avg_discount: day.discounts.iter().mean(),
        })
        .collect();

    info!(
        transactions = rows.len(),
        days = records.len(),
        "Aggregated transactions into daily series"
    );

    DailySeries::from_records(records)
}
