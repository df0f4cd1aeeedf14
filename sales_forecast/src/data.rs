//! Transaction records and CSV ingestion

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// A single sales transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// Calendar date of the transaction
    pub date: NaiveDate,
    /// Total amount charged
    pub amount: f64,
    /// Number of units sold
    pub quantity: u32,
    /// Discount applied, in percent (0-100)
    pub discount_percent: f64,
    /// Transaction identifier
    pub transaction_id: String,
}

impl TransactionRow {
    /// Create a new transaction row
    pub fn new(
        date: NaiveDate,
        amount: f64,
        quantity: u32,
        discount_percent: f64,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            quantity,
            discount_percent,
            transaction_id: transaction_id.into(),
        }
    }

    /// Check the numeric fields against the input schema
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ForecastError::InvalidInput(format!(
                "Transaction {} has invalid amount {}",
                self.transaction_id, self.amount
            )));
        }
        if !self.discount_percent.is_finite() || !(0.0..=100.0).contains(&self.discount_percent) {
            return Err(ForecastError::InvalidInput(format!(
                "Transaction {} has discount {} outside 0-100",
                self.transaction_id, self.discount_percent
            )));
        }
        Ok(())
    }
}

/// Parse a calendar date, accepting a trailing time component
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }
    Err(ForecastError::InvalidInput(format!(
        "Cannot parse date '{}'",
        value
    )))
}

/// Remove exact duplicate rows, keeping the first occurrence
pub fn drop_duplicates(rows: Vec<TransactionRow>) -> Vec<TransactionRow> {
    let initial = rows.len();
    let mut seen = HashSet::with_capacity(initial);
    let unique: Vec<TransactionRow> = rows
        .into_iter()
        .filter(|row| {
            seen.insert((
                row.date,
                row.amount.to_bits(),
                row.quantity,
                row.discount_percent.to_bits(),
                row.transaction_id.clone(),
            ))
        })
        .collect();

    info!(removed = initial - unique.len(), "Removed duplicate rows");
    unique
}

/// Names of the columns holding each transaction field
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub date: String,
    pub amount: String,
    pub quantity: String,
    pub discount: String,
    pub transaction_id: Option<String>,
}

/// Data loader for transaction logs
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load transactions from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRow>> {
        let file = File::open(path.as_ref())?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let rows = Self::from_dataframe(&df)?;
        info!(
            path = %path.as_ref().display(),
            rows = rows.len(),
            "Loaded transactions"
        );
        Ok(rows)
    }

    /// Convert an existing DataFrame into transactions
    pub fn from_dataframe(df: &DataFrame) -> Result<Vec<TransactionRow>> {
        let mapping = Self::detect_columns(df)?;

        let dates = Self::column_as_str(df, &mapping.date)?;
        let amounts = Self::column_as_f64(df, &mapping.amount)?;
        let quantities = Self::column_as_f64(df, &mapping.quantity)?;
        let discounts = Self::column_as_f64(df, &mapping.discount)?;
        let ids = match &mapping.transaction_id {
            Some(name) => Self::column_as_str(df, name)?,
            None => vec![None; df.height()],
        };

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let line = i + 1;
            let missing = |field: &str| {
                ForecastError::InvalidInput(format!("Row {} has no {}", line, field))
            };

            let date = parse_date(dates[i].as_deref().ok_or_else(|| missing("date"))?)?;
            let amount = amounts[i].ok_or_else(|| missing("amount"))?;
            let quantity = Self::to_quantity(quantities[i].ok_or_else(|| missing("quantity"))?, line)?;
            let discount = discounts[i].ok_or_else(|| missing("discount"))?;
            let transaction_id = ids[i].clone().unwrap_or_else(|| format!("ROW{:06}", line));

            let row = TransactionRow::new(date, amount, quantity, discount, transaction_id);
            row.validate()?;
            rows.push(row);
        }

        Ok(rows)
    }

    /// Detect the transaction columns in a DataFrame
    pub fn detect_columns(df: &DataFrame) -> Result<ColumnMapping> {
        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let find = |patterns: &[&str]| -> Option<String> {
            for pattern in patterns {
                if let Some(name) = column_names
                    .iter()
                    .find(|name| name.to_lowercase() == *pattern)
                {
                    return Some(name.clone());
                }
            }
            for pattern in patterns {
                if let Some(name) = column_names
                    .iter()
                    .find(|name| name.to_lowercase().contains(pattern))
                {
                    return Some(name.clone());
                }
            }
            None
        };
        let require = |patterns: &[&str], field: &str| {
            find(patterns).ok_or_else(|| {
                ForecastError::InvalidInput(format!("No {} column found in data", field))
            })
        };

        Ok(ColumnMapping {
            date: require(&["date", "time"], "date")?,
            amount: require(&["total_amount", "amount", "sales", "revenue"], "amount")?,
            quantity: require(&["quantity", "qty"], "quantity")?,
            discount: require(&["discount_percent", "discount"], "discount")?,
            transaction_id: column_names
                .iter()
                .find(|name| matches!(name.to_lowercase().as_str(), "transaction_id" | "transaction"))
                .cloned(),
        })
    }

    fn to_quantity(value: f64, line: usize) -> Result<u32> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(ForecastError::InvalidInput(format!(
                "Row {} has invalid quantity {}",
                line, value
            )));
        }
        Ok(value as u32)
    }

    /// Helper method to get a column as optional f64 values
    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::InvalidInput(format!("Column '{}' not found: {}", column_name, e))
        })?;
        let casted = col.cast(&DataType::Float64).map_err(|e| {
            ForecastError::InvalidInput(format!(
                "Column '{}' cannot be converted to f64: {}",
                column_name, e
            ))
        })?;
        Ok(casted.f64()?.into_iter().collect())
    }

    /// Helper method to get a column as optional strings
    fn column_as_str(df: &DataFrame, column_name: &str) -> Result<Vec<Option<String>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::InvalidInput(format!("Column '{}' not found: {}", column_name, e))
        })?;
        let casted = col.cast(&DataType::Utf8)?;
        Ok(casted
            .utf8()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }
}
