//! Shared data model for StockWalk: tabular records, CSV decoding and
//! close-price normalization. Used by the viewer and by the data host.

mod series;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use series::{NormalizedSeries, SeriesSummary};

/// Errors raised while retrieving or decoding a whole dataset.
///
/// Row-level defects are not errors: they are filtered or clamped by the
/// consumers of [`TabularRecord`].
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to fetch dataset: {0}")]
    Http(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("dataset is empty")]
    Empty,

    #[error("chart build failed: {0}")]
    Build(String),
}

/// One row of the source dataset. Numeric fields stay as text so that a bad
/// cell only invalidates its own row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularRecord {
    pub date: String,
    pub open: String,
    pub close: String,
}

impl TabularRecord {
    pub fn new(date: impl Into<String>, open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            open: open.into(),
            close: close.into(),
        }
    }

    /// Parsed opening price, `None` when the cell is not a finite number
    pub fn open_value(&self) -> Option<f64> {
        parse_decimal(&self.open)
    }

    /// Parsed closing price, `None` when the cell is not a finite number
    pub fn close_value(&self) -> Option<f64> {
        parse_decimal(&self.close)
    }

    /// Both prices, only when both parse
    pub fn prices(&self) -> Option<(f64, f64)> {
        Some((self.open_value()?, self.close_value()?))
    }
}

/// Parse a decimal cell. Surrounding whitespace is ignored; `NaN` and
/// infinities are rejected.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Decode delimited text with a header row into records.
///
/// Extra columns are ignored and short rows yield empty cells. Only a missing
/// header, a missing required column or a broken CSV stream is an error.
pub fn parse_records(text: &str) -> Result<Vec<TabularRecord>, DataError> {
    if text.trim().is_empty() {
        return Err(DataError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(DataError::MissingColumn(name))
    };
    let date_idx = column("date")?;
    let open_idx = column("open")?;
    let close_idx = column("close")?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        records.push(TabularRecord {
            date: row.get(date_idx).unwrap_or("").to_string(),
            open: row.get(open_idx).unwrap_or("").to_string(),
            close: row.get(close_idx).unwrap_or("").to_string(),
        });
    }

    Ok(records)
}
