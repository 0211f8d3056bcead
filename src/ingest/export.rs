//! Decoding platform trade exports (`.clktrd` JSON or CSV) into raw rows.
//!
//! Column names are the platform's export schema and are matched exactly.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub const COL_TICKER: &str = "Ticker";
pub const COL_POSITION: &str = "Position";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_TRADED_PRICE: &str = "TradedPrice";
pub const COL_TRADED_TIME: &str = "TradedTime";
pub const COL_STRIKE: &str = "Strike";
pub const COL_EXPIRY: &str = "Expiry";
pub const COL_OPTION_TYPE: &str = "OptionType";
pub const COL_INSTRUMENT_TYPE: &str = "InstrumentType";

/// Columns every export must carry. `Strike`/`Expiry` may be null on cash rows.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_TICKER,
    COL_POSITION,
    COL_QUANTITY,
    COL_TRADED_PRICE,
    COL_TRADED_TIME,
    COL_STRIKE,
    COL_EXPIRY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "clktrd" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("must be json or csv, got {}", other)),
        }
    }
}

/// One export row. Null, empty and `NaN` cells are stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub index: usize,
    cells: HashMap<String, Option<String>>,
}

impl RawRow {
    pub fn new(index: usize, cells: HashMap<String, Option<String>>) -> Self {
        Self { index, cells }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Non-null cell text.
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).and_then(|c| c.as_deref())
    }
}

/// Decoded export: header columns plus rows in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExport {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawExport {
    /// Decode `bytes` and verify the required columns are present.
    pub fn parse(bytes: &[u8], format: ExportFormat) -> Result<Self, AnalysisError> {
        let export = match format {
            ExportFormat::Json => Self::parse_json(bytes)?,
            ExportFormat::Csv => Self::parse_csv(bytes)?,
        };
        export.check_required_columns()?;
        Ok(export)
    }

    pub fn parse_json(bytes: &[u8]) -> Result<Self, AnalysisError> {
        let doc: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| AnalysisError::unsupported(format!("not a JSON export: {}", e)))?;

        let trades = doc
            .pointer("/data/trades")
            .and_then(|v| v.as_array())
            .ok_or_else(|| AnalysisError::unsupported("missing data.trades array"))?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(trades.len());

        for (index, value) in trades.iter().enumerate() {
            let object = value
                .as_object()
                .ok_or_else(|| AnalysisError::malformed(index, "*", "row is not an object"))?;

            if index == 0 {
                columns = object.keys().cloned().collect();
            }

            let cells = object
                .iter()
                .map(|(key, value)| (key.clone(), json_cell(value)))
                .collect();
            rows.push(RawRow::new(index, cells));
        }

        Ok(Self { columns, rows })
    }

    pub fn parse_csv(bytes: &[u8]) -> Result<Self, AnalysisError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| AnalysisError::unsupported(format!("unreadable CSV header: {}", e)))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| AnalysisError::malformed(index, "*", e.to_string()))?;
            let cells = columns
                .iter()
                .zip(record.iter())
                .map(|(column, value)| (column.clone(), text_cell(value)))
                .collect();
            rows.push(RawRow::new(index, cells));
        }

        Ok(Self { columns, rows })
    }

    /// An empty JSON trade list has no columns to check and is accepted.
    pub fn check_required_columns(&self) -> Result<(), AnalysisError> {
        if self.columns.is_empty() && self.rows.is_empty() {
            return Ok(());
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !self.columns.iter().any(|c| c == required))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AnalysisError::missing_columns(&missing))
        }
    }
}

fn json_cell(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => text_cell(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn text_cell(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_null_marker(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_null_marker(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "nan" | "null" | "none" | "nat"
    )
}
