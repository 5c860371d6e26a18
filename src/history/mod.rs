//! # 指數歷史數據
//!
//! 以 CSV 檔保存每個交易日一筆的指數點數，欄位名稱由 [`HistorySchema`] 明確定義。
//! 讀取與寫入前一律先驗證欄位，寫入時整檔重寫。

use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod store;

pub use store::HistoryStore;

/// Date text format of the date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One trading day of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl HistoryRecord {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        HistoryRecord { date, value }
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.date.format(DATE_FORMAT), self.value)
    }
}

/// The column contract of a history file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySchema {
    pub date_column: String,
    pub value_column: String,
}

impl HistorySchema {
    pub fn new(date_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        HistorySchema {
            date_column: date_column.into(),
            value_column: value_column.into(),
        }
    }

    /// Header row, date column first.
    pub fn header(&self) -> [&str; 2] {
        [self.date_column.as_str(), self.value_column.as_str()]
    }

    /// Maps a header row to `(date index, value index)`.
    ///
    /// The header must name exactly the two contract columns, in any order.
    /// A UTF-8 BOM on the first name is ignored.
    pub fn resolve(&self, found: &[&str]) -> Result<(usize, usize), UpdateError> {
        let names: Vec<&str> = found
            .iter()
            .map(|name| name.trim().trim_start_matches('\u{feff}'))
            .collect();
        let position = |column: &str| names.iter().position(|name| *name == column);

        match (position(self.date_column.as_str()), position(self.value_column.as_str())) {
            (Some(date), Some(value)) if names.len() == 2 => Ok((date, value)),
            _ => Err(UpdateError::SchemaMismatch {
                expected: self.header().iter().map(|s| s.to_string()).collect(),
                found: names.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

/// Named column contracts found in existing history files.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPreset {
    /// `Seance,MASI`
    #[default]
    Seance,
    /// `Date,Valeur`
    Legacy,
}

impl SchemaPreset {
    pub fn schema(&self) -> HistorySchema {
        match self {
            SchemaPreset::Seance => HistorySchema::new("Seance", "MASI"),
            SchemaPreset::Legacy => HistorySchema::new("Date", "Valeur"),
        }
    }
}

impl FromStr for SchemaPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seance" => Ok(SchemaPreset::Seance),
            "legacy" => Ok(SchemaPreset::Legacy),
            other => Err(anyhow!("Unknown history schema: {}", other)),
        }
    }
}

/// Outcome of a successful `update_history` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// The record was appended and the store rewritten.
    Inserted(HistoryRecord),
    /// A record for the date already exists; carries the stored one. Nothing was written.
    AlreadyPresent(HistoryRecord),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("history columns {found:?} do not match the expected {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("cannot append {today} after the last stored date {last}")]
    OutOfOrder { last: NaiveDate, today: NaiveDate },
    #[error("malformed history record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
    #[error("history store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history store CSV error: {0}")]
    Csv(#[from] csv::Error),
}
