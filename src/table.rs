//! Tabular data model shared by every pipeline stage.
//!
//! A cell is a tagged variant rather than a stringly-typed value: raw files
//! load everything as `Text` (empty cells become `Null`), and the cleanser
//! resolves typed values (`Number`, `Date`) explicitly. No stage coerces a
//! cell implicitly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Rendering used for the canonical CSV dump. Nulls render as empty.
    pub fn to_display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format!("{}", n),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Null => String::new(),
        }
    }

    /// Stable, type-discriminating representation for duplicate keys.
    /// Distinguishes `Null` from the text "Null" and `Text("1")` from
    /// `Number(1.0)`.
    pub fn key_repr(&self) -> String {
        match self {
            CellValue::Text(s) => format!("t:{}", s),
            CellValue::Number(n) => format!("n:{}", n),
            CellValue::Date(d) => format!("d:{}", d),
            CellValue::Null => "\u{0}".to_string(),
        }
    }
}

/// An ordered table: a header plus row-major cells. Row order is significant
/// throughout the pipeline ("first occurrence wins" deduplication depends
/// on it).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Push a row, padding or truncating to the table width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Count of null cells in a single column.
    pub fn null_count(&self, col: usize) -> usize {
        self.rows.iter().filter(|r| r[col].is_null()).count()
    }
}
