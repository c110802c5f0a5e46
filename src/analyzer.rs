//! Schema analysis over a loaded raw table.
//!
//! Pure diagnostics: column names, inferred primitive types, and a small
//! row sample. Nothing downstream consumes the analysis; it exists so a
//! skipped mapping or a low completeness score can be investigated.

use serde::{Deserialize, Serialize};

use crate::cleanse;
use crate::table::{CellValue, Table};

const SAMPLE_ROWS: usize = 3;
const INFERENCE_SCAN_LIMIT: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InferredType {
    Integer,
    Float,
    Date,
    Text,
    Null,
}

impl InferredType {
    /// Merge two observed cell types into the more general one.
    /// Integer widens to Float; anything mixed with text is Text.
    fn merge(self, other: InferredType) -> InferredType {
        use InferredType::*;
        match (self, other) {
            (Null, t) | (t, Null) => t,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemaAnalysis {
    pub source_id: String,
    pub columns: Vec<String>,
    /// Inferred type per column, aligned with `columns`.
    pub data_types: Vec<InferredType>,
    pub sample_rows: Vec<Vec<CellValue>>,
}

/// Analyze a raw table. Pure function of its input; no side effects.
pub fn analyze(source_id: &str, table: &Table) -> SchemaAnalysis {
    let data_types = (0..table.width())
        .map(|col| infer_column_type(table, col))
        .collect();

    SchemaAnalysis {
        source_id: source_id.to_string(),
        columns: table.columns.clone(),
        data_types,
        sample_rows: table.rows.iter().take(SAMPLE_ROWS).cloned().collect(),
    }
}

fn infer_column_type(table: &Table, col: usize) -> InferredType {
    table
        .rows
        .iter()
        .take(INFERENCE_SCAN_LIMIT)
        .map(|row| classify_cell(&row[col]))
        .fold(InferredType::Null, InferredType::merge)
}

fn classify_cell(cell: &CellValue) -> InferredType {
    match cell {
        CellValue::Null => InferredType::Null,
        CellValue::Number(_) => InferredType::Float,
        CellValue::Date(_) => InferredType::Date,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.parse::<i64>().is_ok() {
                InferredType::Integer
            } else if trimmed.parse::<f64>().is_ok() {
                InferredType::Float
            } else if cleanse::parse_date(trimmed).is_some() {
                InferredType::Date
            } else {
                InferredType::Text
            }
        }
    }
}
