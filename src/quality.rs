//! Data quality validation over the deduplicated dataset.
//!
//! Pure derivation: the dataset is never mutated here. Anomalies (such as
//! negative authorized capital) are counted and flagged, never dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::schema::CanonicalField;
use crate::table::Table;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnCompleteness {
    pub missing_count: u64,
    /// `100 × (1 − missing/total)`, rounded to 2 decimals; always in [0, 100].
    pub completeness_percentage: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QualityReport {
    pub validation_timestamp: DateTime<Utc>,
    pub total_records: u64,
    pub total_columns: u64,
    /// Keyed by canonical column name (CIN, CompanyName, State).
    pub data_completeness: BTreeMap<String, ColumnCompleteness>,
    /// Rows with AuthorizedCapital below zero. Flagged, retained.
    pub negative_authorized_capital: u64,
    /// Record count per State value; null states are not counted.
    pub state_distribution: BTreeMap<String, u64>,
    /// `100 × (1 − mean null-cell fraction)`, rounded to 2 decimals.
    pub overall_completeness_score: f64,
}

pub fn validate(table: &Table, now: DateTime<Utc>) -> QualityReport {
    let total = table.height();

    let mut data_completeness = BTreeMap::new();
    for field in CanonicalField::KEY_FIELDS {
        if let Some(col) = table.column_index(field.as_str()) {
            let missing = table.null_count(col);
            let pct = if total == 0 {
                100.0
            } else {
                round2(100.0 * (1.0 - missing as f64 / total as f64))
            };
            data_completeness.insert(
                field.as_str().to_string(),
                ColumnCompleteness {
                    missing_count: missing as u64,
                    completeness_percentage: pct,
                },
            );
        }
    }

    let negative_authorized_capital = table
        .column_index(CanonicalField::AuthorizedCapital.as_str())
        .map(|col| {
            table
                .rows
                .iter()
                .filter(|row| row[col].as_number().map(|n| n < 0.0).unwrap_or(false))
                .count() as u64
        })
        .unwrap_or(0);

    let mut state_distribution = BTreeMap::new();
    if let Some(col) = table.column_index(CanonicalField::State.as_str()) {
        for row in &table.rows {
            if let Some(state) = row[col].as_text() {
                *state_distribution.entry(state.to_string()).or_insert(0u64) += 1;
            }
        }
    }

    let total_cells = total * table.width();
    let overall_completeness_score = if total_cells == 0 {
        100.0
    } else {
        let null_cells: usize = (0..table.width()).map(|c| table.null_count(c)).sum();
        round2(100.0 * (1.0 - null_cells as f64 / total_cells as f64))
    };

    info!(
        total_records = total,
        overall_completeness_score,
        negative_authorized_capital,
        "quality validation completed"
    );

    QualityReport {
        validation_timestamp: now,
        total_records: total as u64,
        total_columns: table.width() as u64,
        data_completeness,
        negative_authorized_capital,
        state_distribution,
        overall_completeness_score,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample_table() -> Table {
        let mut table = Table::new(CanonicalField::column_names());
        let cin = table.column_index("CIN").unwrap();
        let name = table.column_index("CompanyName").unwrap();
        let state = table.column_index("State").unwrap();
        let cap = table.column_index("AuthorizedCapital").unwrap();

        let mut row1 = vec![CellValue::Null; CanonicalField::ALL.len()];
        row1[cin] = text("U1");
        row1[name] = text("Acme");
        row1[state] = text("Delhi");
        row1[cap] = CellValue::Number(100000.0);

        let mut row2 = vec![CellValue::Null; CanonicalField::ALL.len()];
        row2[name] = text("Beta");
        row2[state] = text("Delhi");
        row2[cap] = CellValue::Number(-500.0);

        table.push_row(row1);
        table.push_row(row2);
        table
    }

    #[test]
    fn test_completeness_percentages() {
        let report = validate(&sample_table(), Utc::now());

        let cin = &report.data_completeness["CIN"];
        assert_eq!(cin.missing_count, 1);
        assert_eq!(cin.completeness_percentage, 50.0);

        let state = &report.data_completeness["State"];
        assert_eq!(state.missing_count, 0);
        assert_eq!(state.completeness_percentage, 100.0);

        for completeness in report.data_completeness.values() {
            assert!(completeness.completeness_percentage >= 0.0);
            assert!(completeness.completeness_percentage <= 100.0);
        }
        assert!(report.overall_completeness_score >= 0.0);
        assert!(report.overall_completeness_score <= 100.0);
    }

    #[test]
    fn test_negative_capital_is_flagged_not_dropped() {
        let table = sample_table();
        let report = validate(&table, Utc::now());
        assert_eq!(report.negative_authorized_capital, 1);
        // Validation never mutates the dataset.
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_state_distribution() {
        let report = validate(&sample_table(), Utc::now());
        assert_eq!(report.state_distribution["Delhi"], 2);
        assert_eq!(report.state_distribution.len(), 1);
    }

    #[test]
    fn test_empty_table_scores_without_panicking() {
        let table = Table::new(CanonicalField::column_names());
        let report = validate(&table, Utc::now());
        assert_eq!(report.total_records, 0);
        assert_eq!(report.overall_completeness_score, 100.0);
    }
}
