//! Merge: concatenate all cleansed tables into one canonical dataset.
//!
//! Row order is source-processing order; column order is the canonical
//! schema. Rows are moved, never fabricated.

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::schema::CanonicalField;
use crate::table::Table;

pub fn merge(tables: Vec<Table>) -> Result<Table> {
    let source_count = tables.len();
    let mut merged = Table::new(CanonicalField::column_names());

    for table in tables {
        merged.rows.extend(table.rows);
    }

    if merged.height() == 0 {
        return Err(PipelineError::EmptyMergeResult);
    }

    info!(
        sources = source_count,
        records = merged.height(),
        "merged sources into master dataset"
    );
    Ok(merged)
}
