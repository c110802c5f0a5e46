//! Standardization: raw source columns into the canonical schema.
//!
//! Output columns are emitted in canonical order. Canonical fields with no
//! mapped raw column are injected as all-null; unmapped raw columns are
//! dropped. Provenance (source identifier, load timestamp) is stamped onto
//! every row.

use chrono::{DateTime, Utc};

use crate::cleanse::title_case;
use crate::mapper::RenameTable;
use crate::schema::CanonicalField;
use crate::table::{CellValue, Table};

/// Produce a canonical-schema table from a raw table and its rename table.
/// The raw table is read-only from here on; the standardized copy
/// supersedes it.
pub fn standardize(
    raw: &Table,
    renames: &RenameTable,
    source_id: &str,
    loaded_at: DateTime<Utc>,
) -> Table {
    // Canonical field -> raw column index, resolved once.
    let raw_index: Vec<Option<usize>> = CanonicalField::ALL
        .iter()
        .map(|field| {
            renames
                .raw_for(*field)
                .and_then(|raw_name| raw.column_index(raw_name))
        })
        .collect();

    let source_identifier = CellValue::Text(title_case(source_id));
    let load_timestamp = CellValue::Text(loaded_at.to_rfc3339());

    let mut table = Table::new(CanonicalField::column_names());
    for raw_row in &raw.rows {
        let row: Vec<CellValue> = CanonicalField::ALL
            .iter()
            .zip(&raw_index)
            .map(|(field, idx)| match field {
                CanonicalField::SourceIdentifier => source_identifier.clone(),
                CanonicalField::LoadTimestamp => load_timestamp.clone(),
                _ => match idx {
                    Some(i) => raw_row[*i].clone(),
                    None => CellValue::Null,
                },
            })
            .collect();
        table.push_row(row);
    }

    table
}
