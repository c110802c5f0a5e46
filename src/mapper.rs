//! Column mapping: raw source column names to canonical fields.
//!
//! Matching is dictionary-driven and deterministic. For a fixed alias
//! registry and raw column list the produced rename table is identical on
//! every run: canonical fields are visited in schema order, aliases in
//! registry order, raw columns in header order, and the first
//! case-insensitive match wins. Unmatched raw columns stay unmapped and
//! are dropped at standardization, never guessed into a canonical slot.

use crate::schema::{CanonicalField, ColumnAliasRegistry};

/// Per-source rename table: raw column name → canonical field.
#[derive(Clone, Debug, Default)]
pub struct RenameTable {
    pairs: Vec<(String, CanonicalField)>,
}

impl RenameTable {
    pub fn canonical_for(&self, raw_name: &str) -> Option<CanonicalField> {
        self.pairs
            .iter()
            .find(|(raw, _)| raw == raw_name)
            .map(|(_, field)| *field)
    }

    pub fn raw_for(&self, field: CanonicalField) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(raw, _)| raw.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CanonicalField)> {
        self.pairs.iter().map(|(raw, field)| (raw.as_str(), *field))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Build the rename table for one source's raw columns.
pub fn map_columns(registry: &ColumnAliasRegistry, raw_columns: &[String]) -> RenameTable {
    let lowered: Vec<String> = raw_columns.iter().map(|c| c.to_lowercase()).collect();

    let mut pairs = Vec::new();
    for (field, aliases) in registry.iter() {
        for alias in aliases {
            if let Some(idx) = lowered.iter().position(|c| c == alias) {
                pairs.push((raw_columns[idx].clone(), field));
                break;
            }
        }
    }

    RenameTable { pairs }
}
