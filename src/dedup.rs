//! Deduplication with a tiered key strategy, first occurrence wins.
//!
//! Tiers, in priority order:
//! 1. exact full-row duplicates;
//! 2. non-null CIN, when the CIN column exists;
//! 3. otherwise (CompanyName, State), when both columns exist and both
//!    values are non-null.
//!
//! Only one of tiers 2/3 applies per run; CIN takes priority whenever the
//! column exists, regardless of how many of its values are null. A row
//! whose key component is null is never collapsed against another row on
//! that key. The pass is idempotent: rerunning it on its own output
//! removes nothing.

use std::collections::HashSet;
use tracing::info;

use crate::schema::CanonicalField;
use crate::table::Table;

const KEY_SEP: char = '\u{1f}';

#[derive(Debug)]
pub struct DedupOutcome {
    pub table: Table,
    pub duplicates_removed: usize,
}

enum TierKey {
    Cin(usize),
    NameState(usize, usize),
    None,
}

pub fn deduplicate(table: Table) -> DedupOutcome {
    let initial = table.height();

    let tier = match table.column_index(CanonicalField::Cin.as_str()) {
        Some(cin) => TierKey::Cin(cin),
        None => {
            let name = table.column_index(CanonicalField::CompanyName.as_str());
            let state = table.column_index(CanonicalField::State.as_str());
            match (name, state) {
                (Some(n), Some(s)) => TierKey::NameState(n, s),
                _ => TierKey::None,
            }
        }
    };

    let mut seen_rows: HashSet<String> = HashSet::new();
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(table.rows.len());

    for row in table.rows {
        let full_key: String = row
            .iter()
            .map(|c| c.key_repr())
            .collect::<Vec<_>>()
            .join(&KEY_SEP.to_string());
        if !seen_rows.insert(full_key) {
            continue;
        }

        let keep = match &tier {
            TierKey::Cin(cin) => {
                // Null CINs are never collapsed on CIN alone.
                row[*cin].is_null() || seen_keys.insert(row[*cin].key_repr())
            }
            TierKey::NameState(name, state) => {
                if row[*name].is_null() || row[*state].is_null() {
                    true
                } else {
                    let key = format!("{}{}{}", row[*name].key_repr(), KEY_SEP, row[*state].key_repr());
                    seen_keys.insert(key)
                }
            }
            TierKey::None => true,
        };

        if keep {
            kept.push(row);
        }
    }

    let table = Table {
        columns: table.columns,
        rows: kept,
    };
    let duplicates_removed = initial - table.height();

    info!(duplicates_removed, records = table.height(), "deduplicated dataset");

    DedupOutcome {
        table,
        duplicates_removed,
    }
}
