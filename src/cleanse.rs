//! Cleansing: resolve text cells into their typed canonical form.
//!
//! Every coercion is total: an unparseable capital or date becomes `Null`,
//! never an error. A single bad cell must not abort the run.

use chrono::{NaiveDate, NaiveDateTime};

use crate::schema::CanonicalField;
use crate::table::{CellValue, Table};

/// Date layouts seen across the regional extracts, tried in order.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Cleanse one standardized table in place:
/// - text fields: trim surrounding whitespace, title-case;
/// - capital fields: coerce to finite numbers;
/// - date fields: permissive calendar parse;
/// - State: forced to the source's declared identity. The physical file
///   boundary is authoritative over its own content, even when the raw
///   column disagrees.
pub fn cleanse(table: &mut Table, source_id: &str) {
    let source_identity = title_case(source_id);

    let text_cols: Vec<usize> = CanonicalField::TEXT_FIELDS
        .iter()
        .filter_map(|f| table.column_index(f.as_str()))
        .collect();
    let capital_cols: Vec<usize> = CanonicalField::CAPITAL_FIELDS
        .iter()
        .filter_map(|f| table.column_index(f.as_str()))
        .collect();
    let date_cols: Vec<usize> = CanonicalField::DATE_FIELDS
        .iter()
        .filter_map(|f| table.column_index(f.as_str()))
        .collect();
    let state_col = table.column_index(CanonicalField::State.as_str());

    for row in &mut table.rows {
        for &col in &text_cols {
            if let CellValue::Text(s) = &row[col] {
                row[col] = CellValue::Text(title_case(s.trim()));
            }
        }

        for &col in &capital_cols {
            row[col] = coerce_number(&row[col]);
        }

        for &col in &date_cols {
            row[col] = coerce_date(&row[col]);
        }

        if let Some(col) = state_col {
            row[col] = CellValue::Text(source_identity.clone());
        }
    }
}

fn coerce_number(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Number(n) if n.is_finite() => CellValue::Number(*n),
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Null,
        },
        _ => CellValue::Null,
    }
}

fn coerce_date(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Date(d) => CellValue::Date(*d),
        CellValue::Text(s) => match parse_date(s) {
            Some(d) => CellValue::Date(d),
            None => CellValue::Null,
        },
        _ => CellValue::Null,
    }
}

/// Permissive calendar-date parser. Returns `None` for anything that does
/// not match a known layout.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Title-case a string the way the registry extracts are normalized:
/// a letter following a non-letter is upper-cased, the rest are lowered,
/// and separators are preserved ("tamil_nadu" becomes "Tamil_Nadu").
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
