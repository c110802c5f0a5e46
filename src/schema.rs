//! Canonical schema and column alias registry.
//!
//! The canonical schema is the fixed, source-independent column set every
//! record is normalized into. The alias registry maps each canonical field
//! to the lower-cased raw-name variants seen across sources; it is built
//! once at startup and shared read-only by all workers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// One field of the canonical schema, in fixed order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    Cin,
    CompanyName,
    RegisteredAddress,
    State,
    City,
    Pin,
    Category,
    Subcategory,
    CompanyClass,
    AuthorizedCapital,
    PaidUpCapital,
    IncorporationDate,
    LastAgmDate,
    BalanceSheetDate,
    SourceIdentifier,
    LoadTimestamp,
}

impl CanonicalField {
    /// Full schema in canonical column order.
    pub const ALL: [CanonicalField; 16] = [
        CanonicalField::Cin,
        CanonicalField::CompanyName,
        CanonicalField::RegisteredAddress,
        CanonicalField::State,
        CanonicalField::City,
        CanonicalField::Pin,
        CanonicalField::Category,
        CanonicalField::Subcategory,
        CanonicalField::CompanyClass,
        CanonicalField::AuthorizedCapital,
        CanonicalField::PaidUpCapital,
        CanonicalField::IncorporationDate,
        CanonicalField::LastAgmDate,
        CanonicalField::BalanceSheetDate,
        CanonicalField::SourceIdentifier,
        CanonicalField::LoadTimestamp,
    ];

    /// Text fields normalized by the cleanser.
    pub const TEXT_FIELDS: [CanonicalField; 4] = [
        CanonicalField::CompanyName,
        CanonicalField::RegisteredAddress,
        CanonicalField::City,
        CanonicalField::State,
    ];

    /// Capital fields coerced to numeric.
    pub const CAPITAL_FIELDS: [CanonicalField; 2] = [
        CanonicalField::AuthorizedCapital,
        CanonicalField::PaidUpCapital,
    ];

    /// Date fields coerced to calendar dates.
    pub const DATE_FIELDS: [CanonicalField; 3] = [
        CanonicalField::IncorporationDate,
        CanonicalField::LastAgmDate,
        CanonicalField::BalanceSheetDate,
    ];

    /// Key columns tracked by the quality validator.
    pub const KEY_FIELDS: [CanonicalField; 3] = [
        CanonicalField::Cin,
        CanonicalField::CompanyName,
        CanonicalField::State,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Cin => "CIN",
            CanonicalField::CompanyName => "CompanyName",
            CanonicalField::RegisteredAddress => "RegisteredAddress",
            CanonicalField::State => "State",
            CanonicalField::City => "City",
            CanonicalField::Pin => "PIN",
            CanonicalField::Category => "Category",
            CanonicalField::Subcategory => "Subcategory",
            CanonicalField::CompanyClass => "CompanyClass",
            CanonicalField::AuthorizedCapital => "AuthorizedCapital",
            CanonicalField::PaidUpCapital => "PaidUpCapital",
            CanonicalField::IncorporationDate => "IncorporationDate",
            CanonicalField::LastAgmDate => "LastAGMDate",
            CanonicalField::BalanceSheetDate => "BalanceSheetDate",
            CanonicalField::SourceIdentifier => "SourceIdentifier",
            CanonicalField::LoadTimestamp => "LoadTimestamp",
        }
    }

    pub fn from_name(name: &str) -> Option<CanonicalField> {
        CanonicalField::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    /// Canonical column headers in schema order.
    pub fn column_names() -> Vec<String> {
        CanonicalField::ALL.iter().map(|f| f.as_str().to_string()).collect()
    }
}

/// Maps canonical fields to accepted raw-name aliases. Entries are kept as
/// an ordered list (schema order, then alias priority order) so that column
/// mapping is deterministic for a fixed registry and raw column list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnAliasRegistry {
    entries: Vec<(CanonicalField, Vec<String>)>,
}

impl ColumnAliasRegistry {
    /// Registry of alias spellings observed across the regional extracts.
    /// Provenance fields have no aliases; they are stamped, never mapped.
    pub fn builtin() -> Self {
        let entries = vec![
            (
                CanonicalField::Cin,
                vec!["cin", "corporate identification number", "company cin"],
            ),
            (
                CanonicalField::CompanyName,
                vec!["company name", "name", "company_name"],
            ),
            (
                CanonicalField::RegisteredAddress,
                vec!["registered office address", "address", "registered_address"],
            ),
            (CanonicalField::State, vec!["state", "company state"]),
            (CanonicalField::City, vec!["city", "company city"]),
            (CanonicalField::Pin, vec!["pin", "pincode", "pin code"]),
            (
                CanonicalField::Category,
                vec!["company category", "category"],
            ),
            (
                CanonicalField::Subcategory,
                vec!["company subcategory", "subcategory"],
            ),
            (
                CanonicalField::CompanyClass,
                vec!["class of company", "class"],
            ),
            (
                CanonicalField::AuthorizedCapital,
                vec!["authorized capital", "auth_capital"],
            ),
            (
                CanonicalField::PaidUpCapital,
                vec!["paid-up capital", "paidup_capital"],
            ),
            (
                CanonicalField::IncorporationDate,
                vec!["date of incorporation", "incorporation_date"],
            ),
            (
                CanonicalField::LastAgmDate,
                vec!["date of last agm", "last_agm_date"],
            ),
            (
                CanonicalField::BalanceSheetDate,
                vec!["date of balance sheet", "balance_sheet_date"],
            ),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|(f, aliases)| (f, aliases.into_iter().map(String::from).collect()))
                .collect(),
        }
    }

    /// Load a registry from a JSON document mapping canonical field names to
    /// alias lists. Aliases are normalized to lower case on load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let doc: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)?;

        let mut entries = Vec::new();
        // Iterate the schema order, not the document order, so the mapping
        // stays deterministic regardless of how the file is arranged.
        for field in CanonicalField::ALL {
            if let Some(aliases) = doc.get(field.as_str()) {
                entries.push((
                    field,
                    aliases.iter().map(|a| a.to_lowercase()).collect(),
                ));
            }
        }

        for key in doc.keys() {
            if CanonicalField::from_name(key).is_none() {
                return Err(PipelineError::Config(format!(
                    "unknown canonical field in alias registry: {}",
                    key
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Entries in deterministic (schema) order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &[String])> {
        self.entries.iter().map(|(f, a)| (*f, a.as_slice()))
    }

    pub fn aliases_for(&self, field: CanonicalField) -> &[String] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, a)| a.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for ColumnAliasRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
