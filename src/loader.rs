//! Source registry discovery and raw tabular loading.
//!
//! A malformed or missing file is a source-level failure: the caller skips
//! the source with a warning and carries on. Only zero successful loads is
//! fatal, and that decision belongs to the pipeline, not the loader.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::table::{CellValue, Table};

/// Discovery result for one configured source.
#[derive(Clone, Debug)]
pub struct SourceStatus {
    pub id: String,
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: u64,
}

/// Resolve each configured source identifier to a file path and report
/// existence and size. Never fails; absence is data, not an error.
pub fn discover(config: &PipelineConfig) -> Vec<SourceStatus> {
    let mut statuses = Vec::with_capacity(config.sources.len());

    for source in &config.sources {
        let path = config.raw_data_dir.join(&source.filename);
        let size_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        // Existence, not regular-file-ness: an unreadable or stalled path
        // still belongs to the load stage, where it becomes a timed skip.
        let exists = path.exists();

        if exists {
            info!(source = %source.id, path = %path.display(), size_bytes, "discovered source");
        } else {
            warn!(source = %source.id, path = %path.display(), "source file not found");
        }

        statuses.push(SourceStatus {
            id: source.id.clone(),
            path,
            exists,
            size_bytes,
        });
    }

    statuses
}

/// Load one source file into a raw table. Every cell loads as `Text`;
/// empty cells become `Null`. Typed resolution happens in the cleanser.
pub fn load_source(source_id: &str, path: &Path) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    if extension.as_deref() != Some("csv") {
        return Err(PipelineError::ParseFailure {
            source_name: source_id.to_string(),
            reason: format!("unsupported file format: {}", path.display()),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| PipelineError::SourceUnavailable {
        source_name: source_id.to_string(),
        reason: e.to_string(),
    })?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::ParseFailure {
            source_name: source_id.to_string(),
            reason: e.to_string(),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::ParseFailure {
            source_name: source_id.to_string(),
            reason: e.to_string(),
        })?;

        let row: Vec<CellValue> = record
            .iter()
            .map(|cell| {
                if cell.trim().is_empty() {
                    CellValue::Null
                } else {
                    CellValue::Text(cell.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }

    info!(
        source = %source_id,
        records = table.height(),
        columns = table.width(),
        "loaded source"
    );

    Ok(table)
}
