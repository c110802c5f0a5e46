//! Pipeline orchestrator.
//!
//! One run is one batch job: discover, then load/analyze/map/standardize/
//! cleanse each source on its own worker, join in source-registry order,
//! then merge, deduplicate, validate, and persist single-threaded. The
//! ordered join keeps downstream row order deterministic, which the
//! first-occurrence-wins deduplication depends on.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::analyzer;
use crate::cleanse;
use crate::config::PipelineConfig;
use crate::dedup;
use crate::error::{PipelineError, Result};
use crate::loader;
use crate::mapper;
use crate::merge;
use crate::persist::{self, Artifacts, ChangeLog};
use crate::quality::{self, QualityReport};
use crate::schema::ColumnAliasRegistry;
use crate::standardize;
use crate::table::Table;

#[derive(Debug)]
pub struct PipelineOutcome {
    pub artifacts: Artifacts,
    pub quality_report: QualityReport,
    pub total_records: u64,
    pub duplicates_removed: u64,
    /// Sources skipped with a warning (missing, unreadable, timed out,
    /// or unparseable).
    pub skipped_sources: Vec<String>,
}

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    aliases: Arc<ColumnAliasRegistry>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, aliases: ColumnAliasRegistry) -> Self {
        Self {
            config: Arc::new(config),
            aliases: Arc::new(aliases),
        }
    }

    pub async fn run(&self) -> Result<PipelineOutcome> {
        let run_started = Utc::now();
        info!("🚀 starting data integration pipeline");

        let statuses = loader::discover(&self.config);
        let mut skipped_sources: Vec<String> = Vec::new();

        let timeout_secs = self.config.load_timeout_secs;
        let mut workers = Vec::new();
        for status in statuses {
            if !status.exists {
                skipped_sources.push(status.id);
                continue;
            }
            let aliases = Arc::clone(&self.aliases);
            let id = status.id.clone();
            let path = status.path.clone();
            workers.push((
                status.id,
                tokio::spawn(async move {
                    prepare_source(id, path, aliases, run_started, timeout_secs).await
                }),
            ));
        }

        // Join barrier: collect results in source-registry order regardless
        // of completion order.
        let mut tables: Vec<Table> = Vec::new();
        for (id, worker) in workers {
            match worker.await {
                Ok(Ok(table)) => tables.push(table),
                Ok(Err(e)) if e.is_source_level() => {
                    warn!(source = %id, cause = %e, "skipping source");
                    skipped_sources.push(id);
                }
                Ok(Err(e)) => return Err(e),
                Err(join_err) => {
                    warn!(source = %id, cause = %join_err, "source worker failed, skipping");
                    skipped_sources.push(id);
                }
            }
        }

        if tables.is_empty() {
            error!("no sources loaded successfully, aborting before standardization output");
            return Err(PipelineError::NoSourcesLoaded);
        }

        let merged = merge::merge(tables)?;
        let deduped = dedup::deduplicate(merged);
        let quality_report = quality::validate(&deduped.table, Utc::now());

        let change_log = ChangeLog {
            duplicates_removed: deduped.duplicates_removed as u64,
            merge_timestamp: Utc::now(),
            quality_report: quality_report.clone(),
        };

        let artifacts = persist::persist(
            &self.config.processed_data_dir,
            &deduped.table,
            &quality_report,
            &change_log,
        )?;

        info!(
            total_records = deduped.table.height(),
            duplicates_removed = deduped.duplicates_removed,
            skipped_sources = skipped_sources.len(),
            "✅ pipeline completed"
        );

        Ok(PipelineOutcome {
            artifacts,
            quality_report,
            total_records: deduped.table.height() as u64,
            duplicates_removed: deduped.duplicates_removed as u64,
            skipped_sources,
        })
    }
}

/// Per-source worker: load (bounded by the configured timeout), analyze,
/// map, standardize, cleanse. Each source is independent until the merge.
async fn prepare_source(
    id: String,
    path: PathBuf,
    aliases: Arc<ColumnAliasRegistry>,
    run_started: DateTime<Utc>,
    timeout_secs: u64,
) -> Result<Table> {
    let load_id = id.clone();
    let loaded = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        tokio::task::spawn_blocking(move || loader::load_source(&load_id, &path)),
    )
    .await;

    let raw = match loaded {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => {
            return Err(PipelineError::SourceUnavailable {
                source_name: id,
                reason: join_err.to_string(),
            })
        }
        Err(_) => {
            return Err(PipelineError::SourceUnavailable {
                source_name: id,
                reason: format!("load timed out after {}s", timeout_secs),
            })
        }
    };

    let analysis = analyzer::analyze(&id, &raw);
    debug!(
        source = %id,
        columns = ?analysis.columns,
        types = ?analysis.data_types,
        "schema analysis"
    );

    let renames = mapper::map_columns(&aliases, &raw.columns);
    info!(source = %id, mapped_columns = renames.len(), "column mapping built");

    let mut table = standardize::standardize(&raw, &renames, &id, run_started);
    cleanse::cleanse(&mut table, &id);
    Ok(table)
}
