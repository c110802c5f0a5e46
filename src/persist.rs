//! Persistence & audit writer.
//!
//! Three artifacts per run: the canonical dataset dump, the quality report,
//! and the change log. Each is written to a temporary sibling and renamed
//! into place, so a failed write never leaves a partial artifact behind
//! under the final name. Any write failure is pipeline-fatal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::quality::QualityReport;
use crate::table::Table;

pub const DATASET_FILENAME: &str = "master_companies.csv";
pub const QUALITY_REPORT_FILENAME: &str = "data_quality_report.json";
pub const CHANGE_LOG_FILENAME: &str = "change_log.json";

/// Audit record for one pipeline run. Created once, persisted, never
/// mutated afterward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChangeLog {
    pub duplicates_removed: u64,
    pub merge_timestamp: DateTime<Utc>,
    pub quality_report: QualityReport,
}

/// Paths of the written artifacts.
#[derive(Clone, Debug)]
pub struct Artifacts {
    pub dataset: PathBuf,
    pub quality_report: PathBuf,
    pub change_log: PathBuf,
}

pub fn persist(
    out_dir: &Path,
    table: &Table,
    report: &QualityReport,
    change_log: &ChangeLog,
) -> Result<Artifacts> {
    std::fs::create_dir_all(out_dir).map_err(|e| persistence_err(DATASET_FILENAME, &e))?;

    let dataset = out_dir.join(DATASET_FILENAME);
    write_dataset(&dataset, table)?;

    let quality_report = out_dir.join(QUALITY_REPORT_FILENAME);
    write_json(&quality_report, QUALITY_REPORT_FILENAME, report)?;

    let change_log_path = out_dir.join(CHANGE_LOG_FILENAME);
    write_json(&change_log_path, CHANGE_LOG_FILENAME, change_log)?;

    info!(
        dataset = %dataset.display(),
        quality_report = %quality_report.display(),
        change_log = %change_log_path.display(),
        "artifacts written"
    );

    Ok(Artifacts {
        dataset,
        quality_report,
        change_log: change_log_path,
    })
}

fn write_dataset(path: &Path, table: &Table) -> Result<()> {
    let tmp = temp_sibling(path);

    let mut writer =
        csv::Writer::from_path(&tmp).map_err(|e| persistence_err(DATASET_FILENAME, &e))?;
    writer
        .write_record(&table.columns)
        .map_err(|e| persistence_err(DATASET_FILENAME, &e))?;
    for row in &table.rows {
        let record: Vec<String> = row.iter().map(|c| c.to_display()).collect();
        writer
            .write_record(&record)
            .map_err(|e| persistence_err(DATASET_FILENAME, &e))?;
    }
    writer
        .flush()
        .map_err(|e| persistence_err(DATASET_FILENAME, &e))?;
    drop(writer);

    std::fs::rename(&tmp, path).map_err(|e| persistence_err(DATASET_FILENAME, &e))
}

fn write_json<T: Serialize>(path: &Path, artifact: &str, value: &T) -> Result<()> {
    let tmp = temp_sibling(path);
    let body = serde_json::to_vec_pretty(value).map_err(|e| persistence_err(artifact, &e))?;
    std::fs::write(&tmp, body).map_err(|e| persistence_err(artifact, &e))?;
    std::fs::rename(&tmp, path).map_err(|e| persistence_err(artifact, &e))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn persistence_err(artifact: &str, cause: &dyn std::fmt::Display) -> PipelineError {
    PipelineError::Persistence {
        artifact: artifact.to_string(),
        reason: cause.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality;
    use crate::schema::CanonicalField;
    use crate::table::CellValue;
    use std::fs;

    #[test]
    fn test_artifacts_written_and_readable() {
        let dir = std::env::temp_dir().join("mca_reconcile_persist_test");
        let _ = fs::remove_dir_all(&dir);

        let mut table = Table::new(CanonicalField::column_names());
        let mut row = vec![CellValue::Null; CanonicalField::ALL.len()];
        row[0] = CellValue::Text("U1".to_string());
        table.push_row(row);

        let report = quality::validate(&table, Utc::now());
        let change_log = ChangeLog {
            duplicates_removed: 0,
            merge_timestamp: Utc::now(),
            quality_report: report.clone(),
        };

        let artifacts = persist(&dir, &table, &report, &change_log).unwrap();
        assert!(artifacts.dataset.is_file());
        assert!(artifacts.quality_report.is_file());
        assert!(artifacts.change_log.is_file());

        // No temporary leftovers under the final names.
        assert!(!dir.join(format!("{}.tmp", DATASET_FILENAME)).exists());

        let dump = fs::read_to_string(&artifacts.dataset).unwrap();
        assert!(dump.starts_with("CIN,CompanyName,"));

        let parsed: ChangeLog =
            serde_json::from_str(&fs::read_to_string(&artifacts.change_log).unwrap()).unwrap();
        assert_eq!(parsed.duplicates_removed, 0);
        assert_eq!(parsed.quality_report.total_records, 1);
    }

    #[test]
    fn test_unwritable_target_is_persistence_failure() {
        let dir = std::env::temp_dir().join("mca_reconcile_persist_fail");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        // A directory where the dataset file should go forces the rename to fail.
        fs::create_dir_all(dir.join(DATASET_FILENAME)).unwrap();

        let table = Table::new(CanonicalField::column_names());
        let report = quality::validate(&table, Utc::now());
        let change_log = ChangeLog {
            duplicates_removed: 0,
            merge_timestamp: Utc::now(),
            quality_report: report.clone(),
        };

        let err = persist(&dir, &table, &report, &change_log).unwrap_err();
        assert!(matches!(err, PipelineError::Persistence { .. }));
    }
}
