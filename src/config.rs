//! Pipeline configuration.
//!
//! Constructed once at startup (from flags or a JSON document) and passed
//! explicitly into each stage; nothing reads ambient global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// One configured source: a short identifier plus the filename expected
/// under the raw-data directory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    pub filename: String,
}

impl SourceSpec {
    pub fn new(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory containing one tabular file per configured source.
    pub raw_data_dir: PathBuf,

    /// Directory the canonical dataset and audit artifacts are written to.
    pub processed_data_dir: PathBuf,

    /// Bounded per-source load timeout; a source exceeding it is skipped.
    #[serde(default = "default_timeout_secs")]
    pub load_timeout_secs: u64,

    /// Source registry, in processing order. Row order of the merged
    /// dataset follows this order.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceSpec>,
}

fn default_timeout_secs() -> u64 {
    30
}

/// The five regional registry extracts this pipeline was built around.
fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new("maharashtra", "maharashtra.csv"),
        SourceSpec::new("gujarat", "gujarat.csv"),
        SourceSpec::new("delhi", "delhi.csv"),
        SourceSpec::new("tamil_nadu", "tamilnadu.csv"),
        SourceSpec::new("karnataka", "karnataka.csv"),
    ]
}

impl PipelineConfig {
    pub fn new(raw_data_dir: impl Into<PathBuf>, processed_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_data_dir: raw_data_dir.into(),
            processed_data_dir: processed_data_dir.into(),
            load_timeout_secs: default_timeout_secs(),
            sources: default_sources(),
        }
    }

    /// Load configuration from a JSON document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&raw)?;

        if config.sources.is_empty() {
            return Err(PipelineError::Config(
                "source registry is empty".to_string(),
            ));
        }

        Ok(config)
    }
}
