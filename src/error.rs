use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Source '{source_name}' could not be parsed: {reason}")]
    ParseFailure { source_name: String, reason: String },

    #[error("No sources loaded successfully")]
    NoSourcesLoaded,

    #[error("Merge produced an empty dataset")]
    EmptyMergeResult,

    #[error("Failed to write artifact '{artifact}': {reason}")]
    Persistence { artifact: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Source-level failures are recovered locally (skip + warning);
    /// everything else aborts the run.
    pub fn is_source_level(&self) -> bool {
        matches!(
            self,
            PipelineError::SourceUnavailable { .. } | PipelineError::ParseFailure { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
