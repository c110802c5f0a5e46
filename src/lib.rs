//! Company-registry reconciliation pipeline.
//!
//! Ingests tabular registry extracts produced independently by regional
//! sources, reconciles them into one canonical, deduplicated dataset, and
//! writes audit artifacts (quality report, change log) alongside it.

pub mod analyzer;
pub mod cleanse;
pub mod config;
pub mod dedup;
pub mod error;
pub mod loader;
pub mod mapper;
pub mod merge;
pub mod persist;
pub mod pipeline;
pub mod quality;
pub mod schema;
pub mod standardize;
pub mod table;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutcome};
