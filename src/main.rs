use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use mca_reconcile::config::PipelineConfig;
use mca_reconcile::schema::ColumnAliasRegistry;
use mca_reconcile::Pipeline;

#[derive(Parser)]
#[command(name = "mca-reconcile")]
#[command(about = "Reconciles regional company-registry extracts into one canonical dataset")]
struct Args {
    /// Directory containing the raw source files
    #[arg(short, long, default_value = "data/raw")]
    data_dir: PathBuf,

    /// Directory for the canonical dataset and audit artifacts
    #[arg(short, long, default_value = "data/processed")]
    out_dir: PathBuf,

    /// Optional pipeline config (JSON); supersedes the directory flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Optional column-alias registry (JSON); defaults to the built-in one
    #[arg(short, long)]
    aliases: Option<PathBuf>,

    /// Per-source load timeout in seconds; when set, overrides the config
    /// file value as well (default: 30)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::new(&args.data_dir, &args.out_dir),
    };

    if let Some(secs) = args.timeout_secs {
        config.load_timeout_secs = secs;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let aliases = match &args.aliases {
        Some(path) => ColumnAliasRegistry::load(path)?,
        None => ColumnAliasRegistry::builtin(),
    };

    let pipeline = Pipeline::new(config, aliases);
    let outcome = pipeline.run().await?;

    info!(
        dataset = %outcome.artifacts.dataset.display(),
        total_records = outcome.total_records,
        duplicates_removed = outcome.duplicates_removed,
        overall_completeness = outcome.quality_report.overall_completeness_score,
        "run finished"
    );

    Ok(())
}
