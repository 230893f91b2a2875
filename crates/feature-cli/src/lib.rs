//! Quality Features Command Line
//!
//! Reads a completed feature log, runs one extractor variant over it and
//! renders the result as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use feature_engine::{ExtractorConfig, FeatureExtractor, FeatureResult, VARIANT_TYPES};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "QUALITY_FEATURES";

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "quality-features", version, about = "Parse per-frame video quality feature logs")]
pub struct Args {
    /// Extractor type that wrote the log
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(VARIANT_TYPES))]
    pub variant: String,

    /// Asset identifier recorded in the result
    #[arg(long)]
    pub asset: String,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Include per-feature mean scores
    #[arg(long)]
    pub summary: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Completed log file written by the extraction tool
    pub log_file: PathBuf,
}

/// JSON document written to stdout
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub executor_id: String,
    #[serde(flatten)]
    pub result: &'a FeatureResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<BTreeMap<String, f64>>,
}

/// Initialize logging on stderr
pub fn init_logging(verbose: bool) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load extractor configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<ExtractorConfig> {
    load_config_from(path, None)
}

/// `env` replaces the process environment when given
fn load_config_from(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<ExtractorConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        )
        .build()
        .context("Failed to load configuration")?;

    settings
        .try_deserialize()
        .context("Invalid extractor configuration")
}

/// Run one extraction and render the JSON report
pub fn run(args: &Args) -> Result<String> {
    let config = load_config(args.config.as_deref())?;
    let extractor = FeatureExtractor::for_type(&args.variant, &config)?;

    let log_text = std::fs::read_to_string(&args.log_file)
        .with_context(|| format!("Failed to read log file {}", args.log_file.display()))?;
    info!("Read {} bytes from {}", log_text.len(), args.log_file.display());

    let result = extractor
        .extract(&args.asset, &log_text)
        .with_context(|| format!("Extraction failed for asset {}", args.asset))?;

    let report = Report {
        executor_id: result.executor_id(),
        result: &result,
        aggregates: args.summary.then(|| result.aggregate_scores()),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize result")
}
