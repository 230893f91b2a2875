//! Quality Features - Main Entry Point

use clap::Parser;
use feature_cli::{init_logging, run, Args};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("=== quality-features v{} ===", env!("CARGO_PKG_VERSION"));

    let report = run(&args)?;
    println!("{}", report);

    Ok(())
}
