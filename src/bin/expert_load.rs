

use std::path::PathBuf;

use anyhow::Context;
use expert_finder::{ExpertConfig, ExpertContext};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// expert-load [members.csv] [linkedin.json]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("expert_finder=info".parse()?))
        .init();

    let mut config = ExpertConfig::from_env()?;
    let mut args = std::env::args().skip(1);
    if let Some(csv) = args.next() {
        config.directory_csv = Some(PathBuf::from(csv));
    }
    if let Some(linkedin) = args.next() {
        config.linkedin_json = Some(PathBuf::from(linkedin));
    }

    if config.directory_csv.is_none() {
        anyhow::bail!("no directory CSV: pass a path or set EXPERTS_DIRECTORY_CSV");
    }

    info!("Loading directory into {}", config.collection_path().display());
    let context = ExpertContext::build(config).await.context("bulk load failed")?;

    let report = context.startup_report.unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.skipped.is_empty() {
        std::process::exit(2);
    }
    Ok(())
}
