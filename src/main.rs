use anyhow::Result;
use clap::Parser;
use cnes_beds::{config::DEFAULT_CONFIG_PATH, pipeline};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Download CNES hospital-bed tables into a single output file.
#[derive(Parser)]
#[command(name = "cnes_beds", version)]
struct Cli {
    /// Env-style configuration file
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!(config = %cli.config.display(), "startup");

    let summary = pipeline::run_from_file(&cli.config).map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{stage} stage failed"))
    })?;

    println!(
        "{} records from {} tables ({} states) written to {}",
        summary.records,
        summary.tables,
        summary.states,
        summary.output.display()
    );
    Ok(())
}
