//! Returns smoke test CLI
//!
//! Exercises the returns, refunds and warranties API of an e-commerce
//! backend end to end and exits non-zero when a required check fails.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use returns_smoke::common::config::Config;
use returns_smoke::common::logging;
use returns_smoke::workflow::report;
use returns_smoke::{cli, commands};

#[derive(Parser)]
#[command(name = "returns-smoke", about = "End-to-end smoke test for a returns backend")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file (default: the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API root, e.g. http://localhost:8000/api
    #[arg(long, global = true, env = "RETURNS_SMOKE_BASE_URL")]
    base_url: Option<String>,

    /// Debug logging, including request and response traces
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose, cli.log_file.as_deref());
    if cli.no_color {
        report::disable_color();
    }

    let result = run(cli.command, cli.config, cli.base_url).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config_file: Option<PathBuf>,
    base_url: Option<String>,
) -> returns_smoke::Result<()> {
    let mut config = Config::load(config_file.as_deref())?;
    config.override_base_url(base_url);
    cli::dispatch(command, &config, config_file.as_deref()).await
}
