//! IRG - Identity Relationship Graph
//!
//! Builds the identity/resource graph from a directory of audit-trail
//! bundles, prints a report and optionally a listing of the graph.

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use irg::config::DEFAULT_LOG_FILTER;
use irg::report::{format_report, render_graph};
use irg::{run_directory, Cli, LogFormat};

/// Initialize tracing/logging on stderr, keeping stdout for the report.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing(LogFormat::from_env());

    let config = cli.into_config()?;

    println!(
        "building graph {} (skip_graph: {})",
        config.data_dir.display(),
        config.skip_graph
    );
    info!(
        data_dir = %config.data_dir.display(),
        skip_graph = config.skip_graph,
        service_version = env!("CARGO_PKG_VERSION"),
        "Starting graph build"
    );

    let output = run_directory(&config)?;

    print!("{}", format_report(&output));

    if !config.skip_graph {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        render_graph(&output.graph, &mut handle)?;
    }

    Ok(())
}
