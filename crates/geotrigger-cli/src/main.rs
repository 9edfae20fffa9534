//! geotrigger - CLI tool for Geotrigger sessions.
//!
//! This is a thin wrapper over the `geotrigger` library. It registers a
//! device or authenticates an application, keeps the resulting session on
//! disk, and makes API requests with it.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use geotrigger::Config;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    let config = Config::new(&cli.auth_url, &cli.api_url).context("Invalid service URL")?;

    commands::handle(cli.command, &config).await
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays machine-readable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
