//! CLI argument definitions.

use clap::Parser;
use geotrigger::config::{DEFAULT_API_URL, DEFAULT_AUTH_URL};

use crate::commands::Command;

/// Geotrigger CLI tool for device and application sessions.
#[derive(Parser, Debug)]
#[command(name = "geotrigger")]
#[command(author, version = env!("GEOTRIGGER_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Base URL of the OAuth endpoints
    #[arg(long, global = true, env = "GEOTRIGGER_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    pub auth_url: String,

    /// Base URL of the Geotrigger API
    #[arg(long, global = true, env = "GEOTRIGGER_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}
