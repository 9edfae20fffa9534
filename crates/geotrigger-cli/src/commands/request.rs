//! Request command implementation.

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Args;
use geotrigger::Config;
use serde_json::Value;

use crate::output;
use crate::session::{StoredSession, storage};

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// API route relative to the API base URL (e.g., trigger/list)
    pub route: String,

    /// Request parameters as inline JSON
    #[arg(long, conflicts_with = "json")]
    pub params: Option<String>,

    /// JSON file with request parameters (use - for stdin)
    #[arg(long)]
    pub json: Option<String>,
}

pub async fn run(args: RequestArgs, config: &Config) -> Result<()> {
    let stored = storage::require_session()?;
    let params = read_params(&args)?;

    let client = stored.restore(config)?;
    let result = client.request::<Value, _>(&args.route, &params).await;

    // Keep tokens renewed during the request, even if it then failed.
    if let Some(current) = StoredSession::capture(&client)
        && current != stored
    {
        tracing::info!("Persisting refreshed tokens");
        storage::save_session(&current).context("Failed to save refreshed session")?;
    }

    let response = result.with_context(|| format!("Request to '{}' failed", args.route))?;
    output::json_pretty(&response)
}

fn read_params(args: &RequestArgs) -> Result<Value> {
    if let Some(ref inline) = args.params {
        return serde_json::from_str(inline).context("Invalid JSON in --params");
    }

    match args.json.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            serde_json::from_str(&buf).context("Invalid JSON from stdin")
        }
        Some(path) => {
            let content = std::fs::read_to_string(path).context("Failed to read JSON file")?;
            serde_json::from_str(&content).context("Invalid JSON in file")
        }
        None => Ok(Value::Object(serde_json::Map::new())),
    }
}
