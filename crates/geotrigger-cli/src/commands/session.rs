//! Session command implementation.

use anyhow::Result;
use clap::Args;
use geotrigger::Config;

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Print the session info as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SessionArgs, config: &Config) -> Result<()> {
    let stored = storage::require_session()?;
    let info = stored.restore(config)?.session_info();

    if args.json {
        return output::json_pretty(&info);
    }

    output::field("kind", &stored.kind.to_string());
    for (key, value) in &info {
        output::field(key, value);
    }
    if let Some(expires_at) = stored.expires_at {
        output::field("expires_at", &expires_at.to_rfc3339());
    }

    Ok(())
}
