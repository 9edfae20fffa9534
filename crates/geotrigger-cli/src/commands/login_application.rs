//! Login application command implementation.

use anyhow::{Context, Result};
use clap::Args;
use geotrigger::{Client, Config};

use crate::output;
use crate::session::{StoredSession, storage};

#[derive(Args, Debug)]
pub struct LoginApplicationArgs {
    /// Application client id
    #[arg(long)]
    pub client_id: String,

    /// Application client secret
    #[arg(long)]
    pub client_secret: String,
}

pub async fn run(args: LoginApplicationArgs, config: &Config) -> Result<()> {
    output::progress("Authenticating application...");

    let (client, ready) = Client::new_application(&args.client_id, &args.client_secret, config);
    ready.await.context("Failed to authenticate application")?;

    let session =
        StoredSession::capture(&client).context("Authentication finished without tokens")?;
    storage::save_session(&session).context("Failed to save session")?;

    output::success("Application authenticated");
    println!();
    output::field("Client ID", &session.client_id);

    Ok(())
}
