//! Register device command implementation.

use anyhow::{Context, Result};
use clap::Args;
use geotrigger::{Client, Config};

use crate::output;
use crate::session::{StoredSession, storage};

#[derive(Args, Debug)]
pub struct RegisterDeviceArgs {
    /// Application client id to register the device under
    #[arg(long)]
    pub client_id: String,
}

pub async fn run(args: RegisterDeviceArgs, config: &Config) -> Result<()> {
    output::progress("Registering device...");

    let (client, ready) = Client::new_device(&args.client_id, config);
    ready.await.context("Failed to register device")?;

    let session =
        StoredSession::capture(&client).context("Registration finished without tokens")?;
    storage::save_session(&session).context("Failed to save session")?;

    output::success("Device registered");
    println!();
    output::field("Client ID", &session.client_id);
    if let Some(ref device_id) = session.device_id {
        output::field("Device ID", device_id);
    }

    Ok(())
}
