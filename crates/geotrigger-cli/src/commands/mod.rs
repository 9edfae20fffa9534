//! Subcommand implementations.

mod login_application;
mod logout;
mod register_device;
mod request;
mod session;

use anyhow::Result;
use clap::Subcommand;
use geotrigger::Config;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register an anonymous device and store its session
    RegisterDevice(register_device::RegisterDeviceArgs),

    /// Authenticate as an application and store its session
    LoginApplication(login_application::LoginApplicationArgs),

    /// Make an API request with the stored session
    Request(request::RequestArgs),

    /// Display the stored session
    Session(session::SessionArgs),

    /// Remove the stored session
    Logout(logout::LogoutArgs),
}

pub async fn handle(cmd: Command, config: &Config) -> Result<()> {
    match cmd {
        Command::RegisterDevice(args) => register_device::run(args, config).await,
        Command::LoginApplication(args) => login_application::run(args, config).await,
        Command::Request(args) => request::run(args, config).await,
        Command::Session(args) => session::run(args, config).await,
        Command::Logout(args) => logout::run(args),
    }
}
