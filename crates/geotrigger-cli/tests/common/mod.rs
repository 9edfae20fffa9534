use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Run the CLI with an isolated HOME and both service URLs pointed at `base_url`.
pub fn run_cli_with_env(args: &[&str], home: &Path, base_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_geotrigger"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("GEOTRIGGER_AUTH_URL", format!("{base_url}/oauth2"));
    cmd.env("GEOTRIGGER_API_URL", format!("{base_url}/api"));
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with an isolated HOME and expect success.
pub fn run_cli_with_env_success(args: &[&str], home: &Path, base_url: &str) -> String {
    let output = run_cli_with_env(args, home, base_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with an isolated HOME and expect failure, returning stderr.
pub fn run_cli_with_env_failure(args: &[&str], home: &Path, base_url: &str) -> String {
    let output = run_cli_with_env(args, home, base_url);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Location of the session file under an isolated HOME (Linux layout).
#[allow(dead_code)]
pub fn session_file(home: &Path) -> PathBuf {
    home.join("data").join("geotrigger").join("session.json")
}
