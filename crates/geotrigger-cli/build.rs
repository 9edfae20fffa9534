//! Embeds the release version reported by `geotrigger --version`.
//!
//! Inside a git checkout this is `git describe` output, so development builds
//! show the commit they came from. Source tarballs fall back to the package
//! version.

use std::env;
use std::path::Path;
use std::process::Command;

/// Tags are cut as `geotrigger-v1.2.3` or `v1.2.3`.
const TAG_PREFIXES: [&str; 2] = ["geotrigger-v", "v"];

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
    let git_dir = Path::new(&manifest_dir).join("../../.git");
    for watched in ["HEAD", "refs/tags"] {
        println!("cargo:rerun-if-changed={}", git_dir.join(watched).display());
    }

    let version = describe(&manifest_dir).unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=GEOTRIGGER_VERSION={version}");
}

fn describe(dir: &str) -> Option<String> {
    let output = Command::new("git")
        .current_dir(dir)
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let version = TAG_PREFIXES
        .iter()
        .find_map(|prefix| described.strip_prefix(prefix))
        .unwrap_or(described);

    (!version.is_empty()).then(|| version.to_string())
}
