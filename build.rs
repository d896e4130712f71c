//! Embeds the release version for `workstation version`.
use std::process::Command;

const VERSION_VAR: &str = "WORKSTATION_VERSION";

/// `git describe` of the checkout, without the leading `v` of release tags.
fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty", "--match", "v*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Some(raw.strip_prefix('v').map(str::to_string).unwrap_or(raw))
}

fn main() {
    let version = std::env::var(VERSION_VAR).ok().or_else(describe);
    if let Some(version) = version.filter(|v| !v.is_empty()) {
        println!("cargo:rustc-env={VERSION_VAR}={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
    println!("cargo:rerun-if-env-changed={VERSION_VAR}");
}
