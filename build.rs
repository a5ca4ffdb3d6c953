//! Embeds a human-readable version string as `BUILD_INFO_HUMAN`.
//!
//! The string is `<crate version> (<git describe>) <rustc --version>`. When
//! the checkout has no tags the git part becomes
//! `v<crate version>-<commit date>-<short sha>`, and outside a git checkout it
//! is omitted.

use std::process::Command;

fn main() {
    ["src", "build.rs", "Cargo.toml", ".git/HEAD"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Untagged checkouts only yield a bare hash from `git describe`.
fn git_version() -> Option<String> {
    let describe = run("git", &["describe", "--tags", "--always", "--dirty"])?;
    if describe.starts_with('v') || describe.contains("-g") {
        return Some(describe);
    }

    let date = run("git", &["log", "-1", "--format=%ct"])
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y%m%d%H%M%S").to_string())?;

    Some(format!(
        "v{}-{date}-{describe}",
        env!("CARGO_PKG_VERSION")
    ))
}

fn build_info() -> String {
    [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        git_version().map(|v| format!("({v})")),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
