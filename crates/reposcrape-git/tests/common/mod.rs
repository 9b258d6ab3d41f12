#![allow(dead_code)]
//! Git repository fixtures built with the `git` CLI.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Returns true if a usable `git` executable is on the PATH.
///
/// Cloning from a local path spawns `git-upload-pack`, so these tests need
/// it even though the backend itself is pure Rust.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Runs a git command in `path`, panicking with stderr on failure.
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_AUTHOR_DATE", "2024-01-01T00:00:00Z")
        .env("GIT_COMMITTER_DATE", "2024-01-01T00:00:00Z")
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A remote repository with a short, known history.
pub struct Origin {
    /// Commit with `VERSION=1` and `old.txt`.
    pub first: String,
    /// Commit with `VERSION=2`; `old.txt` removed.
    pub second: String,
}

/// Initialises `path` as a repository on `main` with two commits and a
/// `v1.0` tag on the first one.
pub fn origin_repo(path: &Path) -> Origin {
    fs::create_dir_all(path).unwrap();
    git(path, &["init", "--quiet"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test"]);
    git(path, &["config", "commit.gpgsign", "false"]);

    fs::write(path.join("VERSION"), "1\n").unwrap();
    fs::write(path.join("old.txt"), "legacy\n").unwrap();
    git(path, &["add", "-A"]);
    git(path, &["commit", "--quiet", "-m", "first"]);
    let first = git(path, &["rev-parse", "HEAD"]);
    git(path, &["tag", "-a", "v1.0", "-m", "release 1.0"]);

    fs::write(path.join("VERSION"), "2\n").unwrap();
    fs::remove_file(path.join("old.txt")).unwrap();
    git(path, &["add", "-A"]);
    git(path, &["commit", "--quiet", "-m", "second"]);
    let second = git(path, &["rev-parse", "HEAD"]);

    Origin { first, second }
}

/// Adds a commit on `main` writing `VERSION` and returns its id.
pub fn commit_version(path: &Path, version: &str) -> String {
    fs::write(path.join("VERSION"), format!("{version}\n")).unwrap();
    git(path, &["add", "-A"]);
    git(path, &["commit", "--quiet", "-m", version]);
    git(path, &["rev-parse", "HEAD"])
}

/// Reads the `VERSION` file of a checkout.
pub fn version_of(checkout: &Path) -> String {
    fs::read_to_string(checkout.join("VERSION"))
        .unwrap()
        .trim()
        .to_string()
}
