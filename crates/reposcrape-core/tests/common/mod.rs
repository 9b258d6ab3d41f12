#![allow(dead_code)]
use reposcrape_core::{Repository, Result};

/// Helper to normalize a descriptor from a JSON string slice.
/// Panics if the JSON is invalid (intended for tests).
pub fn descriptor(json: &str) -> Result<Repository> {
    let value = serde_json::from_str(json).expect("Failed to parse test descriptor JSON");
    Repository::from_value(value)
}

/// Returns a fully populated git descriptor fixture.
pub fn full_git_descriptor() -> &'static str {
    r#"{
        "repo_type": "git",
        "url": "git@github.com:org/cookbooks.git",
        "tag": "v2.1.0",
        "first_credential": "deploy",
        "ssh_key": "/home/deploy/.ssh/id_ed25519",
        "display_name": "cookbooks",
        "submodules": true,
        "paths": ["cookbooks", "site-cookbooks"]
    }"#
}
