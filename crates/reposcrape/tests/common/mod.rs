#![allow(dead_code)]
//! Test backends and fixtures for dispatcher tests.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use reposcrape::{Backend, Progress, Registry, RepoType, Repository, UpdateKind};
use reposcrape_core::ScrapeState;

/// A backend that fails whenever the descriptor carries `"fail": true`.
///
/// It reports one status message and one advance per scrape, and answers
/// `Full` for the first scrape of a URL and `Incremental` afterwards.
pub struct MockBackend {
    root: PathBuf,
    state: ScrapeState,
    seen: Vec<String>,
}

impl MockBackend {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            state: ScrapeState::new(),
            seen: Vec::new(),
        }
    }
}

impl Backend for MockBackend {
    fn scrape(&mut self, repo: &Repository, progress: &mut Progress<'_>) {
        self.state.begin(repo.checkout_dir(&self.root));
        progress.status(format!("Working on {}", repo));

        let fail = repo
            .option("fail")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if fail {
            self.state.record_failure("mock failure");
            progress.advance(format!("Failed {}", repo));
            return;
        }

        let update = if self.seen.iter().any(|u| u == repo.url()) {
            UpdateKind::Incremental
        } else {
            self.seen.push(repo.url().to_string());
            UpdateKind::Full
        };
        self.state.record_success(update);
        progress.advance(format!("Done {}", repo));
    }

    fn repo_dir(&self) -> Option<&Path> {
        self.state.repo_dir()
    }

    fn errors(&self) -> &[String] {
        self.state.errors()
    }

    fn last_update(&self) -> Option<UpdateKind> {
        self.state.last_update()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A registry of mock backends for every type, counting constructions.
pub fn counting_registry() -> (Registry, Arc<AtomicUsize>) {
    let constructed = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::empty();

    for repo_type in RepoType::all().iter().copied() {
        let counter = Arc::clone(&constructed);
        registry = registry.register(repo_type, move |root| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(MockBackend::new(root))
        });
    }

    (registry, constructed)
}

/// Returns true if a usable `git` executable is on the PATH.
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
