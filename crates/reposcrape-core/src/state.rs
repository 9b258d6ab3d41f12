//! Per-backend scrape state tracking.

use std::fmt;
use std::path::{Path, PathBuf};

/// How the most recent scrape touched the local copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    /// No local copy existed; everything was fetched.
    Full,
    /// An existing local copy was updated in place.
    Incremental,
    /// The remote had not changed; nothing was rewritten.
    Unchanged,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full fetch"),
            Self::Incremental => write!(f, "incremental update"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Tracks the result of the latest scrape performed by one backend.
///
/// Backends embed one of these and expose it through the
/// [`Backend`](crate::Backend) accessors.
#[derive(Debug, Default)]
pub struct ScrapeState {
    /// Directory of the latest scrape.
    repo_dir: Option<PathBuf>,
    /// Errors of the latest scrape.
    errors: Vec<String>,
    /// What the latest scrape did to the local copy.
    last_update: Option<UpdateKind>,
}

impl ScrapeState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new scrape into `repo_dir`, forgetting the previous outcome.
    pub fn begin(&mut self, repo_dir: impl Into<PathBuf>) {
        self.repo_dir = Some(repo_dir.into());
        self.errors.clear();
        self.last_update = None;
    }

    /// Records a successful scrape.
    pub fn record_success(&mut self, update: UpdateKind) {
        self.last_update = Some(update);
    }

    /// Records a failure.
    pub fn record_failure(&mut self, error: impl fmt::Display) {
        self.errors.push(error.to_string());
    }

    /// Returns the directory of the latest scrape.
    pub fn repo_dir(&self) -> Option<&Path> {
        self.repo_dir.as_deref()
    }

    /// Returns the errors of the latest scrape.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns true if the latest scrape finished without errors.
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns what the latest successful scrape did.
    pub fn last_update(&self) -> Option<UpdateKind> {
        self.last_update
    }
}
