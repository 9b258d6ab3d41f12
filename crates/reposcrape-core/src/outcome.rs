//! Scrape outcome types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::repository::RepoType;
use crate::state::UpdateKind;

/// The result of the most recent scrape, as seen by the dispatcher.
///
/// An outcome is a snapshot: it is replaced, never merged, by the next
/// scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    /// The repository kind that was scraped.
    repo_type: RepoType,

    /// Error messages in the order they occurred.
    errors: Vec<String>,

    /// Local path of the fetched content.
    repo_dir: Option<PathBuf>,

    /// What the scrape did to the local copy.
    #[serde(skip)]
    update: Option<UpdateKind>,
}

impl ScrapeOutcome {
    /// Snapshots the latest result of `backend`.
    pub fn capture(repo_type: RepoType, backend: &dyn Backend) -> Self {
        Self {
            repo_type,
            errors: backend.errors().to_vec(),
            repo_dir: backend.repo_dir().map(Path::to_path_buf),
            update: backend.last_update(),
        }
    }

    /// Returns the repository kind.
    pub fn repo_type(&self) -> RepoType {
        self.repo_type
    }

    /// Returns true if there are no errors.
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns the local path of the fetched content.
    pub fn repo_dir(&self) -> Option<&Path> {
        self.repo_dir.as_deref()
    }

    /// Returns what the scrape did to the local copy.
    pub fn update(&self) -> Option<UpdateKind> {
        self.update
    }
}
