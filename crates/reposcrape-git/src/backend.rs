//! Git backend implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use reposcrape_core::{Backend, Progress, Repository, Result, ScrapeState, UpdateKind};
use tracing::{debug, info, warn};

use crate::repository::{GitCheckoutConfig, GitRepository};

/// A Git-based fetch backend.
///
/// Each repository is cloned once into its own directory below the
/// destination root. Later scrapes of the same URL fetch into the existing
/// clone and rewrite the worktree only when the resolved commit moved.
pub struct GitBackend {
    /// Destination root shared with other backends.
    root: PathBuf,
    /// Known clones, keyed by checkout directory.
    repositories: HashMap<PathBuf, GitRepository>,
    /// Outcome of the latest scrape.
    state: ScrapeState,
    /// Commit checked out by the latest successful scrape.
    current_commit: Option<String>,
}

impl GitBackend {
    /// Creates a new Git backend writing below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            repositories: HashMap::new(),
            state: ScrapeState::new(),
            current_commit: None,
        }
    }

    /// Returns the destination root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the commit checked out by the latest successful scrape.
    pub fn current_commit(&self) -> Option<&str> {
        self.current_commit.as_deref()
    }

    fn sync(
        &mut self,
        repo: &Repository,
        config: GitCheckoutConfig,
        progress: &mut Progress<'_>,
    ) -> Result<(UpdateKind, String)> {
        let reference = config.reference().cloned();
        let local_path = config.local_path().to_path_buf();

        let repository = self
            .repositories
            .entry(local_path)
            .or_insert_with(|| GitRepository::new(config.clone()));
        repository.set_config(config);

        let update = if repository.exists_locally() {
            progress.status(format!("Fetching {}", repo));
            repository.fetch()?;
            UpdateKind::Incremental
        } else {
            progress.status(format!("Cloning {}", repo));
            repository.clone_repo()?;
            UpdateKind::Full
        };

        let label = reference
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| repository.default_branch().map(str::to_string))
            .unwrap_or_else(|| "HEAD".to_string());
        progress.status(format!("Checking out {}", label));

        let checkout = repository.checkout(reference.as_ref())?;
        let update = match update {
            UpdateKind::Incremental if !checkout.changed => UpdateKind::Unchanged,
            other => other,
        };

        Ok((update, checkout.commit))
    }
}

impl Backend for GitBackend {
    fn scrape(&mut self, repo: &Repository, progress: &mut Progress<'_>) {
        let repo_dir = repo.checkout_dir(&self.root);
        self.state.begin(&repo_dir);

        debug!("Scraping {} into {:?}", repo, repo_dir);

        let result = GitCheckoutConfig::from_repository(repo, &self.root)
            .and_then(|config| self.sync(repo, config, progress));

        match result {
            Ok((update, commit)) => {
                info!(
                    "Git repository {} ready ({}) at commit {}",
                    repo,
                    update,
                    &commit[..8.min(commit.len())]
                );
                self.state.record_success(update);
                progress.advance(format!("Scraped {} at {}", repo, &commit[..8.min(commit.len())]));
                self.current_commit = Some(commit);
            },
            Err(e) => {
                warn!("Failed to scrape {}: {}", repo, e);
                self.state.record_failure(&e);
                progress.advance(format!("Failed to scrape {}", repo));
            },
        }
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
        "git"
    }
}

impl std::fmt::Debug for GitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitBackend")
            .field("root", &self.root)
            .field("repositories", &self.repositories.len())
            .field("current_commit", &self.current_commit)
            .finish()
    }
}
