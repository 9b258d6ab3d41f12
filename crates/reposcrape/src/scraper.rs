//! The dispatcher.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use reposcrape_core::{
    Backend, Progress, ProgressFn, RepoSpec, RepoType, Result, ScrapeError, ScrapeOutcome,
    UpdateKind,
};
use tracing::{debug, info};

use crate::registry::Registry;

/// Routes repository descriptors to the backend for their type.
///
/// Each backend is created on first use and then reused, so a backend's
/// local bookkeeping (known clones, extracted digests) survives between
/// calls. Only the outcome of the most recent scrape is kept.
///
/// `scrape` takes `&mut self`: one scrape at a time per dispatcher.
pub struct Scraper {
    root: PathBuf,
    registry: Registry,
    backends: HashMap<RepoType, Box<dyn Backend>>,
    outcome: Option<ScrapeOutcome>,
}

impl Scraper {
    /// Creates a dispatcher writing below `root` with the built-in backends.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_registry(root, Registry::standard())
    }

    /// Creates a dispatcher with a custom backend registry.
    pub fn with_registry(root: impl Into<PathBuf>, registry: Registry) -> Self {
        Self {
            root: root.into(),
            registry,
            backends: HashMap::new(),
            outcome: None,
        }
    }

    /// Fetches or refreshes the repository described by `repo`.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` if the backend recorded
    /// errors (see [`errors`](Self::errors)).
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::UnknownRepoType`] or
    /// [`ScrapeError::InvalidDescriptor`] if the descriptor cannot be
    /// routed. In that case no backend is created and the previous outcome
    /// is kept.
    pub fn scrape(
        &mut self,
        repo: impl Into<RepoSpec>,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<bool> {
        let repo = repo.into().normalize()?;
        let repo_type = repo.repo_type();

        let backend = match self.backends.entry(repo_type) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let backend = self
                    .registry
                    .construct(repo_type, &self.root)
                    .ok_or_else(|| ScrapeError::unknown_repo_type(repo_type.as_str()))?;
                debug!("Created {} backend below {:?}", backend.name(), self.root);
                entry.insert(backend)
            },
        };

        info!("Scraping {}", repo);
        let mut progress = Progress::new(progress);
        backend.scrape(&repo, &mut progress);

        let outcome = ScrapeOutcome::capture(repo_type, &**backend);
        let succeeded = outcome.succeeded();
        self.outcome = Some(outcome);

        Ok(succeeded)
    }

    /// Returns the errors of the most recent scrape.
    pub fn errors(&self) -> &[String] {
        self.outcome
            .as_ref()
            .map(ScrapeOutcome::errors)
            .unwrap_or_default()
    }

    /// Returns true unless the most recent scrape failed.
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().is_none_or(ScrapeOutcome::succeeded)
    }

    /// Returns the local path of the most recent scrape.
    pub fn result_path(&self) -> Option<&Path> {
        self.outcome.as_ref().and_then(ScrapeOutcome::repo_dir)
    }

    /// Returns what the most recent scrape did to its local copy.
    pub fn last_update(&self) -> Option<UpdateKind> {
        self.outcome.as_ref().and_then(ScrapeOutcome::update)
    }

    /// Returns the full outcome of the most recent scrape.
    pub fn outcome(&self) -> Option<&ScrapeOutcome> {
        self.outcome.as_ref()
    }

    /// Returns the destination root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if a backend for `repo_type` has been created.
    pub fn has_backend(&self, repo_type: RepoType) -> bool {
        self.backends.contains_key(&repo_type)
    }

    /// Returns the number of backends created so far.
    pub fn cached_backends(&self) -> usize {
        self.backends.len()
    }
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut cached: Vec<_> = self.backends.keys().copied().collect();
        cached.sort();

        f.debug_struct("Scraper")
            .field("root", &self.root)
            .field("registry", &self.registry)
            .field("backends", &cached)
            .field("outcome", &self.outcome)
            .finish()
    }
}
