//! Backend registry.

use std::collections::HashMap;
use std::path::Path;

use reposcrape_core::{Backend, RepoType};
use reposcrape_git::GitBackend;
use reposcrape_sources::{DownloadBackend, SvnBackend};

/// Builds a backend for the given destination root.
pub type BackendFactory = Box<dyn Fn(&Path) -> Box<dyn Backend> + Send + Sync>;

/// Maps each repository type to the constructor of its backend.
///
/// A registry is assembled before it is handed to a
/// [`Scraper`](crate::Scraper) and is read-only from then on.
pub struct Registry {
    factories: HashMap<RepoType, BackendFactory>,
}

impl Registry {
    /// Creates a registry with no backends.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates the registry of built-in backends.
    pub fn standard() -> Self {
        Self::empty()
            .register(RepoType::Git, |root| Box::new(GitBackend::new(root)))
            .register(RepoType::Svn, |root| Box::new(SvnBackend::new(root)))
            .register(RepoType::Download, |root| Box::new(DownloadBackend::new(root)))
    }

    /// Registers (or replaces) the constructor for `repo_type`.
    pub fn register<F>(mut self, repo_type: RepoType, factory: F) -> Self
    where
        F: Fn(&Path) -> Box<dyn Backend> + Send + Sync + 'static,
    {
        self.factories.insert(repo_type, Box::new(factory));
        self
    }

    /// Returns true if a backend is registered for `repo_type`.
    pub fn contains(&self, repo_type: RepoType) -> bool {
        self.factories.contains_key(&repo_type)
    }

    /// Constructs a new backend for `repo_type` writing below `root`.
    pub fn construct(&self, repo_type: RepoType, root: &Path) -> Option<Box<dyn Backend>> {
        self.factories.get(&repo_type).map(|factory| factory(root))
    }

    /// Returns the registered types in declaration order.
    pub fn repo_types(&self) -> Vec<RepoType> {
        RepoType::all()
            .iter()
            .copied()
            .filter(|t| self.contains(*t))
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("repo_types", &self.repo_types())
            .finish()
    }
}
