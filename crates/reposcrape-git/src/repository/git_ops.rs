//! Git repository operations using gix (pure Rust).

use std::fs;
use std::path::Path;

use gix::bstr::ByteSlice;
use gix::refs::transaction::{Change, LogChange, PreviousValue, RefEdit, RefLog};
use reposcrape_core::{Result, ScrapeError};
use tracing::{debug, info, warn};

use super::{GitCheckoutConfig, GitRef};

/// Symbolic ref pointing at the remote's default branch.
const REMOTE_HEAD: &str = "refs/remotes/origin/HEAD";

/// Result of checking out a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// The commit now present in the worktree.
    pub commit: String,
    /// Whether the worktree had to be rewritten.
    pub changed: bool,
}

/// A local clone of one remote Git repository.
///
/// Uses gix (pure Rust) for all Git operations - no system git required.
pub struct GitRepository {
    config: GitCheckoutConfig,
    default_branch: Option<String>,
}

impl GitRepository {
    /// Creates a new GitRepository instance.
    pub fn new(config: GitCheckoutConfig) -> Self {
        Self {
            config,
            default_branch: None,
        }
    }

    /// Replaces the configuration, e.g. when the requested reference changed.
    pub fn set_config(&mut self, config: GitCheckoutConfig) {
        self.config = config;
    }

    /// Returns the local repository path.
    pub fn local_path(&self) -> &Path {
        self.config.local_path()
    }

    /// Returns the branch the remote HEAD pointed to when cloned.
    pub fn default_branch(&self) -> Option<&str> {
        self.default_branch.as_deref()
    }

    /// Checks if the repository exists locally.
    pub fn exists_locally(&self) -> bool {
        self.local_path().join(".git").exists()
    }

    /// Clones the repository.
    ///
    /// A failed clone leaves no directory behind so the next attempt starts
    /// from scratch.
    pub fn clone_repo(&mut self) -> Result<()> {
        info!(
            "Cloning repository from {} to {:?}",
            self.config.uri(),
            self.local_path()
        );

        match Self::clone_blocking(&self.config) {
            Ok(default_branch) => {
                self.default_branch = default_branch;
                info!("Repository cloned successfully");
                Ok(())
            },
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(self.local_path()) {
                    debug!(
                        "Failed to remove partial clone {:?}: {}",
                        self.local_path(),
                        cleanup
                    );
                }
                Err(e)
            },
        }
    }

    /// Blocking clone operation using gix.
    ///
    /// Returns the short name of the branch HEAD points at after the clone.
    fn clone_blocking(config: &GitCheckoutConfig) -> Result<Option<String>> {
        let local_path = config.local_path();

        // Leftovers of an earlier failed attempt
        if local_path.exists() {
            fs::remove_dir_all(local_path)?;
        }
        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let url = gix::url::parse(config.uri().into())
            .map_err(|e| ScrapeError::git(format!("Invalid URL: {}", e)))?;

        let mut prepare = gix::prepare_clone(url, local_path)
            .map_err(|e| ScrapeError::git(format!("Failed to prepare clone: {}", e)))?
            .with_in_memory_config_overrides(config.config_overrides());

        let credentials = config.clone();
        prepare = prepare.configure_connection(move |connection| {
            if let Some(helper) = credentials.credential_helper() {
                connection.set_credentials(helper);
            }
            Ok(())
        });

        let (mut checkout, _outcome) = prepare
            .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| ScrapeError::git(format!("Clone failed: {}", e)))?;

        let (repo, _outcome) = checkout
            .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| ScrapeError::git(format!("Checkout failed: {}", e)))?;

        let default_branch = repo
            .head_name()
            .ok()
            .flatten()
            .map(|name| name.shorten().to_str_lossy().into_owned());

        Ok(default_branch)
    }

    /// Fetches the latest changes from the remote.
    pub fn fetch(&mut self) -> Result<()> {
        if !self.exists_locally() {
            return Err(ScrapeError::git("repository has not been cloned"));
        }

        info!("Fetching updates for repository at {:?}", self.local_path());

        match Self::fetch_blocking(&self.config) {
            Ok(()) => {
                info!("Repository fetched successfully");
                Ok(())
            },
            Err(e) => {
                warn!("Fetch failed: {}", e);
                Err(e)
            },
        }
    }

    /// Blocking fetch operation using gix.
    fn fetch_blocking(config: &GitCheckoutConfig) -> Result<()> {
        let repo = Self::open(config)?;

        let remote = repo
            .find_default_remote(gix::remote::Direction::Fetch)
            .ok_or_else(|| ScrapeError::git("No default remote found"))?
            .map_err(|e| ScrapeError::git(format!("Failed to find remote: {}", e)))?;

        let mut connection = remote
            .connect(gix::remote::Direction::Fetch)
            .map_err(|e| ScrapeError::git(format!("Failed to connect: {}", e)))?;
        if let Some(helper) = config.credential_helper() {
            connection.set_credentials(helper);
        }

        connection
            .prepare_fetch(gix::progress::Discard, Default::default())
            .map_err(|e| ScrapeError::git(format!("Failed to prepare fetch: {}", e)))?
            .receive(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| ScrapeError::git(format!("Fetch failed: {}", e)))?;

        Ok(())
    }

    fn open(config: &GitCheckoutConfig) -> Result<gix::Repository> {
        let options = gix::open::Options::default().config_overrides(config.config_overrides());
        gix::open_opts(config.local_path(), options)
            .map_err(|e| ScrapeError::git(format!("Failed to open repo: {}", e)))
    }

    /// Makes the worktree match `reference` (or the remote default branch).
    ///
    /// The worktree is rewritten only when HEAD is not already at the
    /// resolved commit. After a rewrite HEAD is detached at that commit.
    pub fn checkout(&mut self, reference: Option<&GitRef>) -> Result<Checkout> {
        let repo = Self::open(&self.config)?;
        let (commit_id, tree_id) = self.resolve(&repo, reference)?;

        let current = repo.head_id().ok().map(|id| id.detach());
        let has_index = self.local_path().join(".git").join("index").exists();
        if current == Some(commit_id) && has_index {
            debug!("Worktree already at {}", commit_id);
            return Ok(Checkout {
                commit: commit_id.to_string(),
                changed: false,
            });
        }

        debug!("Checking out {} in {:?}", commit_id, self.local_path());

        Self::materialize(&repo, self.local_path(), tree_id)?;
        Self::detach_head(&repo, commit_id)?;

        Ok(Checkout {
            commit: commit_id.to_string(),
            changed: true,
        })
    }

    /// Resolves a reference to its commit and tree ids.
    fn resolve(
        &self,
        repo: &gix::Repository,
        reference: Option<&GitRef>,
    ) -> Result<(gix::ObjectId, gix::ObjectId)> {
        let (label, candidates) = match reference {
            Some(reference) => (reference.name().to_string(), reference.candidates()),
            None => {
                let mut candidates = vec![REMOTE_HEAD.to_string()];
                if let Some(branch) = &self.default_branch {
                    candidates.push(format!("refs/remotes/origin/{}", branch));
                }
                candidates.push("HEAD".to_string());
                ("HEAD".to_string(), candidates)
            },
        };

        for spec in &candidates {
            let id = match repo.rev_parse_single(spec.as_str()) {
                Ok(id) => id,
                Err(e) => {
                    debug!("{} did not resolve: {}", spec, e);
                    continue;
                },
            };

            let commit = id
                .object()
                .map_err(|e| ScrapeError::git(format!("Failed to read {}: {}", spec, e)))?
                .peel_to_commit()
                .map_err(|_| ScrapeError::RevisionNotFound(label.clone()))?;
            let tree_id = commit
                .tree_id()
                .map_err(|e| ScrapeError::git(format!("Failed to decode commit: {}", e)))?
                .detach();

            return Ok((commit.id, tree_id));
        }

        Err(ScrapeError::RevisionNotFound(label))
    }

    /// Replaces everything but `.git` with the content of `tree_id`.
    fn materialize(repo: &gix::Repository, workdir: &Path, tree_id: gix::ObjectId) -> Result<()> {
        Self::clear_worktree(workdir)?;

        let mut index = repo
            .index_from_tree(&tree_id)
            .map_err(|e| ScrapeError::git(format!("Failed to build index: {}", e)))?;

        let mut options = repo
            .checkout_options(gix::worktree::stack::state::attributes::Source::IdMapping)
            .map_err(|e| ScrapeError::git(format!("Invalid checkout options: {}", e)))?;
        options.destination_is_initially_empty = true;

        let objects = repo
            .objects
            .clone()
            .into_arc()
            .map_err(|e| ScrapeError::git(format!("Failed to share object store: {}", e)))?;

        let outcome = gix::worktree::state::checkout(
            &mut index,
            workdir,
            objects,
            &gix::progress::Discard,
            &gix::progress::Discard,
            &gix::interrupt::IS_INTERRUPTED,
            options,
        )
        .map_err(|e| ScrapeError::git(format!("Checkout failed: {}", e)))?;

        if !outcome.errors.is_empty() {
            return Err(ScrapeError::git(format!(
                "Checkout failed for {} files",
                outcome.errors.len()
            )));
        }

        index
            .write(Default::default())
            .map_err(|e| ScrapeError::git(format!("Failed to write index: {}", e)))?;

        Ok(())
    }

    fn clear_worktree(workdir: &Path) -> Result<()> {
        for entry in fs::read_dir(workdir)? {
            let entry = entry?;
            if entry.file_name() == ".git" {
                continue;
            }

            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    fn detach_head(repo: &gix::Repository, commit_id: gix::ObjectId) -> Result<()> {
        let name = gix::refs::FullName::try_from("HEAD")
            .map_err(|e| ScrapeError::git(format!("Invalid reference name: {}", e)))?;

        repo.edit_reference(RefEdit {
            change: Change::Update {
                log: LogChange {
                    mode: RefLog::AndReference,
                    force_create_reflog: false,
                    message: format!("reposcrape: checkout {}", commit_id).into(),
                },
                expected: PreviousValue::Any,
                new: gix::refs::Target::Object(commit_id),
            },
            name,
            deref: false,
        })
        .map_err(|e| ScrapeError::git(format!("Failed to update HEAD: {}", e)))?;

        Ok(())
    }
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("uri", &self.config.uri())
            .field("local_path", &self.config.local_path())
            .field("default_branch", &self.default_branch)
            .finish()
    }
}
