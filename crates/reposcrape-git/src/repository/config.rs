//! Git checkout configuration.

use std::path::{Path, PathBuf};

use gix::credentials::helper::Action;
use gix::credentials::protocol::Outcome;
use gix::sec::identity::Account;
use reposcrape_core::{Repository, Result, ScrapeError};

use super::GitRef;

/// Committer name recorded in reflogs when none is configured.
const COMMITTER_NAME: &str = "reposcrape";
/// Committer email recorded in reflogs when none is configured.
const COMMITTER_EMAIL: &str = "reposcrape@localhost";

/// Everything needed to clone and update one Git repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCheckoutConfig {
    /// The Git repository URI (HTTPS, SSH, file or local path).
    uri: String,

    /// Local path where the repository will be cloned.
    local_path: PathBuf,

    /// Branch, tag or commit to check out. `None` means the remote default.
    reference: Option<GitRef>,

    /// Username for authentication (optional).
    username: Option<String>,

    /// Password or token for authentication (optional).
    password: Option<String>,

    /// SSH private key path (optional).
    private_key: Option<PathBuf>,
}

impl GitCheckoutConfig {
    /// Creates a new builder for GitCheckoutConfig.
    pub fn builder() -> GitCheckoutConfigBuilder {
        GitCheckoutConfigBuilder::default()
    }

    /// Derives the checkout configuration for `repo` scraped below `root`.
    pub fn from_repository(repo: &Repository, root: &Path) -> Result<Self> {
        let mut builder = Self::builder()
            .uri(repo.url())
            .local_path(repo.checkout_dir(root));

        if let Some(tag) = repo.tag() {
            builder = builder.reference(GitRef::parse(tag));
        }
        if let Some(username) = repo.first_credential() {
            builder = builder.basic_auth(username, repo.second_credential().unwrap_or_default());
        }
        if let Some(key) = repo.ssh_key() {
            builder = builder.ssh_auth(key);
        }

        builder.build()
    }

    /// Returns the repository URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the local path for the cloned repository.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Returns the reference to check out.
    pub fn reference(&self) -> Option<&GitRef> {
        self.reference.as_ref()
    }

    /// Returns a credential callback answering every request with the
    /// configured basic auth account, if any.
    ///
    /// Credentials are handed to the transport on demand and never become
    /// part of the remote URL stored in `.git/config`.
    pub fn credential_helper(
        &self,
    ) -> Option<impl FnMut(Action) -> gix::credentials::protocol::Result + Send + 'static> {
        let username = self.username.clone()?;
        let password = self.password.clone().unwrap_or_default();

        Some(move |action: Action| match action {
            Action::Get(ctx) => Ok(Some(Outcome {
                identity: Account {
                    username: username.clone(),
                    password: password.clone(),
                },
                next: ctx.into(),
            })),
            Action::Store(_) | Action::Erase(_) => Ok(None),
        })
    }

    /// Returns in-memory git configuration overrides for this checkout.
    ///
    /// A committer identity fallback is always present: moving `HEAD` and
    /// remote-tracking refs writes reflog entries, which needs one even on
    /// hosts without `user.name`/`user.email`.
    pub fn config_overrides(&self) -> Vec<String> {
        let mut overrides = vec![
            format!("gitoxide.committer.nameFallback={}", COMMITTER_NAME),
            format!("gitoxide.committer.emailFallback={}", COMMITTER_EMAIL),
        ];
        if let Some(key) = &self.private_key {
            overrides.push(format!(
                "core.sshCommand=ssh -i {} -o IdentitiesOnly=yes",
                key.display()
            ));
        }
        overrides
    }
}

/// Builder for GitCheckoutConfig.
#[derive(Debug, Default)]
pub struct GitCheckoutConfigBuilder {
    uri: Option<String>,
    local_path: Option<PathBuf>,
    reference: Option<GitRef>,
    username: Option<String>,
    password: Option<String>,
    private_key: Option<PathBuf>,
}

impl GitCheckoutConfigBuilder {
    /// Sets the Git repository URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Sets the local path for cloning.
    pub fn local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    /// Sets the reference to check out.
    pub fn reference(mut self, reference: GitRef) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Sets basic authentication credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets SSH authentication.
    pub fn ssh_auth(mut self, private_key: impl Into<PathBuf>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or the reference name
    /// is not a valid Git reference.
    pub fn build(self) -> Result<GitCheckoutConfig> {
        let uri = self
            .uri
            .ok_or_else(|| ScrapeError::invalid_descriptor("uri is required"))?;
        let local_path = self
            .local_path
            .ok_or_else(|| ScrapeError::invalid_descriptor("local_path is required"))?;

        if let Some(reference) = &self.reference {
            reference.validate().map_err(|reason| {
                ScrapeError::RevisionNotFound(format!("{}: {}", reference.name(), reason))
            })?;
        }

        Ok(GitCheckoutConfig {
            uri,
            local_path,
            reference: self.reference,
            username: self.username,
            password: self.password.filter(|p| !p.is_empty()),
            private_key: self.private_key,
        })
    }
}
