//! Error types for reposcrape.
//!
//! Two families of errors flow through the system:
//!
//! - **Configuration errors** ([`ScrapeError::UnknownRepoType`],
//!   [`ScrapeError::InvalidDescriptor`]) are returned synchronously from
//!   `Scraper::scrape` before any backend is touched.
//! - **Fetch errors** (everything else) happen inside a backend. Backends
//!   propagate them internally with `?` and flatten them into the error list
//!   of the scrape outcome instead of returning them.
//!
//! # Example
//!
//! ```
//! use reposcrape_core::{RepoType, Result, ScrapeError};
//!
//! fn parse_type(raw: &str) -> Result<RepoType> {
//!     raw.parse()
//! }
//!
//! let err = parse_type("ftp").unwrap_err();
//! assert!(err.is_configuration());
//! assert_eq!(err.to_string(), "unknown repository type: ftp");
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while scraping a repository.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The repository type discriminator is not registered.
    #[error("unknown repository type: {0}")]
    UnknownRepoType(String),

    /// The descriptor could not be normalized.
    #[error("invalid repository descriptor: {0}")]
    InvalidDescriptor(String),

    /// The requested branch, tag or revision does not exist.
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    /// A Git operation failed.
    #[error("git error: {0}")]
    Git(String),

    /// A Subversion operation failed.
    #[error("svn error: {0}")]
    Svn(String),

    /// The remote could not be reached or returned an error status.
    #[error("network failure fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// Downloaded content does not match the expected digest.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },

    /// An archive could not be unpacked.
    #[error("archive error in {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ScrapeError {
    /// Creates an UnknownRepoType error.
    pub fn unknown_repo_type(repo_type: impl Into<String>) -> Self {
        Self::UnknownRepoType(repo_type.into())
    }

    /// Creates an InvalidDescriptor error.
    pub fn invalid_descriptor(reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor(reason.into())
    }

    /// Creates a new Git error.
    pub fn git(msg: impl Into<String>) -> Self {
        Self::Git(msg.into())
    }

    /// Creates a new Subversion error.
    pub fn svn(msg: impl Into<String>) -> Self {
        Self::Svn(msg.into())
    }

    /// Creates a new network error.
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new archive error.
    pub fn archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error rejects the request itself rather than
    /// reporting a failed fetch.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownRepoType(_) | Self::InvalidDescriptor(_)
        )
    }

    /// Returns true if this is a network error.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Type alias for Results with ScrapeError.
pub type Result<T> = std::result::Result<T, ScrapeError>;
