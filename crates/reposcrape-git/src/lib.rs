//! # reposcrape Git backend
//!
//! Git-based fetch backend for reposcrape.
//!
//! This crate clones repositories into a destination root, keeps the clones
//! around, and on later scrapes fetches into them and moves the worktree to
//! the requested branch, tag or commit.
//!
//! ## Features
//!
//! - Git operations via gix (pure Rust, no system `git` required)
//! - Support for branches, tags, and commit references
//! - HTTP(S) basic auth and SSH key authentication
//! - Incremental updates: fetch instead of clone, no rewrite when unchanged
//!
//! ## Example
//!
//! ```ignore
//! use reposcrape_core::{Backend, Progress, RepoType, Repository};
//! use reposcrape_git::GitBackend;
//!
//! let repo = Repository::builder(RepoType::Git)
//!     .url("https://github.com/org/cookbooks.git")
//!     .tag("v1.2.0")
//!     .build()?;
//!
//! let mut backend = GitBackend::new("/var/lib/reposcrape");
//! backend.scrape(&repo, &mut Progress::none());
//! assert!(backend.succeeded());
//! ```

pub mod backend;
pub mod repository;

// Re-exports
pub use backend::GitBackend;
pub use repository::{Checkout, GitCheckoutConfig, GitRef, GitRepository};

// Re-export reposcrape_core for consumers
pub use reposcrape_core;
