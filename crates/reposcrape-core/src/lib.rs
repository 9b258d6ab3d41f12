//! reposcrape core - domain types and traits
//!
//! This crate provides the foundational types shared by the dispatcher and
//! every fetch backend: repository descriptors, the [`Backend`] trait,
//! progress reporting, scrape state and errors.

pub mod backend;
pub mod error;
pub mod outcome;
pub mod progress;
pub mod repository;
pub mod state;

pub use backend::Backend;
pub use error::{Result, ScrapeError};
pub use outcome::ScrapeOutcome;
pub use progress::{Progress, ProgressFn};
pub use repository::{RepoSpec, RepoType, Repository, RepositoryBuilder};
pub use state::{ScrapeState, UpdateKind};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
