//! reposcrape - materialise remote repositories onto local disk
//!
//! A [`Scraper`] accepts repository descriptors of any supported type and
//! routes each one to the backend for that type. Backends are created
//! lazily, once per type, and keep their local state between calls so that
//! later scrapes of the same repository are incremental.
//!
//! ```no_run
//! use reposcrape::Scraper;
//! use serde_json::json;
//!
//! let mut scraper = Scraper::new("/var/lib/reposcrape");
//! let ok = scraper
//!     .scrape(json!({ "repo_type": "git", "url": "https://example.com/repo.git" }), None)
//!     .expect("known repository type");
//!
//! if ok {
//!     println!("fetched into {:?}", scraper.result_path());
//! } else {
//!     eprintln!("failed: {:?}", scraper.errors());
//! }
//! ```

pub mod registry;
pub mod scraper;
pub mod settings;

pub use registry::{BackendFactory, Registry};
pub use scraper::Scraper;
pub use settings::Settings;

pub use reposcrape_core::{
    Backend, Progress, ProgressFn, RepoSpec, RepoType, Repository, Result, ScrapeError,
    ScrapeOutcome, UpdateKind,
};
