//! Backend trait definition.

use std::path::Path;

use crate::progress::Progress;
use crate::repository::Repository;
use crate::state::UpdateKind;

/// A fetch implementation for one repository kind.
///
/// A backend is constructed once with the destination root and then asked
/// to scrape repositories of its kind any number of times. The first scrape
/// of a repository performs a full fetch; later scrapes of the same
/// repository update the existing local copy.
///
/// # Implementors
///
/// - `GitBackend` - clones and fetches Git repositories
/// - `SvnBackend` - checks out and updates Subversion working copies
/// - `DownloadBackend` - downloads and unpacks archives
///
/// # Contract
///
/// - Content goes into a subdirectory of the destination root that is unique
///   per repository (see [`Repository::checkout_dir`]).
/// - Failures are recorded, never panicked on; [`errors`](Self::errors)
///   holds one message per failure of the latest scrape.
/// - `progress` receives any number of status lines and exactly one
///   advancing line per call to [`scrape`](Self::scrape), even on failure.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use reposcrape_core::{Backend, Progress, Repository, ScrapeState, UpdateKind};
///
/// struct Noop {
///     root: PathBuf,
///     state: ScrapeState,
/// }
///
/// impl Backend for Noop {
///     fn scrape(&mut self, repo: &Repository, progress: &mut Progress<'_>) {
///         self.state.begin(repo.checkout_dir(&self.root));
///         self.state.record_success(UpdateKind::Unchanged);
///         progress.advance(format!("Skipped {}", repo));
///     }
///
///     fn repo_dir(&self) -> Option<&Path> {
///         self.state.repo_dir()
///     }
///
///     fn errors(&self) -> &[String] {
///         self.state.errors()
///     }
///
///     fn name(&self) -> &str {
///         "noop"
///     }
/// }
/// ```
pub trait Backend: Send {
    /// Fetches or updates `repo` below the destination root.
    fn scrape(&mut self, repo: &Repository, progress: &mut Progress<'_>);

    /// Returns where the latest scrape put its content.
    ///
    /// `None` until [`scrape`](Self::scrape) has been called once.
    fn repo_dir(&self) -> Option<&Path>;

    /// Returns the error messages of the latest scrape.
    fn errors(&self) -> &[String];

    /// Returns whether the latest scrape succeeded.
    fn succeeded(&self) -> bool {
        self.errors().is_empty()
    }

    /// Returns what the latest successful scrape did to the local copy.
    fn last_update(&self) -> Option<UpdateKind> {
        None
    }

    /// Returns the name of this backend.
    ///
    /// This is used for logging and identification purposes.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::repository::RepoType;
    use crate::state::ScrapeState;

    struct MockBackend {
        root: PathBuf,
        state: ScrapeState,
        fail: bool,
    }

    impl Backend for MockBackend {
        fn scrape(&mut self, repo: &Repository, progress: &mut Progress<'_>) {
            self.state.begin(repo.checkout_dir(&self.root));
            progress.status("working");
            if self.fail {
                self.state.record_failure("remote unreachable");
            } else {
                self.state.record_success(UpdateKind::Full);
            }
            progress.advance("done");
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
            "mock"
        }
    }

    fn repo() -> Repository {
        Repository::builder(RepoType::Git)
            .url("https://example/repo.git")
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_succeeded_follows_errors() {
        let mut backend = MockBackend {
            root: PathBuf::from("/scrape"),
            state: ScrapeState::new(),
            fail: true,
        };
        assert!(backend.repo_dir().is_none());

        backend.scrape(&repo(), &mut Progress::none());
        assert!(!backend.succeeded());
        assert_eq!(backend.errors(), &["remote unreachable"]);
        assert!(backend.last_update().is_none());

        backend.fail = false;
        backend.scrape(&repo(), &mut Progress::none());
        assert!(backend.succeeded());
        assert_eq!(backend.last_update(), Some(UpdateKind::Full));
        assert_eq!(backend.repo_dir(), Some(repo().checkout_dir(Path::new("/scrape")).as_path()));
    }
}
