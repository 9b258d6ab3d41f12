//! Subversion backend driven by the `svn` command line client.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use reposcrape_core::{Backend, Progress, Repository, Result, ScrapeError, ScrapeState, UpdateKind};
use tracing::{debug, info, warn};

/// Checks out and updates Subversion working copies.
///
/// Passwords are written to the client's stdin (`--password-from-stdin`,
/// svn 1.10 and later) so they never show up in the process list.
#[derive(Debug)]
pub struct SvnBackend {
    root: PathBuf,
    program: OsString,
    state: ScrapeState,
}

impl SvnBackend {
    /// Creates a backend that runs `svn` from `PATH`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_program(root, "svn")
    }

    /// Creates a backend that runs the given client executable.
    pub fn with_program(root: impl Into<PathBuf>, program: impl Into<OsString>) -> Self {
        Self {
            root: root.into(),
            program: program.into(),
            state: ScrapeState::new(),
        }
    }

    /// Returns the destination root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sync(&self, repo: &Repository, repo_dir: &Path, progress: &mut Progress<'_>) -> Result<UpdateKind> {
        let mut args: Vec<OsString> = Vec::new();

        let update = if repo_dir.join(".svn").is_dir() {
            progress.status(format!("Updating {}", repo));
            args.push("update".into());
            UpdateKind::Incremental
        } else {
            progress.status(format!("Checking out {}", repo));
            std::fs::create_dir_all(&self.root)?;
            args.push("checkout".into());
            UpdateKind::Full
        };

        args.push("--non-interactive".into());
        if let Some(rev) = repo.tag() {
            args.push("-r".into());
            args.push(rev.into());
        }
        let mut password = None;
        if let Some(user) = repo.first_credential() {
            args.push("--username".into());
            args.push(user.into());
            if let Some(secret) = repo.second_credential() {
                args.push("--password-from-stdin".into());
                password = Some(secret);
            }
            args.push("--no-auth-cache".into());
        }
        if update == UpdateKind::Full {
            args.push(repo.url().into());
        }
        args.push(repo_dir.into());

        let before = self.revision(repo_dir);
        self.run(&args, password)?;

        match (update, before) {
            (UpdateKind::Incremental, Some(before))
                if self.revision(repo_dir).as_deref() == Some(before.as_str()) =>
            {
                Ok(UpdateKind::Unchanged)
            },
            _ => Ok(update),
        }
    }

    /// Runs the client, feeding `stdin` to it, and returns its stdout.
    fn run(&self, args: &[OsString], stdin: Option<&str>) -> Result<String> {
        debug!("Running {:?} {:?}", self.program, args.first());

        let mut child = Command::new(&self.program)
            .args(args)
            .env("LC_ALL", "C")
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ScrapeError::svn("svn executable not found"),
                _ => ScrapeError::svn(e.to_string()),
            })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            if let Err(e) = writeln!(pipe, "{}", input) {
                debug!("Failed to write password to svn: {}", e);
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ScrapeError::svn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ScrapeError::svn(if stderr.is_empty() {
                format!("svn exited with {}", output.status)
            } else {
                stderr
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Returns the working copy revision, if it can be determined.
    fn revision(&self, repo_dir: &Path) -> Option<String> {
        if !repo_dir.join(".svn").is_dir() {
            return None;
        }

        let args: Vec<OsString> = vec![
            "info".into(),
            "--show-item".into(),
            "revision".into(),
            repo_dir.into(),
        ];
        self.run(&args, None)
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|rev| !rev.is_empty())
    }
}

impl Backend for SvnBackend {
    fn scrape(&mut self, repo: &Repository, progress: &mut Progress<'_>) {
        let repo_dir = repo.checkout_dir(&self.root);
        self.state.begin(&repo_dir);

        match self.sync(repo, &repo_dir, progress) {
            Ok(update) => {
                info!("Subversion working copy {} ready ({})", repo, update);
                self.state.record_success(update);
                progress.advance(format!("Scraped {}", repo));
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
        "svn"
    }
}
