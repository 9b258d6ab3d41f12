//! Download backend.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reposcrape_core::{Backend, Progress, Repository, Result, ScrapeError, ScrapeState, UpdateKind};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

use crate::archive::{self, ArchiveFormat};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// File name used for plain payloads whose URL has no usable last segment.
const FALLBACK_FILE_NAME: &str = "download";

/// Fetches a single payload and unpacks it below the destination root.
///
/// The SHA-256 of the last payload extracted into each directory is
/// remembered, so re-scraping an unchanged payload leaves the directory alone.
pub struct DownloadBackend {
    root: PathBuf,
    state: ScrapeState,
    client: Option<Client>,
    digests: HashMap<PathBuf, String>,
}

impl DownloadBackend {
    /// Creates a new download backend writing below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: ScrapeState::new(),
            client: None,
            digests: HashMap::new(),
        }
    }

    /// Returns the destination root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the digest last extracted into `repo_dir`, if any.
    pub fn digest_for(&self, repo_dir: &Path) -> Option<&str> {
        self.digests.get(repo_dir).map(String::as_str)
    }

    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .user_agent(format!("reposcrape/{}", reposcrape_core::version()))
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| ScrapeError::network("client", e.to_string()))?;
            self.client = Some(client);
        }

        self.client
            .as_ref()
            .ok_or_else(|| ScrapeError::network("client", "HTTP client unavailable"))
    }

    fn fetch_into(&mut self, repo: &Repository, url: &Url, out: &mut File) -> Result<u64> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| ScrapeError::invalid_descriptor(format!("invalid file URL: {}", url)))?;
                let mut source = File::open(&path)
                    .map_err(|e| ScrapeError::network(repo.redacted_url(), e.to_string()))?;
                Ok(io::copy(&mut source, out)?)
            },
            "http" | "https" => {
                let redacted = repo.redacted_url();
                let mut request = self.client()?.get(url.clone());
                if let Some(user) = repo.first_credential() {
                    request = request.basic_auth(user, repo.second_credential());
                }

                let mut response = request
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ScrapeError::network(&redacted, e.to_string()))?;

                response
                    .copy_to(out)
                    .map_err(|e| ScrapeError::network(&redacted, e.to_string()))
            },
            other => Err(ScrapeError::invalid_descriptor(format!(
                "unsupported download scheme: {}",
                other
            ))),
        }
    }

    fn sync(&mut self, repo: &Repository, repo_dir: &Path, progress: &mut Progress<'_>) -> Result<UpdateKind> {
        let url = Url::parse(repo.url())
            .map_err(|e| ScrapeError::invalid_descriptor(format!("invalid download URL: {}", e)))?;

        fs::create_dir_all(&self.root)?;
        let mut payload = NamedTempFile::new_in(&self.root)?;

        progress.status(format!("Downloading {}", repo));
        let bytes = self.fetch_into(repo, &url, payload.as_file_mut())?;
        payload.as_file_mut().flush()?;
        debug!("Downloaded {} bytes from {}", bytes, repo.redacted_url());

        let digest = sha256_file(payload.path())?;
        if let Some(expected) = repo.sha256() {
            if !digest.eq_ignore_ascii_case(expected) {
                return Err(ScrapeError::Checksum {
                    expected: expected.to_lowercase(),
                    actual: digest,
                });
            }
        }

        let existed = repo_dir.exists();
        if existed && self.digest_for(repo_dir) == Some(digest.as_str()) {
            debug!("Payload for {} unchanged ({})", repo, digest);
            return Ok(UpdateKind::Unchanged);
        }

        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();
        let format = ArchiveFormat::detect(&file_name, payload.path())?;

        if existed {
            fs::remove_dir_all(repo_dir)?;
        }
        fs::create_dir_all(repo_dir)?;

        progress.status(format!("Unpacking {} ({})", file_name, format));
        self.digests.remove(repo_dir);
        if let Err(e) = archive::unpack(format, payload.path(), repo_dir, &file_name) {
            if let Err(cleanup) = fs::remove_dir_all(repo_dir) {
                debug!("Failed to remove partial extraction {:?}: {}", repo_dir, cleanup);
            }
            return Err(e);
        }
        self.digests.insert(repo_dir.to_path_buf(), digest);

        Ok(if existed { UpdateKind::Incremental } else { UpdateKind::Full })
    }
}

fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

impl Backend for DownloadBackend {
    fn scrape(&mut self, repo: &Repository, progress: &mut Progress<'_>) {
        let repo_dir = repo.checkout_dir(&self.root);
        self.state.begin(&repo_dir);

        match self.sync(repo, &repo_dir, progress) {
            Ok(update) => {
                info!("Download {} ready ({})", repo, update);
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
        "download"
    }
}

impl std::fmt::Debug for DownloadBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadBackend")
            .field("root", &self.root)
            .field("digests", &self.digests.len())
            .finish()
    }
}
