//! Repository descriptors.
//!
//! A [`Repository`] says what to fetch and how. Callers either build one in
//! code with [`Repository::builder`] or hand over a loosely-typed key/value
//! mapping, which [`RepoSpec::normalize`] turns into the canonical value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{Result, ScrapeError};

/// Length of the hex fingerprint used to name checkout directories.
const FINGERPRINT_LEN: usize = 16;

/// The closed set of repository kinds a backend can exist for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    /// A Git repository.
    Git,
    /// A Subversion repository.
    Svn,
    /// A plain file or archive served over HTTP(S) or `file://`.
    Download,
}

impl RepoType {
    /// Returns the discriminator used in descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Svn => "svn",
            Self::Download => "download",
        }
    }

    /// Returns all repository kinds.
    pub fn all() -> &'static [Self] {
        &[Self::Git, Self::Svn, Self::Download]
    }
}

impl FromStr for RepoType {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "svn" => Ok(Self::Svn),
            "download" => Ok(Self::Download),
            other => Err(ScrapeError::unknown_repo_type(other)),
        }
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized repository descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Which backend handles this repository.
    repo_type: RepoType,

    /// Where the repository lives.
    url: String,

    /// Branch, tag or revision to materialize.
    #[serde(
        default,
        alias = "revision",
        alias = "branch",
        skip_serializing_if = "Option::is_none"
    )]
    tag: Option<String>,

    /// Username, or the only credential of a token based scheme.
    #[serde(default, alias = "username", skip_serializing_if = "Option::is_none")]
    first_credential: Option<String>,

    /// Password paired with the first credential.
    #[serde(default, alias = "password", skip_serializing_if = "Option::is_none")]
    second_credential: Option<String>,

    /// SSH private key used by the git backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ssh_key: Option<PathBuf>,

    /// Expected SHA-256 of downloaded content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,

    /// Human readable name used in logs and progress messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,

    /// Backend specific keys, kept in input order.
    #[serde(flatten)]
    options: IndexMap<String, Value>,
}

impl Repository {
    /// Creates a new builder for Repository.
    pub fn builder(repo_type: RepoType) -> RepositoryBuilder {
        RepositoryBuilder::new(repo_type)
    }

    /// Normalizes a loosely-typed mapping into a descriptor.
    ///
    /// The `repo_type` key is checked first so an unregistered discriminator
    /// is reported as [`ScrapeError::UnknownRepoType`] rather than as a
    /// generic deserialization failure.
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self> {
        match map.get("repo_type") {
            Some(Value::String(raw)) => {
                let repo_type = raw.parse::<RepoType>()?;
                map.insert("repo_type".to_string(), Value::String(repo_type.as_str().to_string()));
            },
            Some(other) => return Err(ScrapeError::unknown_repo_type(other.to_string())),
            None => return Err(ScrapeError::invalid_descriptor("missing repo_type")),
        }

        let repo: Repository = serde_json::from_value(Value::Object(map))
            .map_err(|e| ScrapeError::invalid_descriptor(e.to_string()))?;
        repo.validate()?;
        Ok(repo)
    }

    /// Normalizes any JSON value; only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(ScrapeError::invalid_descriptor(format!(
                "expected a key/value mapping, got {}",
                other
            ))),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ScrapeError::invalid_descriptor("url cannot be empty"));
        }
        Ok(())
    }

    /// Returns the repository type.
    pub fn repo_type(&self) -> RepoType {
        self.repo_type
    }

    /// Returns the repository URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the requested branch, tag or revision.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Returns the first credential (usually a username).
    pub fn first_credential(&self) -> Option<&str> {
        self.first_credential.as_deref()
    }

    /// Returns the second credential (usually a password or token).
    pub fn second_credential(&self) -> Option<&str> {
        self.second_credential.as_deref()
    }

    /// Returns the SSH private key path.
    pub fn ssh_key(&self) -> Option<&Path> {
        self.ssh_key.as_deref()
    }

    /// Returns the expected SHA-256 digest.
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    /// Returns the display name, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns all backend specific options.
    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }

    /// Returns a single backend specific option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Returns a stable fingerprint of the URL.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.url.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(FINGERPRINT_LEN);
        hex
    }

    /// Returns the directory this repository is materialized into.
    ///
    /// Directories are keyed by type and URL so that several repositories
    /// scraped into the same root never collide.
    pub fn checkout_dir(&self, root: &Path) -> PathBuf {
        root.join(self.repo_type.as_str()).join(self.fingerprint())
    }

    /// Returns the URL with any embedded user info removed.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let authority_end = rest.find('/').unwrap_or(rest.len());
        match rest[..authority_end].rfind('@') {
            Some(at) => format!("{}://{}", scheme, &rest[at + 1..]),
            None => self.url.clone(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} ({})", name, self.repo_type)?,
            None => write!(f, "{} {}", self.repo_type, self.redacted_url())?,
        }
        if let Some(tag) = &self.tag {
            write!(f, "@{}", tag)?;
        }
        Ok(())
    }
}

/// Builder for Repository.
#[derive(Debug)]
pub struct RepositoryBuilder {
    repo_type: RepoType,
    url: Option<String>,
    tag: Option<String>,
    first_credential: Option<String>,
    second_credential: Option<String>,
    ssh_key: Option<PathBuf>,
    sha256: Option<String>,
    display_name: Option<String>,
    options: IndexMap<String, Value>,
}

impl RepositoryBuilder {
    fn new(repo_type: RepoType) -> Self {
        Self {
            repo_type,
            url: None,
            tag: None,
            first_credential: None,
            second_credential: None,
            ssh_key: None,
            sha256: None,
            display_name: None,
            options: IndexMap::new(),
        }
    }

    /// Sets the repository URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the branch, tag or revision.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets basic authentication credentials.
    pub fn credentials(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.first_credential = Some(first.into());
        self.second_credential = Some(second.into());
        self
    }

    /// Sets the SSH private key.
    pub fn ssh_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssh_key = Some(path.into());
        self
    }

    /// Sets the expected SHA-256 digest.
    pub fn sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }

    /// Sets the display name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Adds a backend specific option.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidDescriptor`] if the URL is missing or
    /// empty.
    pub fn build(self) -> Result<Repository> {
        let url = self
            .url
            .ok_or_else(|| ScrapeError::invalid_descriptor("url is required"))?;

        let repo = Repository {
            repo_type: self.repo_type,
            url,
            tag: self.tag,
            first_credential: self.first_credential,
            second_credential: self.second_credential,
            ssh_key: self.ssh_key,
            sha256: self.sha256,
            display_name: self.display_name,
            options: self.options,
        };
        repo.validate()?;
        Ok(repo)
    }
}

/// Input accepted by the dispatcher: either an already normalized
/// descriptor or a raw mapping still to be normalized.
#[derive(Debug, Clone)]
pub enum RepoSpec {
    /// A canonical descriptor.
    Descriptor(Repository),
    /// A loosely-typed key/value mapping.
    Raw(Value),
}

impl RepoSpec {
    /// Turns the input into a canonical descriptor.
    pub fn normalize(self) -> Result<Repository> {
        match self {
            Self::Descriptor(repo) => Ok(repo),
            Self::Raw(value) => Repository::from_value(value),
        }
    }
}

impl From<Repository> for RepoSpec {
    fn from(repo: Repository) -> Self {
        Self::Descriptor(repo)
    }
}

impl From<&Repository> for RepoSpec {
    fn from(repo: &Repository) -> Self {
        Self::Descriptor(repo.clone())
    }
}

impl From<Value> for RepoSpec {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<Map<String, Value>> for RepoSpec {
    fn from(map: Map<String, Value>) -> Self {
        Self::Raw(Value::Object(map))
    }
}
