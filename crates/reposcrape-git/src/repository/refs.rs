//! Git reference types.

use std::fmt;

/// Shortest hex string treated as an abbreviated commit id.
const MIN_ABBREV_LEN: usize = 6;

/// A Git reference (branch, tag, or commit).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GitRef {
    /// A branch reference (e.g., "main", "develop").
    Branch(String),

    /// A tag reference (e.g., "v1.0.0").
    Tag(String),

    /// A commit SHA (full or abbreviated).
    Commit(String),
}

impl GitRef {
    /// Creates a branch reference.
    pub fn branch(name: impl Into<String>) -> Self {
        Self::Branch(name.into())
    }

    /// Creates a tag reference.
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Creates a commit reference.
    pub fn commit(sha: impl Into<String>) -> Self {
        Self::Commit(sha.into())
    }

    /// Parses a tag string from a repository descriptor into a GitRef.
    ///
    /// This attempts to determine the type based on the format:
    /// - 6 to 40 character hex string → Commit
    /// - Starts with "refs/tags/" or "tags/" → Tag
    /// - Otherwise → Branch (default)
    ///
    /// Branches also match tags of the same name during resolution, so a
    /// bare "v1.0.0" still finds the tag.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();

        if (MIN_ABBREV_LEN..=40).contains(&label.len())
            && label.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Self::Commit(label.to_lowercase());
        }

        if let Some(tag_name) = label.strip_prefix("refs/tags/") {
            return Self::Tag(tag_name.to_string());
        }
        if let Some(tag_name) = label.strip_prefix("tags/") {
            return Self::Tag(tag_name.to_string());
        }

        if let Some(branch_name) = label.strip_prefix("refs/heads/") {
            return Self::Branch(branch_name.to_string());
        }
        if let Some(branch_name) = label.strip_prefix("origin/") {
            return Self::Branch(branch_name.to_string());
        }

        Self::Branch(label.to_string())
    }

    /// Returns the reference name without prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(name) | Self::Tag(name) | Self::Commit(name) => name,
        }
    }

    /// Returns the revision specs to try, most specific first.
    ///
    /// Branches are looked up on the remote-tracking side since local
    /// branches of a scraped clone are never advanced.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            Self::Branch(name) => vec![
                format!("refs/remotes/origin/{}", name),
                format!("refs/tags/{}", name),
                format!("refs/heads/{}", name),
            ],
            Self::Tag(name) => vec![format!("refs/tags/{}", name)],
            Self::Commit(sha) => vec![sha.clone(), format!("refs/remotes/origin/{}", sha)],
        }
    }

    /// Validates the reference name.
    ///
    /// Returns an error message if the name is invalid.
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.name();

        if name.is_empty() {
            return Err("reference name cannot be empty");
        }

        if name.starts_with('/') || name.ends_with('/') {
            return Err("reference name cannot start or end with '/'");
        }

        if name.contains("..") {
            return Err("reference name cannot contain '..'");
        }

        if name.contains("//") {
            return Err("reference name cannot contain '//'");
        }

        for c in name.chars() {
            if c.is_control()
                || c == ' '
                || c == '~'
                || c == '^'
                || c == ':'
                || c == '?'
                || c == '*'
                || c == '['
                || c == '\\'
            {
                return Err("reference name contains invalid characters");
            }
        }

        Ok(())
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(name) => write!(f, "{}", name),
            Self::Tag(name) => write!(f, "tags/{}", name),
            Self::Commit(sha) => write!(f, "{}", &sha[..8.min(sha.len())]),
        }
    }
}

impl From<&str> for GitRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
