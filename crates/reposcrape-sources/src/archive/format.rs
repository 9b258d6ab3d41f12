//! Archive format detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use reposcrape_core::Result;

/// Number of leading bytes inspected when the name is inconclusive.
const MAGIC_LEN: usize = 512;

/// Supported download payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Gzip compressed tarball (.tar.gz, .tgz)
    TarGz,
    /// Uncompressed tarball (.tar)
    Tar,
    /// Zip archive (.zip)
    Zip,
    /// Anything else, stored as a single file.
    Plain,
}

impl ArchiveFormat {
    /// Detects the format from a file name based on its suffix.
    ///
    /// # Returns
    ///
    /// `Some(format)` if the suffix is recognized, `None` otherwise.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::archives()
            .iter()
            .copied()
            .find(|format| format.extensions().iter().any(|ext| name.ends_with(&format!(".{}", ext))))
    }

    /// Detects the format from the leading bytes of the payload.
    ///
    /// Any gzip stream is reported as [`TarGz`](Self::TarGz); [`detect`](Self::detect)
    /// narrows it to a tarball or a plain file.
    pub fn from_magic(bytes: &[u8]) -> Self {
        match infer::get(bytes).map(|kind| kind.mime_type()) {
            Some("application/gzip") => Self::TarGz,
            Some("application/x-tar") => Self::Tar,
            Some("application/zip") => Self::Zip,
            _ => Self::Plain,
        }
    }

    /// Detects the format of a downloaded payload, preferring the name.
    ///
    /// A gzip payload without an archive suffix is only treated as a tarball
    /// if its decompressed header is one; otherwise it is stored as is.
    pub fn detect(name: &str, payload: &Path) -> Result<Self> {
        if let Some(format) = Self::from_name(name) {
            return Ok(format);
        }

        let head = read_head(File::open(payload)?)?;
        Ok(match Self::from_magic(&head) {
            Self::TarGz => {
                let inner = read_head(GzDecoder::new(File::open(payload)?)).unwrap_or_default();
                if Self::from_magic(&inner) == Self::Tar {
                    Self::TarGz
                } else {
                    Self::Plain
                }
            },
            format => format,
        })
    }

    /// Returns all file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::TarGz => &["tar.gz", "tgz"],
            Self::Tar => &["tar"],
            Self::Zip => &["zip"],
            Self::Plain => &[],
        }
    }

    /// Returns true if the payload is unpacked rather than stored.
    pub fn is_archive(&self) -> bool {
        !matches!(self, Self::Plain)
    }

    /// Returns all archive formats.
    pub fn archives() -> &'static [Self] {
        &[Self::TarGz, Self::Tar, Self::Zip]
    }
}

fn read_head(reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(MAGIC_LEN);
    reader.take(MAGIC_LEN as u64).read_to_end(&mut head)?;
    Ok(head)
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TarGz => write!(f, "tar.gz"),
            Self::Tar => write!(f, "tar"),
            Self::Zip => write!(f, "zip"),
            Self::Plain => write!(f, "plain file"),
        }
    }
}
