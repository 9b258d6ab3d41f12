//! Subversion and download backends for reposcrape.
//!
//! - [`SvnBackend`] drives the `svn` command line client.
//! - [`DownloadBackend`] fetches a single payload over HTTP(S) or from a
//!   `file://` URL and unpacks it when it is an archive.

pub mod archive;
pub mod download;
pub mod svn;

pub use archive::ArchiveFormat;
pub use download::DownloadBackend;
pub use svn::SvnBackend;

// Re-export core types for convenience
pub use reposcrape_core;
