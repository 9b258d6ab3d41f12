//! Archive handling for downloaded payloads.

mod extract;
mod format;

pub use extract::unpack;
pub use format::ArchiveFormat;
