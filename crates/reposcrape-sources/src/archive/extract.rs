//! Payload unpacking.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use reposcrape_core::{Result, ScrapeError};
use tar::Archive;
use tracing::debug;
use zip::ZipArchive;

use super::ArchiveFormat;

/// Unpacks `payload` into `dest` and returns the number of entries written.
///
/// `dest` must exist. Plain payloads are copied to `dest/file_name`, and
/// archive errors are reported against `file_name` rather than the
/// temporary payload path.
pub fn unpack(format: ArchiveFormat, payload: &Path, dest: &Path, file_name: &str) -> Result<usize> {
    debug!("Unpacking {} ({}) into {}", file_name, format, dest.display());

    let label = Path::new(file_name);
    match format {
        ArchiveFormat::TarGz => unpack_tar(GzDecoder::new(File::open(payload)?), label, dest),
        ArchiveFormat::Tar => unpack_tar(File::open(payload)?, label, dest),
        ArchiveFormat::Zip => unpack_zip(File::open(payload)?, label, dest),
        ArchiveFormat::Plain => {
            fs::copy(payload, dest.join(file_name))?;
            Ok(1)
        },
    }
}

fn unpack_tar<R: Read>(reader: R, label: &Path, dest: &Path) -> Result<usize> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);
    let mut count = 0;

    let entries = archive
        .entries()
        .map_err(|e| ScrapeError::archive(label, e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| ScrapeError::archive(label, e.to_string()))?;
        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| ScrapeError::archive(label, e.to_string()))?;

        if !unpacked {
            let name = entry
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            return Err(ScrapeError::archive(
                label,
                format!("entry {} escapes the destination", name),
            ));
        }
        count += 1;
    }

    Ok(count)
}

fn unpack_zip(file: File, label: &Path, dest: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(file).map_err(|e| ScrapeError::archive(label, e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ScrapeError::archive(label, e.to_string()))?;

        let relative = entry.enclosed_name().ok_or_else(|| {
            ScrapeError::archive(label, format!("entry {} escapes the destination", entry.name()))
        })?;
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))?;
            }
        }
    }

    Ok(archive.len())
}
