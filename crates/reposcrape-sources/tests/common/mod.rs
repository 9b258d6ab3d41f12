#![allow(dead_code)]
//! Fixtures for the download and Subversion backend tests.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use url::Url;

/// Writes a gzip compressed tarball containing `files`.
pub fn write_tar_gz(path: &Path, files: &[(&str, &str)]) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, content.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Returns the `file://` URL of a local path.
pub fn file_url(path: &Path) -> String {
    Url::from_file_path(path).unwrap().to_string()
}

/// Returns the lowercase hex SHA-256 of a file.
pub fn sha256_of(path: &Path) -> String {
    hex::encode(Sha256::digest(fs::read(path).unwrap()))
}

/// A fake `svn` client backed by a directory that plays the remote.
///
/// `checkout` and `update` copy the remote revision into `.svn/rev`,
/// `info --show-item revision` prints it, and any URL containing `fail`
/// is rejected with an svn style message. Every invocation is appended
/// to `calls.log`, followed by a `stdin=` line when the password is piped.
pub struct FakeSvn {
    pub program: PathBuf,
    pub remote_rev: PathBuf,
    pub log: PathBuf,
}

impl FakeSvn {
    pub fn install(dir: &Path) -> Self {
        let program = dir.join("svn");
        let remote_rev = dir.join("remote_rev");
        let log = dir.join("calls.log");
        fs::write(&remote_rev, "1\n").unwrap();

        let script = format!(
            r#"#!/bin/sh
echo "$*" >> "{log}"
case "$*" in
  *--password-from-stdin*) read -r pw; echo "stdin=$pw" >> "{log}" ;;
esac
cmd="$1"
for last; do :; done
case "$*" in
  *fail*) echo "svn: E170013: Unable to connect to a repository" >&2; exit 1 ;;
esac
case "$cmd" in
  checkout)
    mkdir -p "$last/.svn"
    cp "{rev}" "$last/.svn/rev"
    echo "trunk" > "$last/README"
    ;;
  update)
    cp "{rev}" "$last/.svn/rev"
    ;;
  info)
    cat "$last/.svn/rev"
    ;;
  *)
    echo "svn: unknown command $cmd" >&2
    exit 1
    ;;
esac
"#,
            log = log.display(),
            rev = remote_rev.display(),
        );
        fs::write(&program, script).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
        }

        Self {
            program,
            remote_rev,
            log,
        }
    }

    pub fn bump(&self, rev: u32) {
        fs::write(&self.remote_rev, format!("{}\n", rev)).unwrap();
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
