//! Private staging directory for one build.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::archive::{ArchiveEntry, Compression};

const STAGING_PREFIX: &str = "gamepub-";

/// A file written into the staging tree, ready to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Path inside the archive (`/`-separated).
    pub archive_path: String,
    pub disk_path: PathBuf,
    pub compression: Compression,
}

/// Uniquely named directory holding the package tree during a build.
///
/// The directory is removed when the guard is dropped, whether or not the
/// build succeeded.
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    /// Create a staging directory under `root`, or the system temp dir.
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let dir = match root {
            Some(root) => tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .tempdir_in(root)?,
            None => tempfile::Builder::new().prefix(STAGING_PREFIX).tempdir()?,
        };
        debug!(path = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an entry's payload beneath the staging root.
    pub fn write(&self, entry: &ArchiveEntry) -> io::Result<StagedFile> {
        let disk_path = self.resolve(&entry.path)?;
        if let Some(parent) = disk_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&disk_path, &entry.payload)?;
        debug!(
            entry = %entry.path,
            bytes = entry.payload.len(),
            "staged file"
        );
        Ok(StagedFile {
            archive_path: entry.path.clone(),
            disk_path,
            compression: entry.compression,
        })
    }

    /// Remove the staging directory now, logging rather than failing if the
    /// removal does not succeed.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "removed staging directory"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove staging directory"),
        }
    }

    fn resolve(&self, archive_path: &str) -> io::Result<PathBuf> {
        let mut path = self.dir.path().to_path_buf();
        for segment in archive_path.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid archive path: {archive_path}"),
                ));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let root = tempfile::tempdir().unwrap();
        let staging = Staging::create(Some(root.path())).unwrap();
        let entry = ArchiveEntry::deflated("OEBPS/content.opf", b"<package/>".to_vec());

        let staged = staging.write(&entry).unwrap();
        assert_eq!(staged.archive_path, "OEBPS/content.opf");
        assert_eq!(staged.compression, Compression::Deflated);
        assert_eq!(fs::read(&staged.disk_path).unwrap(), b"<package/>");
        assert!(staged.disk_path.starts_with(staging.path()));
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let staging = Staging::create(Some(root.path())).unwrap();
            staging.write(&ArchiveEntry::mimetype()).unwrap();
            staging.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_close_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let staging = Staging::create(Some(root.path())).unwrap();
        let path = staging.path().to_path_buf();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with(STAGING_PREFIX));
        staging.close();
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let root = tempfile::tempdir().unwrap();
        let staging = Staging::create(Some(root.path())).unwrap();
        for bad in ["../evil", "/abs", "a//b", "a/./b"] {
            let entry = ArchiveEntry::deflated(bad, Vec::new());
            let err = staging.write(&entry).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{bad}");
        }
    }
}
