//! Zip assembly of a staged package tree.

use std::fs::File;
use std::io::{self, Seek, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{BuildError, Result};
use crate::staging::StagedFile;

pub const MIMETYPE_PATH: &str = "mimetype";

/// Exact content of the `mimetype` entry (no trailing newline).
pub const EPUB_MIMETYPE: &[u8] = b"application/epub+zip";

pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Deflated,
}

/// A file destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive (`/`-separated, relative).
    pub path: String,
    pub payload: Vec<u8>,
    pub compression: Compression,
}

impl ArchiveEntry {
    pub fn stored(path: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            payload,
            compression: Compression::Stored,
        }
    }

    pub fn deflated(path: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            payload,
            compression: Compression::Deflated,
        }
    }

    /// The `mimetype` entry: stored, exactly `application/epub+zip`.
    pub fn mimetype() -> Self {
        Self::stored(MIMETYPE_PATH, EPUB_MIMETYPE.to_vec())
    }

    pub fn is_mimetype(&self) -> bool {
        self.path == MIMETYPE_PATH
            && self.compression == Compression::Stored
            && self.payload == EPUB_MIMETYPE
    }
}

/// Options for zip assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveOptions {
    /// Deflate level (0-9, default 6).
    pub compression_level: Option<i64>,
}

impl ArchiveOptions {
    pub fn validate(&self) -> Result<()> {
        match self.compression_level {
            Some(level) if !(0..=9).contains(&level) => Err(BuildError::InvalidPackage(format!(
                "compression level must be between 0 and 9, got {level}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Write staged files into a zip archive, in order.
///
/// The first file must be the stored `mimetype` entry; anything else is
/// rejected before a single byte is written.
pub fn write_archive<W: Write + Seek>(
    writer: W,
    files: &[StagedFile],
    options: &ArchiveOptions,
) -> Result<W> {
    match files.first() {
        Some(first)
            if first.archive_path == MIMETYPE_PATH
                && first.compression == Compression::Stored => {}
        _ => {
            return Err(BuildError::InvalidPackage(
                "archive must start with a stored mimetype entry".into(),
            ));
        }
    }

    let mut zip = ZipWriter::new(writer);

    let level = options
        .compression_level
        .unwrap_or(DEFAULT_COMPRESSION_LEVEL);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level));

    for file in files {
        let opts = match file.compression {
            Compression::Stored => stored,
            Compression::Deflated => deflated,
        };
        zip.start_file(file.archive_path.as_str(), opts)?;
        let mut source = File::open(&file.disk_path)?;
        io::copy(&mut source, &mut zip)?;
    }

    Ok(zip.finish()?)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use zip::ZipArchive;

    use super::*;
    use crate::staging::Staging;

    fn stage(staging: &Staging, entries: &[ArchiveEntry]) -> Vec<StagedFile> {
        entries.iter().map(|e| staging.write(e).unwrap()).collect()
    }

    #[test]
    fn test_mimetype_first_and_stored() {
        let root = tempfile::tempdir().unwrap();
        let staging = Staging::create(Some(root.path())).unwrap();
        let files = stage(
            &staging,
            &[
                ArchiveEntry::mimetype(),
                ArchiveEntry::deflated("META-INF/container.xml", b"<container/>".to_vec()),
                ArchiveEntry::deflated("OEBPS/index.xhtml", vec![b'a'; 4096]),
            ],
        );

        let cursor = write_archive(Cursor::new(Vec::new()), &files, &ArchiveOptions::default())
            .unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 3);

        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        let mut content = Vec::new();
        first.read_to_end(&mut content).unwrap();
        assert_eq!(content, EPUB_MIMETYPE);
        drop(first);

        let index = archive.by_index(2).unwrap();
        assert_eq!(index.name(), "OEBPS/index.xhtml");
        assert_eq!(index.compression(), CompressionMethod::Deflated);
        assert!(index.compressed_size() < index.size());
    }

    #[test]
    fn test_rejects_missing_mimetype() {
        let root = tempfile::tempdir().unwrap();
        let staging = Staging::create(Some(root.path())).unwrap();
        let files = stage(
            &staging,
            &[ArchiveEntry::deflated("META-INF/container.xml", Vec::new())],
        );
        let result = write_archive(Cursor::new(Vec::new()), &files, &ArchiveOptions::default());
        assert!(matches!(result, Err(BuildError::InvalidPackage(_))));
    }

    #[test]
    fn test_rejects_compressed_mimetype() {
        let root = tempfile::tempdir().unwrap();
        let staging = Staging::create(Some(root.path())).unwrap();
        let files = stage(
            &staging,
            &[ArchiveEntry::deflated(MIMETYPE_PATH, EPUB_MIMETYPE.to_vec())],
        );
        let result = write_archive(Cursor::new(Vec::new()), &files, &ArchiveOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_is_mimetype() {
        assert!(ArchiveEntry::mimetype().is_mimetype());
        assert!(!ArchiveEntry::deflated(MIMETYPE_PATH, EPUB_MIMETYPE.to_vec()).is_mimetype());
        assert!(!ArchiveEntry::stored(MIMETYPE_PATH, b"application/epub+zip\n".to_vec()).is_mimetype());
    }

    #[test]
    fn test_compression_level_range() {
        assert!(ArchiveOptions::default().validate().is_ok());
        assert!(ArchiveOptions { compression_level: Some(9) }.validate().is_ok());
        assert!(ArchiveOptions { compression_level: Some(10) }.validate().is_err());
        assert!(ArchiveOptions { compression_level: Some(-1) }.validate().is_err());
    }
}
