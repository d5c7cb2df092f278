//! Package assembly: staging, validation and the final archive.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::archive::{ArchiveEntry, ArchiveOptions, write_archive};
use crate::documents::{
    CONTAINER_PATH, ContentDocument, FrameLauncher, PACKAGE_DOCUMENT, container_xml,
    nav_document, ncx_document, package_document,
};
use crate::error::{BuildError, Result};
use crate::inject::inject_shim;
use crate::manifest::{Manifest, NAV_HREF, NCX_HREF};
use crate::metadata::PackageMetadata;
use crate::staging::{StagedFile, Staging};
use crate::util;

/// Directory inside the archive holding the package documents.
pub const DEFAULT_CONTENT_ROOT: &str = "OEBPS";

/// Payload filename used when none is configured.
pub const DEFAULT_PAYLOAD_FILENAME: &str = "game.html";

/// Everything one build needs.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// HTML payload on disk.
    pub source: PathBuf,
    /// Opaque text spliced after the payload's `<head>`.
    pub shim: String,
    pub output: PathBuf,
    pub metadata: PackageMetadata,
    /// Name of the payload inside the content root; derived from `source`
    /// when unset.
    pub payload_filename: Option<String>,
    pub content_root: String,
    /// Parent of the staging directory; the system temp dir when unset.
    pub staging_root: Option<PathBuf>,
    pub archive: ArchiveOptions,
}

impl BuildConfig {
    pub fn new(
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        metadata: PackageMetadata,
    ) -> Self {
        Self {
            source: source.into(),
            shim: String::new(),
            output: output.into(),
            metadata,
            payload_filename: None,
            content_root: DEFAULT_CONTENT_ROOT.to_string(),
            staging_root: None,
            archive: ArchiveOptions::default(),
        }
    }

    pub fn with_shim(mut self, shim: impl Into<String>) -> Self {
        self.shim = shim.into();
        self
    }
}

/// Build a package from a [`BuildConfig`], reading the payload from disk.
///
/// Fails with [`BuildError::SourceNotFound`] before anything is written if
/// the payload does not exist.
pub fn build(config: &BuildConfig) -> Result<PathBuf> {
    let payload = read_payload(&config.source)?;
    let payload_filename = config
        .payload_filename
        .clone()
        .unwrap_or_else(|| payload_filename_for(&config.source));

    PackageBuilder::new(config.shim.clone())
        .with_content_root(config.content_root.clone())
        .with_payload_filename(payload_filename)
        .with_staging_root(config.staging_root.clone())
        .with_archive_options(config.archive)
        .build(&payload, &config.metadata, &config.output)
}

fn read_payload(source: &Path) -> Result<Vec<u8>> {
    match fs::read(source) {
        Ok(bytes) if bytes.is_empty() => Err(BuildError::EmptyPayload),
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(BuildError::SourceNotFound(source.to_path_buf()))
        }
        Err(e) => Err(BuildError::IoFailure(e)),
    }
}

/// `<stem>_fixed.html`, with the stem reduced to safe characters.
pub fn payload_filename_for(source: &Path) -> String {
    let stem: String = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        DEFAULT_PAYLOAD_FILENAME.to_string()
    } else {
        format!("{stem}_fixed.html")
    }
}

/// Produces one EPUB archive from an HTML payload and metadata.
///
/// # Example
///
/// ```no_run
/// use gamepub::{PackageBuilder, PackageMetadata};
/// use std::path::Path;
///
/// let payload = std::fs::read("game.html")?;
/// let meta = PackageMetadata::new("My Game").with_creator("Me");
/// PackageBuilder::new("<script>/* shims */</script>")
///     .build(&payload, &meta, Path::new("game.epub"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PackageBuilder {
    shim: String,
    content_root: String,
    payload_filename: String,
    staging_root: Option<PathBuf>,
    archive: ArchiveOptions,
    content_document: Box<dyn ContentDocument>,
}

impl PackageBuilder {
    pub fn new(shim: impl Into<String>) -> Self {
        Self {
            shim: shim.into(),
            content_root: DEFAULT_CONTENT_ROOT.to_string(),
            payload_filename: DEFAULT_PAYLOAD_FILENAME.to_string(),
            staging_root: None,
            archive: ArchiveOptions::default(),
            content_document: Box::new(FrameLauncher),
        }
    }

    pub fn with_content_root(mut self, content_root: impl Into<String>) -> Self {
        self.content_root = content_root.into();
        self
    }

    pub fn with_payload_filename(mut self, filename: impl Into<String>) -> Self {
        self.payload_filename = filename.into();
        self
    }

    pub fn with_staging_root(mut self, root: Option<PathBuf>) -> Self {
        self.staging_root = root;
        self
    }

    pub fn with_archive_options(mut self, options: ArchiveOptions) -> Self {
        self.archive = options;
        self
    }

    /// Replace the default [`FrameLauncher`] spine document.
    pub fn with_content_document(mut self, document: impl ContentDocument + 'static) -> Self {
        self.content_document = Box::new(document);
        self
    }

    /// Build the archive at `output` and return its path.
    ///
    /// The staging directory is removed before returning, on success and on
    /// failure. The archive is written to a temporary file next to `output`
    /// and renamed into place, so a failed build never leaves a partial file.
    pub fn build(
        &self,
        payload: &[u8],
        metadata: &PackageMetadata,
        output: &Path,
    ) -> Result<PathBuf> {
        if payload.is_empty() {
            return Err(BuildError::EmptyPayload);
        }
        self.validate(metadata)?;

        let manifest = Manifest::single_page(&self.payload_filename);
        manifest.validate()?;

        info!(
            title = %metadata.title,
            identifier = %metadata.identifier,
            output = %output.display(),
            "building package"
        );

        let entries = self.entries(payload, metadata, &manifest)?;

        let staging = Staging::create(self.staging_root.as_deref())?;
        let result = self.assemble(&staging, &entries, &manifest, output);
        staging.close();
        result
    }

    fn validate(&self, metadata: &PackageMetadata) -> Result<()> {
        metadata.validate()?;
        self.archive.validate()?;
        if !util::is_safe_segment(&self.content_root) {
            return Err(BuildError::InvalidPackage(format!(
                "invalid content root '{}'",
                self.content_root
            )));
        }
        if !util::is_safe_segment(&self.payload_filename) || !self.payload_filename.ends_with(".html")
        {
            return Err(BuildError::InvalidPackage(format!(
                "payload filename must be a plain .html name, got '{}'",
                self.payload_filename
            )));
        }
        Ok(())
    }

    /// All archive entries, in archive order.
    fn entries(
        &self,
        payload: &[u8],
        metadata: &PackageMetadata,
        manifest: &Manifest,
    ) -> Result<Vec<ArchiveEntry>> {
        let target = manifest
            .spine_entries()
            .next()
            .map(|e| e.href.as_str())
            .ok_or_else(|| BuildError::InvalidPackage("empty spine".into()))?;
        let label = metadata.title.as_str();

        Ok(vec![
            ArchiveEntry::mimetype(),
            ArchiveEntry::deflated(CONTAINER_PATH, container_xml(&self.content_root)?),
            ArchiveEntry::deflated(
                self.content_path(PACKAGE_DOCUMENT),
                package_document(metadata, manifest)?,
            ),
            ArchiveEntry::deflated(
                self.content_path(NAV_HREF),
                nav_document(&metadata.title, label, target)?,
            ),
            ArchiveEntry::deflated(
                self.content_path(NCX_HREF),
                ncx_document(metadata, label, target)?,
            ),
            ArchiveEntry::deflated(
                self.content_path(target),
                self.content_document.render(metadata, &self.payload_filename)?,
            ),
            ArchiveEntry::deflated(
                self.content_path(&self.payload_filename),
                inject_shim(payload, &self.shim),
            ),
        ])
    }

    fn assemble(
        &self,
        staging: &Staging,
        entries: &[ArchiveEntry],
        manifest: &Manifest,
        output: &Path,
    ) -> Result<PathBuf> {
        let staged = entries
            .iter()
            .map(|entry| staging.write(entry))
            .collect::<io::Result<Vec<StagedFile>>>()?;
        self.check_manifest_coverage(manifest, &staged)?;

        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = output_tempfile(parent, output)?;
        write_archive(tmp.as_file_mut(), &staged, &self.archive)?;
        tmp.as_file().sync_all()?;
        tmp.persist(output)?;

        info!(
            output = %output.display(),
            entries = staged.len(),
            "package written"
        );
        Ok(output.to_path_buf())
    }

    /// Every manifest href must resolve to a staged file.
    fn check_manifest_coverage(&self, manifest: &Manifest, staged: &[StagedFile]) -> Result<()> {
        let written: HashSet<&str> = staged.iter().map(|f| f.archive_path.as_str()).collect();
        for entry in &manifest.entries {
            let path = self.content_path(&entry.href);
            if !written.contains(path.as_str()) {
                return Err(BuildError::InvalidPackage(format!(
                    "manifest item '{}' has no file at {path}",
                    entry.id
                )));
            }
            debug!(id = %entry.id, path = %path, "manifest item resolved");
        }
        Ok(())
    }

    fn content_path(&self, href: &str) -> String {
        format!("{}/{}", self.content_root, href)
    }
}

/// Temporary file beside `output` that will be renamed over it.
///
/// The file gets the mode of the output it replaces, or that of a freshly
/// created file when there is none.
#[cfg(unix)]
fn output_tempfile(parent: &Path, output: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(parent)?;
    if let Ok(existing) = fs::metadata(output)
        && existing.is_file()
    {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    Ok(tmp)
}

#[cfg(not(unix))]
fn output_tempfile(parent: &Path, _output: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(parent)
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new("")
    }
}
