//! # gamepub
//!
//! Package a self-contained HTML game (or any single HTML page) into an
//! EPUB 3 container that e-readers with scripting support can open.
//!
//! The archive always has the same shape:
//!
//! ```text
//! mimetype                 stored, "application/epub+zip"
//! META-INF/container.xml
//! OEBPS/content.opf
//! OEBPS/nav.xhtml
//! OEBPS/toc.ncx
//! OEBPS/index.xhtml        launcher page (the only spine item)
//! OEBPS/<payload>.html     the payload with the compatibility shim spliced in
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use gamepub::{BuildConfig, PackageMetadata, build};
//!
//! let meta = PackageMetadata::new("Eaglecraft").with_creator("WereWolf");
//! let config = BuildConfig::new("eaglecraft.html", "eaglecraft.epub", meta)
//!     .with_shim(std::fs::read_to_string("shim.html")?);
//! let path = build(&config)?;
//! println!("wrote {}", path.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod builder;
pub mod documents;
pub mod error;
pub mod inject;
pub mod manifest;
pub mod metadata;
pub mod staging;
pub mod verify;
pub(crate) mod util;

pub use archive::{ArchiveEntry, ArchiveOptions, Compression};
pub use builder::{BuildConfig, PackageBuilder, build};
pub use documents::{ContentDocument, FrameLauncher};
pub use error::{BuildError, Result};
pub use inject::inject_shim;
pub use manifest::{Manifest, ManifestEntry};
pub use metadata::PackageMetadata;
pub use verify::{ContainerReport, inspect};
