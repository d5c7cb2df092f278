//! Markup for the fixed documents of a package.
//!
//! All documents are built with quick-xml events rather than string
//! splicing, so text and attribute values are always escaped.

mod container;
mod launcher;
mod nav;
mod ncx;
mod package;
mod xml;

pub use container::{CONTAINER_PATH, PACKAGE_DOCUMENT, PACKAGE_MEDIA_TYPE, container_xml};
pub use launcher::{ContentDocument, FrameLauncher};
pub use nav::nav_document;
pub use ncx::ncx_document;
pub use package::package_document;
