use std::io;

use super::xml::XmlDocument;

pub const CONTAINER_PATH: &str = "META-INF/container.xml";
pub const PACKAGE_DOCUMENT: &str = "content.opf";
pub const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// `META-INF/container.xml` pointing at `<content_root>/content.opf`.
pub fn container_xml(content_root: &str) -> io::Result<Vec<u8>> {
    let full_path = format!("{content_root}/{PACKAGE_DOCUMENT}");

    let mut doc = XmlDocument::new()?;
    doc.start(
        "container",
        &[
            ("version", "1.0"),
            ("xmlns", "urn:oasis:names:tc:opendocument:xmlns:container"),
        ],
    )?
    .start("rootfiles", &[])?
    .empty(
        "rootfile",
        &[("full-path", full_path.as_str()), ("media-type", PACKAGE_MEDIA_TYPE)],
    )?
    .end("rootfiles")?
    .end("container")?;
    Ok(doc.finish())
}
