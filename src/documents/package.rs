use std::io;

use super::xml::XmlDocument;
use crate::manifest::{Manifest, NCX_ID};
use crate::metadata::PackageMetadata;

/// Id of the `dc:identifier` element named by `unique-identifier`.
const UID_ID: &str = "bookid";

/// Generate the EPUB 3 package document (`content.opf`).
pub fn package_document(metadata: &PackageMetadata, manifest: &Manifest) -> io::Result<Vec<u8>> {
    let mut doc = XmlDocument::new()?;
    doc.start(
        "package",
        &[
            ("xmlns", "http://www.idpf.org/2007/opf"),
            ("version", "3.0"),
            ("unique-identifier", UID_ID),
            ("xml:lang", metadata.language.as_str()),
        ],
    )?;

    doc.start("metadata", &[("xmlns:dc", "http://purl.org/dc/elements/1.1/")])?
        .text_element("dc:identifier", &[("id", UID_ID)], &metadata.identifier)?
        .text_element("dc:title", &[], &metadata.title)?;
    if !metadata.creator.is_empty() {
        doc.text_element("dc:creator", &[], &metadata.creator)?;
    }
    doc.text_element("dc:language", &[], &metadata.language)?;
    if let Some(ref subject) = metadata.subject {
        doc.text_element("dc:subject", &[], subject)?;
    }
    if let Some(ref description) = metadata.description {
        doc.text_element("dc:description", &[], description)?;
    }
    doc.text_element("dc:date", &[], &metadata.modified)?
        .text_element("meta", &[("property", "dcterms:modified")], &metadata.modified)?
        .end("metadata")?;

    doc.start("manifest", &[])?;
    for entry in &manifest.entries {
        let properties = entry.properties.join(" ");
        let mut attrs = vec![
            ("id", entry.id.as_str()),
            ("href", entry.href.as_str()),
            ("media-type", entry.media_type.as_str()),
        ];
        if !properties.is_empty() {
            attrs.push(("properties", properties.as_str()));
        }
        doc.empty("item", &attrs)?;
    }
    doc.end("manifest")?;

    // The NCX is only declared on the spine when the manifest carries one.
    let toc = manifest.get(NCX_ID).map(|_| ("toc", NCX_ID));
    let spine_attrs: Vec<_> = toc.into_iter().collect();
    doc.start("spine", &spine_attrs)?;
    for idref in &manifest.spine {
        doc.empty("itemref", &[("idref", idref.as_str())])?;
    }
    doc.end("spine")?.end("package")?;

    Ok(doc.finish())
}
