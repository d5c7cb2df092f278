use std::io;

use super::xml::XmlDocument;
use crate::metadata::PackageMetadata;

/// Legacy NCX with one navPoint.
///
/// `dtb:uid` carries the same identifier as the package document.
pub fn ncx_document(metadata: &PackageMetadata, label: &str, target: &str) -> io::Result<Vec<u8>> {
    let mut doc = XmlDocument::new()?;
    doc.start(
        "ncx",
        &[
            ("xmlns", "http://www.daisy.org/z3986/2005/ncx/"),
            ("version", "2005-1"),
        ],
    )?
    .start("head", &[])?
    .empty(
        "meta",
        &[("name", "dtb:uid"), ("content", metadata.identifier.as_str())],
    )?
    .empty("meta", &[("name", "dtb:depth"), ("content", "1")])?
    .empty("meta", &[("name", "dtb:totalPageCount"), ("content", "0")])?
    .empty("meta", &[("name", "dtb:maxPageNumber"), ("content", "0")])?
    .end("head")?
    .start("docTitle", &[])?
    .text_element("text", &[], &metadata.title)?
    .end("docTitle")?
    .start("navMap", &[])?
    .start("navPoint", &[("id", "navpoint-1"), ("playOrder", "1")])?
    .start("navLabel", &[])?
    .text_element("text", &[], label)?
    .end("navLabel")?
    .empty("content", &[("src", target)])?
    .end("navPoint")?
    .end("navMap")?
    .end("ncx")?;
    Ok(doc.finish())
}

#[cfg(test)]
mod tests {
    use super::super::xml::test_support::{find, parse};
    use super::*;

    #[test]
    fn test_uid_matches_identifier() {
        let meta = PackageMetadata::new("Eaglecraft").with_identifier("urn:uuid:abc");
        let doc = ncx_document(&meta, "Eaglecraft Game", "index.xhtml").unwrap();
        let elements = parse(&doc);

        let uid = find(&elements, "meta")
            .into_iter()
            .find(|m| m.attr("name") == Some("dtb:uid"))
            .unwrap();
        assert_eq!(uid.attr("content"), Some("urn:uuid:abc"));

        let points = find(&elements, "navPoint");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].attr("playOrder"), Some("1"));
        assert_eq!(find(&elements, "content")[0].attr("src"), Some("index.xhtml"));

        let texts: Vec<_> = find(&elements, "text").iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, vec!["Eaglecraft", "Eaglecraft Game"]);
    }

    #[test]
    fn test_special_characters_escaped() {
        let mut meta = PackageMetadata::new("x").with_identifier("urn:x:\"a\"&<b>");
        meta.title = "Cats & <Dogs>".into();
        let doc = ncx_document(&meta, "Play", "index.xhtml").unwrap();
        let text = String::from_utf8(doc.clone()).unwrap();
        assert!(text.contains("content=\"urn:x:&quot;a&quot;&amp;&lt;b&gt;\""));
        assert!(text.contains("Cats &amp; &lt;Dogs&gt;"));

        let elements = parse(&doc);
        assert_eq!(find(&elements, "text")[0].text, "Cats & <Dogs>");
    }
}
