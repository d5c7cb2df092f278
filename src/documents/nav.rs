use std::io;

use super::xml::XmlDocument;

/// EPUB 3 navigation document with a single table-of-contents entry.
pub fn nav_document(title: &str, label: &str, target: &str) -> io::Result<Vec<u8>> {
    let mut doc = XmlDocument::new()?;
    doc.doctype("html");
    doc.start(
        "html",
        &[
            ("xmlns", "http://www.w3.org/1999/xhtml"),
            ("xmlns:epub", "http://www.idpf.org/2007/ops"),
        ],
    )?
    .start("head", &[])?
    .text_element("title", &[], title)?
    .end("head")?
    .start("body", &[])?
    .start("nav", &[("epub:type", "toc"), ("id", "toc")])?
    .text_element("h1", &[], "Table of Contents")?
    .start("ol", &[])?
    .start("li", &[])?
    .text_element("a", &[("href", target)], label)?
    .end("li")?
    .end("ol")?
    .end("nav")?
    .end("body")?
    .end("html")?;
    Ok(doc.finish())
}

#[cfg(test)]
mod tests {
    use super::super::xml::test_support::{find, parse};
    use super::*;

    #[test]
    fn test_single_toc_entry() {
        let doc = nav_document("Eaglecraft", "Eaglecraft", "index.xhtml").unwrap();
        let text = String::from_utf8(doc.clone()).unwrap();
        assert!(text.contains("<!DOCTYPE html>"));

        let elements = parse(&doc);
        let nav = find(&elements, "nav")[0];
        assert_eq!(nav.attr("epub:type"), Some("toc"));

        let links = find(&elements, "a");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].attr("href"), Some("index.xhtml"));
        assert_eq!(links[0].text, "Eaglecraft");
    }

    #[test]
    fn test_label_escaped() {
        let doc = nav_document("A & B", "<Play>", "index.xhtml").unwrap();
        let elements = parse(&doc);
        assert_eq!(find(&elements, "title")[0].text, "A & B");
        assert_eq!(find(&elements, "a")[0].text, "<Play>");
    }
}
