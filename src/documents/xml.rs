//! Thin structured writer over `quick_xml::Writer`.
//!
//! Every text node and attribute value goes through quick-xml's escaping,
//! so metadata can never break the surrounding markup.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::io_error;

pub(crate) struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    /// Start a document with a UTF-8 XML declaration.
    pub fn new() -> io::Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(io_error)?;
        Ok(Self { writer })
    }

    /// Emit a `<!DOCTYPE ...>` line. Must precede the root element.
    pub fn doctype(&mut self, decl: &str) -> &mut Self {
        let out = self.writer.get_mut();
        out.extend_from_slice(b"\n<!DOCTYPE ");
        out.extend_from_slice(decl.as_bytes());
        out.push(b'>');
        self
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> io::Result<&mut Self> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.write(Event::Start(elem))
    }

    pub fn end(&mut self, name: &str) -> io::Result<&mut Self> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> io::Result<&mut Self> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.write(Event::Empty(elem))
    }

    /// `<name attrs>text</name>` on one line.
    pub fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> io::Result<&mut Self> {
        self.start(name, attrs)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Raw character data. `content` must not contain `]]>`.
    pub fn cdata(&mut self, content: &str) -> io::Result<&mut Self> {
        self.write(Event::CData(BytesCData::new(content)))
    }

    /// Finish the document, ending it with a newline.
    pub fn finish(self) -> Vec<u8> {
        let mut out = self.writer.into_inner();
        out.push(b'\n');
        out
    }

    fn write(&mut self, event: Event<'_>) -> io::Result<&mut Self> {
        self.writer.write_event(event).map_err(io_error)?;
        Ok(self)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{find, parse};
    use super::*;

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let mut doc = XmlDocument::new().unwrap();
        doc.start("root", &[("title", "a \"quoted\" <b> & c")])
            .unwrap()
            .text_element("t", &[], "Tom & Jerry <3")
            .unwrap()
            .end("root")
            .unwrap();
        let bytes = doc.finish();
        let text = String::from_utf8(bytes.clone()).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("Tom &amp; Jerry &lt;3"));
        assert!(text.contains("&quot;quoted&quot;"));

        let elements = parse(&bytes);
        assert_eq!(find(&elements, "t")[0].text, "Tom & Jerry <3");
        assert_eq!(
            find(&elements, "root")[0].attr("title"),
            Some("a \"quoted\" <b> & c")
        );
    }

    #[test]
    fn test_doctype_precedes_root() {
        let mut doc = XmlDocument::new().unwrap();
        doc.doctype("html");
        doc.empty("html", &[]).unwrap();
        let text = String::from_utf8(doc.finish()).unwrap();
        let doctype = text.find("<!DOCTYPE html>").unwrap();
        let root = text.find("<html").unwrap();
        assert!(doctype < root);
        assert!(text.ends_with('\n'));
    }
}
