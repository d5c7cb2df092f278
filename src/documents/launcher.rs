//! The spine document that loads the HTML payload.

use std::io;

use super::xml::XmlDocument;
use crate::metadata::PackageMetadata;

/// Produces the single spine document (`index.xhtml`).
///
/// How the payload is embedded is up to the implementation; the builder only
/// requires well-formed XHTML that references `payload_href`.
pub trait ContentDocument {
    fn render(&self, metadata: &PackageMetadata, payload_href: &str) -> io::Result<Vec<u8>>;
}

/// Default content document: a launch button that loads the payload into a
/// full-window sandboxed `iframe`.
///
/// The frame keeps the payload href in `data-src` and only receives a `src`
/// once the reader presses the button, so readers that pre-render pages do
/// not start the payload early.
#[derive(Debug, Clone, Default)]
pub struct FrameLauncher;

const FRAME_SANDBOX: &str =
    "allow-scripts allow-same-origin allow-forms allow-popups allow-modals allow-downloads";

const LAUNCHER_CSS: &str = r#"
body { margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #1a1a1a; color: white; overflow: hidden; height: 100vh; }
.game-container { width: 100vw; height: 100vh; border: none; position: fixed; top: 0; left: 0; z-index: 999; }
.header { position: fixed; top: 20px; left: 20px; z-index: 1000; background-color: rgba(51, 51, 51, 0.95); padding: 15px; border-radius: 12px; text-align: center; max-width: 300px; }
.launch-btn { background-color: #4caf50; color: white; padding: 20px 40px; font-size: 18px; font-weight: bold; margin: 10px; cursor: pointer; border: none; border-radius: 8px; min-width: 200px; }
.status { margin-top: 10px; font-size: 14px; color: #ccc; }
"#;

const LAUNCHER_JS: &str = r#"
document.addEventListener('DOMContentLoaded', function () {
  var button = document.getElementById('launchBtn');
  var frame = document.getElementById('gameFrame');
  var status = document.getElementById('status');
  var header = document.getElementById('header');
  if (!button || !frame) { return; }
  button.addEventListener('click', function () {
    if (frame.getAttribute('src')) { return; }
    status.textContent = 'Loading...';
    frame.onload = function () {
      status.textContent = 'Loaded';
      header.style.display = 'none';
    };
    frame.onerror = function () {
      status.textContent = 'Error loading content.';
    };
    frame.setAttribute('src', frame.getAttribute('data-src'));
    frame.style.display = 'block';
  });
});
"#;

impl ContentDocument for FrameLauncher {
    fn render(&self, metadata: &PackageMetadata, payload_href: &str) -> io::Result<Vec<u8>> {
        let mut doc = XmlDocument::new()?;
        doc.doctype("html");
        doc.start("html", &[("xmlns", "http://www.w3.org/1999/xhtml")])?
            .start("head", &[])?
            .text_element("title", &[], &metadata.title)?
            .empty(
                "meta",
                &[
                    ("name", "viewport"),
                    ("content", "width=device-width, initial-scale=1.0"),
                ],
            )?
            .start("style", &[("type", "text/css")])?
            .cdata(LAUNCHER_CSS)?
            .end("style")?
            .start("script", &[("type", "text/javascript")])?
            .cdata(LAUNCHER_JS)?
            .end("script")?
            .end("head")?;

        doc.start("body", &[])?
            .start("div", &[("id", "header"), ("class", "header")])?
            .text_element("h1", &[], &metadata.title)?
            .text_element(
                "button",
                &[("id", "launchBtn"), ("class", "launch-btn"), ("type", "button")],
                "Launch",
            )?
            .text_element(
                "div",
                &[("id", "status"), ("class", "status")],
                "Press the button above to start",
            )?
            .end("div")?
            .start(
                "iframe",
                &[
                    ("id", "gameFrame"),
                    ("class", "game-container"),
                    ("data-src", payload_href),
                    ("style", "display: none;"),
                    ("allowfullscreen", "true"),
                    ("sandbox", FRAME_SANDBOX),
                ],
            )?
            .text_element(
                "p",
                &[],
                "Your reader does not support embedded HTML content.",
            )?
            .end("iframe")?
            .end("body")?
            .end("html")?;
        Ok(doc.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::super::xml::test_support::{find, parse};
    use super::*;

    #[test]
    fn test_frame_references_payload() {
        let meta = PackageMetadata::new("Eaglecraft");
        let doc = FrameLauncher.render(&meta, "eaglecraft_fixed.html").unwrap();
        let elements = parse(&doc);

        let frame = find(&elements, "iframe")[0];
        assert_eq!(frame.attr("data-src"), Some("eaglecraft_fixed.html"));
        assert_eq!(frame.attr("sandbox"), Some(FRAME_SANDBOX));
        assert_eq!(frame.attr("src"), None);

        assert_eq!(find(&elements, "h1")[0].text, "Eaglecraft");
        assert!(find(&elements, "script")[0].text.contains("data-src"));
    }

    #[test]
    fn test_inline_stylesheet() {
        let doc = FrameLauncher.render(&PackageMetadata::new("Game"), "game.html").unwrap();
        let elements = parse(&doc);
        let style = find(&elements, "style")[0];
        assert_eq!(style.attr("type"), Some("text/css"));
        assert!(style.text.contains(".launch-btn"));
    }

    #[test]
    fn test_title_escaped() {
        let mut meta = PackageMetadata::new("x");
        meta.title = "</title><script>alert(1)</script>".into();
        let doc = FrameLauncher.render(&meta, "game.html").unwrap();
        let elements = parse(&doc);
        assert_eq!(find(&elements, "script").len(), 1);
        assert_eq!(find(&elements, "title")[0].text, meta.title);
    }
}
