//! Package manifest and spine.

use std::collections::HashSet;

use crate::error::{BuildError, Result};

pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
pub const HTML_MEDIA_TYPE: &str = "text/html";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

pub const NAV_HREF: &str = "nav.xhtml";
pub const NCX_HREF: &str = "toc.ncx";
pub const INDEX_HREF: &str = "index.xhtml";

/// Id of the NCX item, referenced from the spine's `toc` attribute.
pub const NCX_ID: &str = "ncx";

/// A single `<item>` in the package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    /// Path relative to the content root.
    pub href: String,
    pub media_type: String,
    /// Space-separated in the `properties` attribute (`nav`, `scripted`, ...).
    pub properties: Vec<String>,
}

impl ManifestEntry {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// Manifest items plus the ordered spine (item ids).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub spine: Vec<String>,
}

impl Manifest {
    /// The fixed single-page layout: navigation, launcher page, payload, NCX.
    ///
    /// The launcher page is the only spine item.
    pub fn single_page(payload_href: &str) -> Self {
        Self {
            entries: vec![
                ManifestEntry::new("nav", NAV_HREF, XHTML_MEDIA_TYPE).with_property("nav"),
                ManifestEntry::new("index", INDEX_HREF, XHTML_MEDIA_TYPE)
                    .with_property("scripted"),
                ManifestEntry::new("payload", payload_href, HTML_MEDIA_TYPE),
                ManifestEntry::new(NCX_ID, NCX_HREF, NCX_MEDIA_TYPE),
            ],
            spine: vec!["index".to_string()],
        }
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The entry carrying the `nav` property.
    pub fn nav(&self) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.has_property("nav"))
    }

    /// Entries referenced by the spine, in reading order.
    pub fn spine_entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.spine.iter().filter_map(|id| self.get(id))
    }

    /// Check manifest and spine consistency.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut hrefs = HashSet::new();
        for entry in &self.entries {
            if !ids.insert(entry.id.as_str()) {
                return Err(invalid(format!("duplicate manifest id '{}'", entry.id)));
            }
            if !hrefs.insert(entry.href.as_str()) {
                return Err(invalid(format!("duplicate manifest href '{}'", entry.href)));
            }
            if !is_relative_href(&entry.href) {
                return Err(invalid(format!(
                    "manifest href must be relative: '{}'",
                    entry.href
                )));
            }
        }

        let nav_count = self.entries.iter().filter(|e| e.has_property("nav")).count();
        if nav_count != 1 {
            return Err(invalid(format!(
                "expected exactly one nav item, found {nav_count}"
            )));
        }

        if self.spine.len() != 1 {
            return Err(invalid(format!(
                "expected exactly one spine item, found {}",
                self.spine.len()
            )));
        }
        for idref in &self.spine {
            if self.get(idref).is_none() {
                return Err(invalid(format!(
                    "spine references unknown item '{idref}'"
                )));
            }
        }

        Ok(())
    }
}

fn invalid(msg: String) -> BuildError {
    BuildError::InvalidPackage(msg)
}

fn is_relative_href(href: &str) -> bool {
    !href.is_empty()
        && !href.starts_with('/')
        && !href.contains('\\')
        && href.split('/').all(|seg| !seg.is_empty() && seg != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_layout() {
        let manifest = Manifest::single_page("game.html");
        assert!(manifest.validate().is_ok());
        assert_eq!(manifest.nav().map(|e| e.href.as_str()), Some(NAV_HREF));

        let spine: Vec<_> = manifest.spine_entries().map(|e| e.href.as_str()).collect();
        assert_eq!(spine, vec![INDEX_HREF]);

        let payload = manifest.get("payload").unwrap();
        assert_eq!(payload.href, "game.html");
        assert_eq!(payload.media_type, HTML_MEDIA_TYPE);
        assert!(manifest.get("index").unwrap().has_property("scripted"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut manifest = Manifest::single_page("game.html");
        manifest
            .entries
            .push(ManifestEntry::new("index", "other.xhtml", XHTML_MEDIA_TYPE));
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate manifest id"));
    }

    #[test]
    fn test_two_nav_items_rejected() {
        let mut manifest = Manifest::single_page("game.html");
        manifest.entries.push(
            ManifestEntry::new("nav2", "nav2.xhtml", XHTML_MEDIA_TYPE).with_property("nav"),
        );
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_missing_nav_rejected() {
        let mut manifest = Manifest::single_page("game.html");
        manifest.entries.retain(|e| !e.has_property("nav"));
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_dangling_spine_rejected() {
        let mut manifest = Manifest::single_page("game.html");
        manifest.spine = vec!["chapter1".to_string()];
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("unknown item"));
    }

    #[test]
    fn test_multiple_spine_items_rejected() {
        let mut manifest = Manifest::single_page("game.html");
        manifest.spine.push("nav".to_string());
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_relative_href() {
        assert!(is_relative_href("index.xhtml"));
        assert!(is_relative_href("images/cover.png"));
        assert!(!is_relative_href("/abs.xhtml"));
        assert!(!is_relative_href("../up.xhtml"));
        assert!(!is_relative_href("a//b"));
        assert!(!is_relative_href(""));
    }
}
