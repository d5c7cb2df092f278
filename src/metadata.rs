//! Descriptive metadata for a package.

use crate::error::{BuildError, Result};
use crate::util;

/// Metadata written into the package document and the NCX.
///
/// A fresh identifier and modification timestamp are generated by
/// [`PackageMetadata::new`], so every build gets its own identity unless the
/// caller pins them with [`with_identifier`](Self::with_identifier) and
/// [`with_modified`](Self::with_modified).
///
/// # Example
///
/// ```
/// use gamepub::PackageMetadata;
///
/// let meta = PackageMetadata::new("My Game")
///     .with_creator("Me")
///     .with_language("en");
/// assert!(meta.identifier.starts_with("urn:uuid:"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub title: String,
    pub creator: String,
    /// BCP 47 language tag.
    pub language: String,
    /// Unique identifier; must be a URI.
    pub identifier: String,
    /// `dcterms:modified`, UTC with second precision (`2024-01-01T00:00:00Z`).
    pub modified: String,
    pub subject: Option<String>,
    pub description: Option<String>,
}

impl PackageMetadata {
    /// Create metadata with a fresh identifier and the current time.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            creator: String::new(),
            language: "en".to_string(),
            identifier: util::new_identifier(),
            modified: util::now_timestamp(),
            subject: None,
            description: None,
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_modified(mut self, modified: impl Into<String>) -> Self {
        self.modified = modified.into();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the fields the package document depends on.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(BuildError::InvalidPackage("title is empty".into()));
        }
        if self.language.trim().is_empty() {
            return Err(BuildError::InvalidPackage("language is empty".into()));
        }
        if !util::is_uri(&self.identifier) {
            return Err(BuildError::InvalidPackage(format!(
                "identifier is not a URI: {}",
                self.identifier
            )));
        }
        if !util::is_valid_timestamp(&self.modified) {
            return Err(BuildError::InvalidPackage(format!(
                "modified timestamp must be YYYY-MM-DDThh:mm:ssZ: {}",
                self.modified
            )));
        }
        Ok(())
    }
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_identity() {
        let a = PackageMetadata::new("Game");
        let b = PackageMetadata::new("Game");
        assert_ne!(a.identifier, b.identifier);
        assert_eq!(a.language, "en");
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let meta = PackageMetadata::new("Game")
            .with_creator("WereWolf")
            .with_language("de")
            .with_identifier("urn:isbn:123")
            .with_modified("2024-01-01T00:00:00Z")
            .with_subject("Games")
            .with_description("A game");
        assert_eq!(meta.creator, "WereWolf");
        assert_eq!(meta.language, "de");
        assert_eq!(meta.identifier, "urn:isbn:123");
        assert_eq!(meta.modified, "2024-01-01T00:00:00Z");
        assert_eq!(meta.subject.as_deref(), Some("Games"));
        assert_eq!(meta.description.as_deref(), Some("A game"));
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let base = PackageMetadata::new("Game");
        assert!(base.clone().with_identifier("not-a-uri").validate().is_err());
        assert!(base.clone().with_modified("yesterday").validate().is_err());
        assert!(base.clone().with_language("").validate().is_err());

        let mut untitled = base;
        untitled.title = "  ".into();
        assert!(matches!(
            untitled.validate(),
            Err(BuildError::InvalidPackage(_))
        ));
    }
}
