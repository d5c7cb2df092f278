//! Identifier and timestamp helpers.

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

/// Format used for `dcterms:modified` (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Generate a fresh `urn:uuid:` identifier.
pub fn new_identifier() -> String {
    format!("urn:uuid:{}", Uuid::new_v4())
}

/// Current UTC time formatted for package metadata.
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Check that a timestamp matches [`TIMESTAMP_FORMAT`].
pub fn is_valid_timestamp(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).is_ok()
}

/// Check that an identifier has a URI scheme (`scheme:rest`).
pub fn is_uri(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once(':') else {
        return false;
    };
    !rest.is_empty()
        && scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Check that a name is a single safe path segment.
///
/// Allowed: ASCII letters, digits, `.`, `_` and `-`, not starting with `.`.
pub fn is_safe_segment(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}
