//! Error types for package builds.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a package.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("HTML payload not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("HTML payload is empty")]
    EmptyPayload,

    #[error("I/O error: {0}")]
    IoFailure(#[from] io::Error),

    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("{0}")]
    Unknown(String),
}

impl From<zip::result::ZipError> for BuildError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => BuildError::IoFailure(e),
            other => BuildError::Unknown(other.to_string()),
        }
    }
}

impl From<tempfile::PersistError> for BuildError {
    fn from(err: tempfile::PersistError) -> Self {
        BuildError::IoFailure(err.error)
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Convert any error into an io error.
pub(crate) fn io_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::other(e)
}
