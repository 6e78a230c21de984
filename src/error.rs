use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for buildstamp operations
#[derive(Error, Debug)]
pub enum BuildstampError {
    #[error("Counter file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("Malformed counter file {}: {}", .path.display(), .reason)]
    Malformed { path: PathBuf, reason: String },

    #[error("Lock file {} exists; another buildstamp run is active or crashed (remove it by hand if stale)", .path.display())]
    Locked { path: PathBuf },

    #[error("Refusing to overwrite existing counter file: {}", .path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Packager failed: {0}")]
    Packager(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in buildstamp
pub type Result<T> = std::result::Result<T, BuildstampError>;

impl BuildstampError {
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        BuildstampError::MissingFile { path: path.into() }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BuildstampError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BuildstampError::Config(msg.into())
    }

    /// Create a version parsing error with context
    pub fn version(msg: impl Into<String>) -> Self {
        BuildstampError::Version(msg.into())
    }

    /// Attribute a parsing error to the counter file it came from
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            BuildstampError::Version(reason) => BuildstampError::Malformed {
                path: path.into(),
                reason,
            },
            other => other,
        }
    }

    /// Create a render error with context
    pub fn render(msg: impl Into<String>) -> Self {
        BuildstampError::Render(msg.into())
    }

    /// Create a packager error with context
    pub fn packager(msg: impl Into<String>) -> Self {
        BuildstampError::Packager(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        BuildstampError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        BuildstampError::Remote(msg.into())
    }
}
