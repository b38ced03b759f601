//! Error types for reading audit-trail bundles.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while locating or reading bundles.
///
/// Only `InvalidDataDir` ends a run; the others are reported per file and
/// the walk continues.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The data directory is missing or not a directory.
    #[error("Data directory {} is not a directory", .path.display())]
    InvalidDataDir { path: PathBuf },

    /// A bundle could not be opened or read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A bundle is not valid JSON or not shaped like `{"Records": [...]}`.
    #[error("Malformed bundle {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A directory entry could not be visited.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl SourceError {
    /// Create an invalid data directory error.
    pub fn invalid_data_dir(path: impl AsRef<Path>) -> Self {
        Self::InvalidDataDir {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an I/O error for a bundle.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Classify a streaming failure for a bundle.
    ///
    /// serde_json surfaces reader failures as its own error type; those are
    /// reported as I/O errors rather than malformed JSON.
    pub fn from_json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        if source.is_io() {
            let io = std::io::Error::from(source);
            Self::io(path, io)
        } else {
            Self::Json {
                path: path.as_ref().to_path_buf(),
                source,
            }
        }
    }
}
