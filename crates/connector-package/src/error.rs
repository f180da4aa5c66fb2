//! Error types for connector-package

use std::path::PathBuf;

/// Result type for package operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or extracting a package
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An archive entry would resolve outside the destination directory.
    ///
    /// Not retryable: the entry name itself is hostile or malformed.
    #[error("archive entry '{entry}' resolves outside the destination directory")]
    UnsafePath { entry: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reading the archive container or one of its entries.
    #[error("failed to read archive: {message}")]
    Archive { message: String },

    /// Extraction aborted by its cancellation token. Entries written before
    /// the abort remain on disk.
    #[error("extraction canceled")]
    Canceled,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }
}
