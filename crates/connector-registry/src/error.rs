//! Error types for connector-registry

use std::path::PathBuf;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in registry operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A connector is already registered under this name.
    ///
    /// Not retryable: re-adding the same name reproduces the failure.
    /// Use the indexed `set` operation for insert-or-replace semantics.
    #[error("a connector named '{name}' is already registered")]
    DuplicateName { name: String },

    /// No connector is registered under this name.
    #[error("no connector named '{name}' is registered")]
    NotFound { name: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted registry document is not valid JSON or has the wrong shape.
    #[error("failed to parse connector configuration at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Operation aborted by its cancellation token before committing.
    #[error("registry operation canceled")]
    Canceled,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
