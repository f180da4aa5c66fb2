//! Package identity metadata.

use std::path::{Path, PathBuf};

/// Identifies a connector package independent of where it is installed.
///
/// The `(id, version)` pair correlates an extracted package with the
/// registry entry that references it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectorMetadata {
    /// Stable connector identifier.
    pub id: String,
    /// Version string of the packaged code.
    pub version: String,
}

impl ConnectorMetadata {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    /// Directory a package with this identity installs into, beneath `root`.
    ///
    /// Side-by-side versions of the same connector each get their own
    /// directory: `root/{id}/{version}`.
    pub fn install_path(&self, root: &Path) -> PathBuf {
        root.join(&self.id).join(&self.version)
    }
}

impl std::fmt::Display for ConnectorMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}
