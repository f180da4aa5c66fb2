//! JSON-backed connector registry with write-through persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::registry::{ConnectorRegistry, InMemoryRegistry};
use crate::settings::ConnectorSettings;

/// A [`ConnectorRegistry`] persisted as a JSON document on disk.
///
/// Wraps [`InMemoryRegistry`] and writes the whole document through on every
/// mutation. The document is written to a temp file next to the target and
/// renamed into place, and the in-memory map is only updated once the
/// persist succeeds, so a failed or canceled mutation leaves both views
/// unchanged and never leaves a torn file behind.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    inner: InMemoryRegistry,
}

impl FileRegistry {
    /// Load a registry from an existing JSON document.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::io(&path, e))?;
        let connectors: IndexMap<String, ConnectorSettings> =
            serde_json::from_str(&raw).map_err(|e| Error::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), count = connectors.len(), "loaded connector registry");
        Ok(Self {
            path,
            inner: InMemoryRegistry::with_connectors(connectors),
        })
    }

    /// Create a new registry document at `path` from an initial set of
    /// connectors, writing it out immediately.
    pub async fn create(
        path: impl Into<PathBuf>,
        connectors: impl IntoIterator<Item = (String, ConnectorSettings)>,
    ) -> Result<Self> {
        let registry = Self {
            path: path.into(),
            inner: InMemoryRegistry::with_connectors(connectors),
        };
        registry.persist(&registry.inner.snapshot()).await?;
        Ok(registry)
    }

    /// Path of the persisted document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `connectors` and atomically replace the document on disk.
    async fn persist(&self, connectors: &IndexMap<String, ConnectorSettings>) -> Result<()> {
        let raw = serde_json::to_string_pretty(connectors).map_err(|e| Error::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        // Temp file in the same directory so the rename stays on one filesystem.
        let temp_name = format!(
            ".{}.{}.tmp",
            self.path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default(),
            std::process::id()
        );
        let temp_path = self.path.with_file_name(&temp_name);

        tokio::fs::write(&temp_path, raw.as_bytes())
            .await
            .map_err(|e| Error::io(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), "persisted connector registry");
        Ok(())
    }
}

#[async_trait]
impl ConnectorRegistry for FileRegistry {
    async fn add(
        &mut self,
        name: &str,
        settings: ConnectorSettings,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if self.inner.contains(name) {
            return Err(Error::DuplicateName {
                name: name.to_string(),
            });
        }
        if cancel.is_cancelled() {
            return Err(Error::Canceled);
        }

        let mut updated = self.inner.snapshot();
        updated.insert(name.to_string(), settings.clone());
        self.persist(&updated).await?;

        tracing::debug!(name, connector = %settings, "registering connector");
        self.inner.insert(name.to_string(), settings);
        Ok(())
    }

    async fn remove(&mut self, name: &str, cancel: &CancellationToken) -> Result<bool> {
        if !self.inner.contains(name) {
            return Ok(false);
        }
        if cancel.is_cancelled() {
            return Err(Error::Canceled);
        }

        let mut updated = self.inner.snapshot();
        updated.shift_remove(name);
        self.persist(&updated).await?;

        tracing::debug!(name, "removing connector");
        Ok(self.inner.delete(name))
    }

    async fn set(
        &mut self,
        name: &str,
        settings: ConnectorSettings,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Canceled);
        }

        let mut updated = self.inner.snapshot();
        updated.insert(name.to_string(), settings.clone());
        self.persist(&updated).await?;

        self.inner.insert(name.to_string(), settings);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    fn contains_id(&self, id: &str) -> bool {
        self.inner.contains_id(id)
    }

    fn contains_version_string(&self, id: &str, version: &str) -> bool {
        self.inner.contains_version_string(id, version)
    }

    fn get(&self, name: &str) -> Result<&ConnectorSettings> {
        self.inner.get(name)
    }

    fn try_get_settings(&self, name: &str) -> Option<&ConnectorSettings> {
        self.inner.try_get_settings(name)
    }

    fn try_get_settings_by_id(&self, id: &str) -> Vec<&ConnectorSettings> {
        self.inner.try_get_settings_by_id(id)
    }

    fn names(&self) -> Vec<&str> {
        self.inner.names()
    }

    fn settings(&self) -> Vec<&ConnectorSettings> {
        self.inner.settings()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &ConnectorSettings)> + '_> {
        self.inner.iter()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
