//! Connector registry: a name-keyed catalog with identity queries.
//!
//! Identity is split across two axes. The logical **name** is the
//! installation slot a connector is invoked by; the `(id, version)` pair
//! identifies what code occupies that slot. Several entries may reference
//! the same `id` under different names (side-by-side versions), but a name
//! is unique within a registry.

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::settings::ConnectorSettings;

/// Authoritative store of configured connectors.
///
/// `add`, `remove` and `set` are asynchronous so a persisting implementation
/// can write through to durable storage. On cancellation no partial mutation
/// is observable: the in-memory and persisted views stay consistent with
/// each other. Mutating calls on one instance are expected to be serialized
/// by the caller; no internal locking is provided.
#[async_trait]
pub trait ConnectorRegistry: Send + Sync {
    /// Register `settings` under `name`.
    ///
    /// Fails with [`Error::DuplicateName`] if the name is already taken and
    /// leaves the existing entry in place. Use [`set`](Self::set) for
    /// insert-or-replace semantics.
    async fn add(
        &mut self,
        name: &str,
        settings: ConnectorSettings,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Remove the entry under `name`, returning whether anything was removed.
    ///
    /// An absent name is not an error; removing it again returns `false`.
    async fn remove(&mut self, name: &str, cancel: &CancellationToken) -> Result<bool>;

    /// Insert-or-replace the entry under `name`.
    ///
    /// No uniqueness conflict is possible since the name is the key itself.
    async fn set(
        &mut self,
        name: &str,
        settings: ConnectorSettings,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Whether an entry exists under `name`.
    fn contains(&self, name: &str) -> bool;

    /// Whether any entry's id equals `id`.
    fn contains_id(&self, id: &str) -> bool;

    /// Whether any entry's version string equals `"{id} {version}"`.
    fn contains_version_string(&self, id: &str, version: &str) -> bool;

    /// The settings under `name`, or [`Error::NotFound`].
    fn get(&self, name: &str) -> Result<&ConnectorSettings>;

    /// The settings under `name`, if present.
    fn try_get_settings(&self, name: &str) -> Option<&ConnectorSettings>;

    /// All settings whose id equals `id`, in registration order.
    fn try_get_settings_by_id(&self, id: &str) -> Vec<&ConnectorSettings>;

    /// Registered names, in registration order.
    fn names(&self) -> Vec<&str>;

    /// Registered settings, in registration order.
    fn settings(&self) -> Vec<&ConnectorSettings>;

    /// `(name, settings)` pairs in registration order.
    ///
    /// Each call starts a fresh pass over the entries.
    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &ConnectorSettings)> + '_>;

    /// Number of registered connectors.
    fn len(&self) -> usize;

    /// Whether the registry has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`ConnectorRegistry`] with insertion-ordered enumeration.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    connectors: IndexMap<String, ConnectorSettings>,
}

impl InMemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            connectors: IndexMap::new(),
        }
    }

    /// Create a registry from an initial set of connectors, e.g. one loaded
    /// from persisted configuration.
    pub fn with_connectors(
        connectors: impl IntoIterator<Item = (String, ConnectorSettings)>,
    ) -> Self {
        Self {
            connectors: connectors.into_iter().collect(),
        }
    }

    pub(crate) fn snapshot(&self) -> IndexMap<String, ConnectorSettings> {
        self.connectors.clone()
    }

    pub(crate) fn insert(&mut self, name: String, settings: ConnectorSettings) {
        self.connectors.insert(name, settings);
    }

    pub(crate) fn delete(&mut self, name: &str) -> bool {
        self.connectors.shift_remove(name).is_some()
    }
}

#[async_trait]
impl ConnectorRegistry for InMemoryRegistry {
    async fn add(
        &mut self,
        name: &str,
        settings: ConnectorSettings,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if self.connectors.contains_key(name) {
            return Err(Error::DuplicateName {
                name: name.to_string(),
            });
        }
        if cancel.is_cancelled() {
            return Err(Error::Canceled);
        }
        tracing::debug!(name, connector = %settings, "registering connector");
        self.connectors.insert(name.to_string(), settings);
        Ok(())
    }

    async fn remove(&mut self, name: &str, cancel: &CancellationToken) -> Result<bool> {
        if cancel.is_cancelled() {
            return Err(Error::Canceled);
        }
        let removed = self.connectors.shift_remove(name).is_some();
        tracing::debug!(name, removed, "removing connector");
        Ok(removed)
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
        self.connectors.insert(name.to_string(), settings);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.connectors.contains_key(name)
    }

    fn contains_id(&self, id: &str) -> bool {
        self.connectors.values().any(|c| c.id == id)
    }

    fn contains_version_string(&self, id: &str, version: &str) -> bool {
        let expected = format!("{id} {version}");
        self.connectors
            .values()
            .any(|c| c.version_string() == expected)
    }

    fn get(&self, name: &str) -> Result<&ConnectorSettings> {
        self.connectors.get(name).ok_or_else(|| Error::NotFound {
            name: name.to_string(),
        })
    }

    fn try_get_settings(&self, name: &str) -> Option<&ConnectorSettings> {
        self.connectors.get(name)
    }

    fn try_get_settings_by_id(&self, id: &str) -> Vec<&ConnectorSettings> {
        self.connectors.values().filter(|c| c.id == id).collect()
    }

    fn names(&self) -> Vec<&str> {
        self.connectors.keys().map(String::as_str).collect()
    }

    fn settings(&self) -> Vec<&ConnectorSettings> {
        self.connectors.values().collect()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &ConnectorSettings)> + '_> {
        Box::new(self.connectors.iter().map(|(k, v)| (k.as_str(), v)))
    }

    fn len(&self) -> usize {
        self.connectors.len()
    }
}
