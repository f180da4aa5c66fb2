//! Connector identity and configuration records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single connector's identity and configuration.
///
/// Represents one entry of the persisted connector configuration document,
/// keyed there by the connector's logical name:
///
/// ```json
/// {
///   "nuix": {
///     "id": "Reductech.Connectors.Nuix",
///     "version": "1.0.0",
///     "enable": true,
///     "settings": { "licencesourcetype": "dongle" }
///   }
/// }
/// ```
///
/// `enable` defaults to `true` when absent. `settings` holds
/// connector-specific values of arbitrary depth and is omitted from the
/// serialized form when not set.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConnectorSettings {
    /// Stable connector identifier.
    pub id: String,
    /// Version string. Not required to be semver; compared ordinally.
    pub version: String,
    /// Whether the connector is active.
    #[serde(default = "default_enable")]
    pub enable: bool,
    /// Connector-specific configuration values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<HashMap<String, serde_json::Value>>,
}

fn default_enable() -> bool {
    true
}

impl ConnectorSettings {
    /// Create enabled settings with no connector-specific configuration.
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            enable: true,
            settings: None,
        }
    }

    /// The derived identity string `"{id} {version}"`.
    ///
    /// Two entries with the same version string refer to the same physical
    /// connector code, regardless of the names they are registered under.
    pub fn version_string(&self) -> String {
        format!("{} {}", self.id, self.version)
    }
}

impl std::fmt::Display for ConnectorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}
