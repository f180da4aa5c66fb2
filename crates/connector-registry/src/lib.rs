//! Connector catalog for Connector Manager.
//!
//! This crate provides the connector settings data model, the registry
//! trait with its in-memory implementation, and a JSON-backed registry
//! that writes through to disk.

pub mod error;
pub mod file;
pub mod registry;
pub mod settings;

pub use error::{Error, Result};
pub use file::FileRegistry;
pub use registry::{ConnectorRegistry, InMemoryRegistry};
pub use settings::ConnectorSettings;
