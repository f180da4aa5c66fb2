//! Connector package handling for Connector Manager.
//!
//! This crate wraps a downloaded connector package archive and safely
//! extracts its file entries beneath a destination directory.

pub mod error;
pub mod metadata;
pub mod package;

pub use error::{Error, Result};
pub use metadata::ConnectorMetadata;
pub use package::ConnectorPackage;
