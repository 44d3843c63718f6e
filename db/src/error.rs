//! Error types for schema database operations.
//!
//! Covers every failure mode of the crate: I/O, serialization, compiling a
//! stored definition, bundle hash verification, and validation against a
//! named schema.

use thiserror::Error;
use value_schema_core::{ConfigurationError, ValidationErrors};

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A stored definition does not compile into a schema.
    #[error("invalid definition {name:?}: {source}")]
    InvalidDefinition {
        name: String,
        #[source]
        source: ConfigurationError,
    },

    /// Two definitions in one source share a name.
    #[error("duplicate definition: {0}")]
    DuplicateDefinition(String),

    /// No schema is registered under the requested name.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// Bundle hash mismatch between the stored and recomputed values.
    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,

    /// A value failed validation against a named schema.
    #[error("validation failed:\n{0}")]
    Validation(#[from] ValidationErrors),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
