use serde::{Deserialize, Serialize};

use crate::describe::Description;
use crate::error::ConfigurationError;
use crate::schema::Schema;

/// A named schema stored as its description.
///
/// Definition files on disk and the entries of a [`SchemaPackage`] both use
/// this shape.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use value_schema_core::{SchemaDefinition, number};
///
/// let definition = SchemaDefinition::new("port", &number().integer().into());
/// let schema = definition.compile().unwrap();
/// assert!(schema.validate(&json!(8080)).is_ok());
/// assert!(schema.validate(&json!(80.5)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Name the schema is looked up by.
    pub name: String,
    /// Description of the schema.
    pub schema: Description,
}

impl SchemaDefinition {
    /// Creates a definition by describing `schema`.
    pub fn new(name: impl Into<String>, schema: &Schema) -> Self {
        Self {
            name: name.into(),
            schema: schema.describe(),
        }
    }

    /// Compiles the stored description.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigurationError`] raised by
    /// [`Schema::from_description`].
    pub fn compile(&self) -> Result<Schema, ConfigurationError> {
        Schema::from_description(&self.schema)
    }
}

/// Serializable bundle of schema definitions for distribution.
///
/// # Examples
///
/// ```
/// use value_schema_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0", "2026-01-15T10:30:00Z");
/// package.name = Some("service-config".into());
/// package
///     .definitions
///     .push(SchemaDefinition::new("port", &number().into()));
///
/// assert_eq!(package.definition_count(), 1);
/// assert_eq!(package.schema_version.as_deref(), Some(SCHEMA_CONTRACT_VERSION));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaPackage {
    /// Description format version (from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Package version (semver string).
    pub version: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// ISO-8601 creation timestamp.
    pub generated_at: String,
    /// SHA-256 of the canonical JSON of `definitions`, if computed.
    pub bundle_hash: Option<String>,
    pub definitions: Vec<SchemaDefinition>,
}

impl SchemaPackage {
    /// Creates an empty package stamped with the current contract version.
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            generated_at: generated_at.into(),
            bundle_hash: None,
            definitions: Vec::new(),
        }
    }

    /// Returns the number of definitions in this package.
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }
}
