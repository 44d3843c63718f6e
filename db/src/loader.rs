//! Schema database loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaDatabase`] for compiled-schema lookup by name and
//! [`DatabaseBuilder`] for constructing a database from multiple sources
//! with automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use value_schema_db::SchemaDatabase;
//!
//! // Load from a directory of JSON/YAML definition files
//! let db = SchemaDatabase::from_dir("schemas/").unwrap();
//! assert!(db.get("service").is_some());
//!
//! // Load from a single SchemaPackage JSON bundle
//! let db = SchemaDatabase::from_bundle("schemas.json").unwrap();
//!
//! // Use the builder for a fallback chain
//! let db = SchemaDatabase::builder()
//!     .from_dir("schemas/")
//!     .from_bundle("schemas.json")
//!     .build()
//!     .unwrap();
//! ```
//!
//! All lookups are O(1) via the internal `HashMap`.

use std::collections::{HashMap, HashSet};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use value_schema_core::{Schema, SchemaDefinition, SchemaPackage, ValidationOptions};

use crate::bundle::verify_package;
use crate::error::{DatabaseError, Result};

const DEFINITION_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Describes where a [`SchemaDatabase`] was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseSource {
    /// Loaded from a directory of definition files.
    Directory(PathBuf),
    /// Loaded from a single [`SchemaPackage`] JSON file.
    Bundle(PathBuf),
    /// Built in memory from definitions.
    Memory,
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<DatabaseSource>),
}

/// Reads one definition file, choosing the format from its extension.
///
/// # Errors
///
/// Returns [`DatabaseError::IoError`] if the file cannot be opened, or
/// [`DatabaseError::JsonError`] / [`DatabaseError::YamlError`] if parsing
/// fails.
pub fn read_definition(path: impl AsRef<Path>) -> Result<SchemaDefinition> {
    let path = path.as_ref();
    let reader = BufReader::new(std::fs::File::open(path)?);
    let definition = match extension(path) {
        Some("yaml" | "yml") => serde_yaml::from_reader(reader)?,
        _ => serde_json::from_reader(reader)?,
    };
    Ok(definition)
}

/// Reads every `*.json`, `*.yaml` and `*.yml` definition in `dir`, sorted by
/// file name.
///
/// # Errors
///
/// Returns the first I/O or parse error encountered.
pub fn read_definition_dir(dir: impl AsRef<Path>) -> Result<Vec<SchemaDefinition>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && extension(&path).is_some_and(|ext| DEFINITION_EXTENSIONS.contains(&ext)) {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            debug!(path = %path.display(), "reading schema definition");
            read_definition(path)
        })
        .collect()
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// In-memory collection of compiled schemas with O(1) lookup by name.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use value_schema_core::{SchemaDefinition, ValidationOptions, number};
/// use value_schema_db::SchemaDatabase;
///
/// let db = SchemaDatabase::from_definitions(vec![
///     SchemaDefinition::new("port", &number().integer().into()),
/// ])
/// .unwrap();
///
/// let options = ValidationOptions::default();
/// assert_eq!(db.validate("port", &json!("8080"), &options).unwrap(), json!(8080));
/// assert!(db.validate("port", &json!(1.5), &options).is_err());
/// ```
#[derive(Debug)]
pub struct SchemaDatabase {
    schemas: HashMap<String, Schema>,
    source: DatabaseSource,
}

impl SchemaDatabase {
    /// Returns a new [`DatabaseBuilder`] for configuring a fallback chain.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Compiles `definitions` into a database.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::DuplicateDefinition`] if two definitions
    /// share a name, or [`DatabaseError::InvalidDefinition`] if one does not
    /// compile.
    pub fn from_definitions(definitions: Vec<SchemaDefinition>) -> Result<Self> {
        Self::compile(definitions, DatabaseSource::Memory)
    }

    /// Loads definitions from a directory of `*.json`, `*.yaml` and `*.yml`
    /// files.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] if the directory cannot be read,
    /// a parse error for a malformed file, or the errors of
    /// [`from_definitions`](Self::from_definitions).
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let definitions = read_definition_dir(path)?;
        Self::compile(definitions, DatabaseSource::Directory(path.to_path_buf()))
    }

    /// Loads definitions from a single [`SchemaPackage`] JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] if the file cannot be read,
    /// [`DatabaseError::JsonError`] if parsing fails,
    /// [`DatabaseError::InvalidChecksum`] if the stored bundle hash does not
    /// match the definitions, or the errors of
    /// [`from_definitions`](Self::from_definitions).
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let package: SchemaPackage = serde_json::from_reader(reader)?;

        if !verify_package(&package)? {
            return Err(DatabaseError::InvalidChecksum(format!(
                "bundle hash of {} does not match its definitions",
                path.display()
            )));
        }

        debug!(
            path = %path.display(),
            definitions = package.definition_count(),
            "loaded schema bundle"
        );
        Self::compile(package.definitions, DatabaseSource::Bundle(path.to_path_buf()))
    }

    fn compile(definitions: Vec<SchemaDefinition>, source: DatabaseSource) -> Result<Self> {
        let mut schemas = HashMap::with_capacity(definitions.len());
        let mut seen = HashSet::new();

        for definition in definitions {
            if !seen.insert(definition.name.clone()) {
                return Err(DatabaseError::DuplicateDefinition(definition.name));
            }
            let schema = definition
                .compile()
                .map_err(|source| DatabaseError::InvalidDefinition {
                    name: definition.name.clone(),
                    source,
                })?;
            schemas.insert(definition.name, schema);
        }

        debug!(source = ?source, schemas = schemas.len(), "schema database ready");
        Ok(Self { schemas, source })
    }

    /// Looks up a schema by name in O(1) time.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Inserts a schema, replacing any existing entry for the same name.
    pub fn insert(&mut self, name: String, schema: Schema) {
        self.schemas.insert(name, schema);
    }

    /// Returns `true` if the database contains a schema named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the number of schemas in the database.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if the database contains no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns an iterator over schema names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &DatabaseSource {
        &self.source
    }

    /// Validates `value` against the schema named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::UnknownSchema`] if no such schema exists, or
    /// [`DatabaseError::Validation`] with every failure found.
    pub fn validate(&self, name: &str, value: &Value, options: &ValidationOptions) -> Result<Value> {
        let schema = self
            .get(name)
            .ok_or_else(|| DatabaseError::UnknownSchema(name.to_string()))?;
        Ok(schema.validate_with(value, options)?)
    }
}

/// Builder for constructing a [`SchemaDatabase`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`DatabaseError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use value_schema_db::SchemaDatabase;
///
/// let db = SchemaDatabase::builder()
///     .from_dir("/opt/schemas/")
///     .from_bundle("/opt/schemas.json")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    sources: Vec<DatabaseSource>,
}

impl DatabaseBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of definition files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(DatabaseSource::Directory(path.into()));
        self
    }

    /// Adds a [`SchemaPackage`] bundle file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(DatabaseSource::Bundle(path.into()));
        self
    }

    /// Attempts to load schemas from configured sources in order.
    ///
    /// Returns the first successfully loaded database. If all sources fail,
    /// returns [`DatabaseError::NoSourcesAvailable`].
    pub fn build(self) -> Result<SchemaDatabase> {
        for source in &self.sources {
            let result = match source {
                DatabaseSource::Directory(path) => SchemaDatabase::from_dir(path),
                DatabaseSource::Bundle(path) => SchemaDatabase::from_bundle(path),
                DatabaseSource::Memory | DatabaseSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut db) => {
                    db.source = DatabaseSource::Multiple(self.sources.clone());
                    return Ok(db);
                }
                Err(err) => debug!(source = ?source, error = %err, "schema source failed"),
            }
        }

        Err(DatabaseError::NoSourcesAvailable)
    }
}
