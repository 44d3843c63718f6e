//! Named schema database, definition bundles and validator configuration.
//!
//! This crate loads schema definitions (serialized
//! [`Description`](value_schema_core::Description)s) from directories of
//! JSON/YAML files or from hashed [`SchemaPackage`](value_schema_core::SchemaPackage)
//! bundles, compiles them, and validates values by schema name.
//!
//! # Quick start
//!
//! ```no_run
//! use serde_json::json;
//! use value_schema_db::{SchemaDatabase, ValidatorConfig};
//!
//! // Load schemas from a directory
//! let db = SchemaDatabase::from_dir("schemas/").unwrap();
//! if let Some(schema) = db.get("service") {
//!     println!("service is a {} schema", schema.type_name());
//! }
//!
//! // Load sources and options from a configuration file
//! let config = ValidatorConfig::load("validator.yml").unwrap();
//! let db = config.database_builder().build().unwrap();
//! let value = db.validate("service", &json!({ "port": 8080 }), &config.options);
//! ```

mod bundle;
mod config;
mod error;
mod loader;

pub use bundle::{bundle_hash, seal_package, verify_package};
pub use config::{SourcesConfig, ValidatorConfig};
pub use error::{DatabaseError, Result};
pub use loader::{
    DatabaseBuilder, DatabaseSource, SchemaDatabase, read_definition, read_definition_dir,
};
