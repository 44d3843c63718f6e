//! Validation-wide options.
//!
//! Options are plain serde data so that a validator configuration file can
//! carry them verbatim. Every field has a default, so a partial document
//! (or an empty one) deserializes.
//!
//! ```
//! use value_schema_core::{Presence, ValidationOptions};
//!
//! let options: ValidationOptions =
//!     serde_json::from_str(r#"{ "abort_early": false }"#).unwrap();
//! assert!(!options.abort_early);
//! assert!(options.convert);
//! assert_eq!(options.presence, Presence::Optional);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether a value must, may, or must not be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Absent values pass without further checks (the default).
    #[default]
    Optional,
    /// Absent values fail with `any.required`.
    Required,
    /// Present values fail with `any.unknown`.
    Forbidden,
    /// Absent values are handed to the schema's own check.
    Ignore,
}

/// Options applied to a whole validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Stop at the first failure instead of collecting all of them.
    pub abort_early: bool,
    /// Coerce values into the schema's type where possible (`"5"` → `5`).
    pub convert: bool,
    /// Accept object keys that have no schema.
    pub allow_unknown: bool,
    /// Remove object keys that have no schema.
    pub strip_unknown: bool,
    /// Presence applied to schemas that do not set their own.
    pub presence: Presence,
    /// Values reachable through `$`-prefixed references.
    pub context: Map<String, Value>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            abort_early: true,
            convert: true,
            allow_unknown: false,
            strip_unknown: false,
            presence: Presence::Optional,
            context: Map::new(),
        }
    }
}

impl ValidationOptions {
    /// Adds a context value reachable as `$name`.
    pub fn with_context(mut self, name: impl Into<String>, value: Value) -> Self {
        self.context.insert(name.into(), value);
        self
    }
}
