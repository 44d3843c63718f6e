//! Schema model and validation engine for JSON values.
//!
//! This crate provides:
//!
//! - scalar kinds ([`any`], [`boolean`], [`number`], [`string`]) and
//!   [`object`] schemas with declared children;
//! - the [`Alternatives`] node, which accepts a value matching one of
//!   several candidates ([`Alternatives::try_schemas`]) or picks a branch
//!   from a referenced sibling value ([`Alternatives::when`],
//!   [`Conditional::when`]);
//! - [`Reference`] paths resolved against the parent object or the
//!   validation context;
//! - [`Schema::concat`] to compose schemas, [`Schema::describe`] and
//!   [`Schema::from_description`] to move schemas through JSON or YAML;
//! - [`SchemaPackage`], a versioned bundle of [`SchemaDefinition`]s.
//!
//! Construction problems surface as [`ConfigurationError`]. Validation
//! failures are data: [`Schema::validate`] returns the coerced value or
//! [`ValidationErrors`].
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use value_schema_core::*;
//!
//! let schema: Schema = object()
//!     .keys([
//!         ("kind", Schema::from(string().valid("file").valid("socket").required())),
//!         (
//!             "target",
//!             alternatives()
//!                 .when("kind", WhenOptions::new().is("file").then(string().required()))
//!                 .unwrap()
//!                 .when("kind", WhenOptions::new().is("socket").then(number().integer().required()))
//!                 .unwrap()
//!                 .into(),
//!         ),
//!     ])
//!     .unwrap()
//!     .into();
//!
//! assert!(schema.validate(&json!({ "kind": "file", "target": "/tmp/out" })).is_ok());
//! assert!(schema.validate(&json!({ "kind": "socket", "target": "9000" })).is_ok());
//!
//! let errors = schema
//!     .validate(&json!({ "kind": "socket", "target": "/tmp/out" }))
//!     .unwrap_err();
//! assert_eq!(errors.codes(), vec![ErrorCode::NumberBase]);
//! ```

mod alternatives;
mod cast;
mod compile;
mod dependency;
mod describe;
mod error;
mod kinds;
mod merge;
mod object;
mod options;
mod package;
mod reference;
mod schema;
mod state;
mod types;
mod validate;

/// Version of the description format written into packages.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

pub use alternatives::{Alternatives, Condition, Conditional, Match, WhenOptions};
pub use cast::{IntoReference, SchemaLike, to_ref, to_schema};
pub use dependency::DependencyGraph;
pub use describe::{
    AlternativeDescription, Description, DescriptionFlags, RuleDescription, WhenDescription,
};
pub use error::{ConfigurationError, ErrorCode, ValidationError, ValidationErrors};
pub use kinds::{AnySchema, BooleanSchema, NumberSchema, Pattern, StringSchema};
pub use object::{ObjectChild, ObjectSchema};
pub use options::{Presence, ValidationOptions};
pub use package::{SchemaDefinition, SchemaPackage};
pub use reference::{Reference, push_ref};
pub use schema::{Schema, alternatives, any, boolean, number, object, string};
pub use state::State;
pub use types::{Outcome, SchemaBase, SchemaBuilder, SchemaKind, ValueSet};
