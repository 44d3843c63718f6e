//! The [`Schema`] union and its top-level validation entry points.

use serde_json::Value;

use crate::alternatives::Alternatives;
use crate::error::ValidationErrors;
use crate::kinds::{AnySchema, BooleanSchema, NumberSchema, StringSchema};
use crate::object::ObjectSchema;
use crate::options::ValidationOptions;
use crate::state::State;
use crate::types::{Outcome, SchemaBase, SchemaBuilder, SchemaKind};
use crate::validate;

/// A validation rule for JSON values.
///
/// Cloning is cheap: nested schemas are shared behind `Arc`, and every
/// builder returns a new value instead of mutating the receiver.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use value_schema_core::{Schema, SchemaBuilder, number};
///
/// let schema: Schema = number().min(0.0).required().into();
/// assert_eq!(schema.validate(&json!("42")).unwrap(), json!(42));
/// assert!(schema.validate(&json!(-1)).is_err());
/// ```
#[derive(Debug, Clone)]
pub enum Schema {
    Any(AnySchema),
    Boolean(BooleanSchema),
    Number(NumberSchema),
    String(StringSchema),
    Object(ObjectSchema),
    Alternatives(Alternatives),
}

impl Schema {
    pub(crate) fn kind(&self) -> &dyn SchemaKind {
        match self {
            Schema::Any(schema) => schema,
            Schema::Boolean(schema) => schema,
            Schema::Number(schema) => schema,
            Schema::String(schema) => schema,
            Schema::Object(schema) => schema,
            Schema::Alternatives(schema) => schema,
        }
    }

    /// Type name (`"any"`, `"number"`, `"alternatives"`, ...).
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// Shared state of the underlying kind.
    pub fn base(&self) -> &SchemaBase {
        self.kind().base()
    }

    /// Sibling keys this schema reads through references.
    pub fn refs(&self) -> &[String] {
        self.base().refs()
    }

    /// Returns the alternatives node, if this is one.
    pub fn as_alternatives(&self) -> Option<&Alternatives> {
        match self {
            Schema::Alternatives(alternatives) => Some(alternatives),
            _ => None,
        }
    }

    /// Validates `value` at the position described by `state`.
    ///
    /// `None` stands for an absent value. On success the returned value is
    /// the coerced one, or `None` if the value stays absent.
    pub fn validate_at(
        &self,
        value: Option<&Value>,
        state: &State<'_>,
        options: &ValidationOptions,
    ) -> Outcome {
        validate::run(self.kind(), value, state, options)
    }

    /// Validates `value` with default options.
    ///
    /// # Errors
    ///
    /// Returns every failure found (only the first with `abort_early`).
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationErrors> {
        self.validate_with(value, &ValidationOptions::default())
    }

    /// Validates `value` with `options`.
    ///
    /// # Errors
    ///
    /// Returns every failure found (only the first with `abort_early`).
    pub fn validate_with(
        &self,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationErrors> {
        self.validate_at(Some(value), &State::root(), options)
            .map(Option::unwrap_or_default)
            .map_err(ValidationErrors::from)
    }
}

impl SchemaBuilder for Schema {
    fn base_mut(&mut self) -> &mut SchemaBase {
        match self {
            Schema::Any(schema) => schema.base_mut(),
            Schema::Boolean(schema) => schema.base_mut(),
            Schema::Number(schema) => schema.base_mut(),
            Schema::String(schema) => schema.base_mut(),
            Schema::Object(schema) => schema.base_mut(),
            Schema::Alternatives(schema) => schema.base_mut(),
        }
    }
}

macro_rules! impl_from_kind {
    ($($kind:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$kind> for Schema {
                fn from(schema: $kind) -> Self {
                    Schema::$variant(schema)
                }
            }
        )*
    };
}

impl_from_kind! {
    AnySchema => Any,
    BooleanSchema => Boolean,
    NumberSchema => Number,
    StringSchema => String,
    ObjectSchema => Object,
    Alternatives => Alternatives,
}

/// Schema accepting any value.
pub fn any() -> AnySchema {
    AnySchema::new()
}

/// Schema accepting booleans.
pub fn boolean() -> BooleanSchema {
    BooleanSchema::new()
}

/// Schema accepting numbers.
pub fn number() -> NumberSchema {
    NumberSchema::new()
}

/// Schema accepting non-empty strings.
pub fn string() -> StringSchema {
    StringSchema::new()
}

/// Schema accepting objects.
pub fn object() -> ObjectSchema {
    ObjectSchema::new()
}

/// Empty alternatives node; add entries with `try_schemas` and `when`.
pub fn alternatives() -> Alternatives {
    Alternatives::new()
}
