//! Conversion of literals and partially-built values into schemas.
//!
//! Builders that take "something schema-like" accept [`SchemaLike`], so
//! callers can pass a built schema, a JSON literal, or a list of either.

use serde_json::Value;

use crate::alternatives::Alternatives;
use crate::error::ConfigurationError;
use crate::kinds::{AnySchema, BooleanSchema, NumberSchema, StringSchema};
use crate::object::ObjectSchema;
use crate::reference::Reference;
use crate::schema::{Schema, alternatives, any, boolean, number, object, string};
use crate::types::SchemaBuilder;

/// A schema, a literal, or a list of schema-like values.
#[derive(Debug, Clone)]
pub enum SchemaLike {
    Schema(Schema),
    Literal(Value),
    Many(Vec<SchemaLike>),
}

impl SchemaLike {
    /// Returns `true` for an already-built schema.
    pub fn is_schema(&self) -> bool {
        matches!(self, SchemaLike::Schema(_))
    }
}

impl From<Schema> for SchemaLike {
    fn from(schema: Schema) -> Self {
        SchemaLike::Schema(schema)
    }
}

macro_rules! impl_from_schema {
    ($($kind:ty),* $(,)?) => {
        $(
            impl From<$kind> for SchemaLike {
                fn from(schema: $kind) -> Self {
                    SchemaLike::Schema(schema.into())
                }
            }
        )*
    };
}

impl_from_schema!(
    AnySchema,
    BooleanSchema,
    NumberSchema,
    StringSchema,
    ObjectSchema,
    Alternatives,
);

macro_rules! impl_from_literal {
    ($($literal:ty),* $(,)?) => {
        $(
            impl From<$literal> for SchemaLike {
                fn from(literal: $literal) -> Self {
                    SchemaLike::Literal(literal.into())
                }
            }
        )*
    };
}

impl_from_literal!(Value, &str, String, bool, i32, i64, u64, f64);

impl<T: Into<SchemaLike>> From<Vec<T>> for SchemaLike {
    fn from(items: Vec<T>) -> Self {
        SchemaLike::Many(items.into_iter().map(Into::into).collect())
    }
}

/// Converts `like` into a schema.
///
/// Literals become an allow-only schema of the matching kind, arrays become
/// an alternatives node trying each item, and objects become an object
/// schema whose keys are cast recursively.
///
/// # Errors
///
/// Returns a [`ConfigurationError`] for an empty list or when a nested cast
/// fails.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use value_schema_core::{SchemaLike, to_schema};
///
/// let schema = to_schema(SchemaLike::from("on")).unwrap();
/// assert_eq!(schema.type_name(), "string");
/// assert!(schema.validate(&json!("on")).is_ok());
/// assert!(schema.validate(&json!("off")).is_err());
/// ```
pub fn to_schema(like: SchemaLike) -> Result<Schema, ConfigurationError> {
    match like {
        SchemaLike::Schema(schema) => Ok(schema),
        SchemaLike::Many(items) => Ok(alternatives().try_schemas(items)?.into()),
        SchemaLike::Literal(value) => literal_schema(value),
    }
}

fn literal_schema(value: Value) -> Result<Schema, ConfigurationError> {
    let schema = match value {
        Value::Null => any().valid(Value::Null).into(),
        Value::Bool(_) => boolean().valid(value).into(),
        Value::Number(_) => number().valid(value).into(),
        Value::String(_) => string().valid(value).into(),
        Value::Array(items) => alternatives()
            .try_schemas(items.into_iter().map(SchemaLike::Literal))?
            .into(),
        Value::Object(entries) => object()
            .keys(entries.into_iter().map(|(key, value)| (key, SchemaLike::Literal(value))))?
            .into(),
    };
    Ok(schema)
}

/// Conversion into a [`Reference`].
pub trait IntoReference {
    /// Converts `self` into a reference.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidReference`] if the path does not
    /// parse.
    fn into_reference(self) -> Result<Reference, ConfigurationError>;
}

impl IntoReference for Reference {
    fn into_reference(self) -> Result<Reference, ConfigurationError> {
        Ok(self)
    }
}

impl IntoReference for &Reference {
    fn into_reference(self) -> Result<Reference, ConfigurationError> {
        Ok(self.clone())
    }
}

impl IntoReference for &str {
    fn into_reference(self) -> Result<Reference, ConfigurationError> {
        Reference::parse(self)
    }
}

impl IntoReference for String {
    fn into_reference(self) -> Result<Reference, ConfigurationError> {
        Reference::parse(&self)
    }
}

impl IntoReference for &String {
    fn into_reference(self) -> Result<Reference, ConfigurationError> {
        Reference::parse(self)
    }
}

/// Converts `reference` into a [`Reference`].
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidReference`] if the path does not
/// parse.
pub fn to_ref(reference: impl IntoReference) -> Result<Reference, ConfigurationError> {
    reference.into_reference()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_schema_passes_through() {
        let schema = to_schema(number().min(3.0).into()).unwrap();
        assert_eq!(schema.type_name(), "number");
        assert!(schema.validate(&json!(2)).is_err());
    }

    #[test]
    fn test_null_literal_accepts_only_null() {
        let schema = to_schema(SchemaLike::Literal(Value::Null)).unwrap();
        assert_eq!(schema.type_name(), "any");
        assert!(schema.validate(&Value::Null).is_ok());
        assert!(schema.validate(&json!(0)).is_err());
    }

    #[test]
    fn test_number_literal_is_allow_only() {
        let schema = to_schema(5.into()).unwrap();
        assert!(schema.base().allow_only());
        assert_eq!(schema.validate(&json!(5)).unwrap(), json!(5));
        assert!(schema.validate(&json!(6)).is_err());
    }

    #[test]
    fn test_list_becomes_alternatives() {
        let schema = to_schema(vec![SchemaLike::from(1), SchemaLike::from("one")].into()).unwrap();
        let alternatives = schema.as_alternatives().unwrap();
        assert_eq!(alternatives.matches().len(), 2);
        assert!(schema.validate(&json!("one")).is_ok());
        assert!(schema.validate(&json!(2)).is_err());
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let empty: Vec<SchemaLike> = Vec::new();
        assert_eq!(
            to_schema(empty.into()).unwrap_err(),
            ConfigurationError::NoAlternatives
        );
    }

    #[test]
    fn test_object_literal_casts_keys() {
        let schema = to_schema(json!({ "mode": "fast" }).into()).unwrap();
        assert_eq!(schema.type_name(), "object");
        assert!(schema.validate(&json!({ "mode": "fast" })).is_ok());
        assert!(schema.validate(&json!({ "mode": "slow" })).is_err());
    }

    #[test]
    fn test_reference_conversions() {
        assert_eq!(to_ref("a.b").unwrap().key(), "a.b");
        assert!(to_ref(String::from("$tenant")).unwrap().is_context());
        assert!(matches!(to_ref(""), Err(ConfigurationError::InvalidReference(_))));
    }
}
