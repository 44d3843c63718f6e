//! Error types for schema construction and value validation.
//!
//! Two categories are kept strictly apart:
//!
//! - [`ConfigurationError`] is returned while *building* a schema (a missing
//!   `is` directive, an empty `try`, a malformed reference). It is a
//!   programmer error and aborts construction.
//! - [`ValidationError`] describes one failure found while *validating* a
//!   value. Failures are returned as data, never raised, and aggregate into
//!   [`ValidationErrors`] at the top-level entry points.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::state::State;

/// Construction-time errors raised by schema builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// `try` was called without any candidate schema.
    #[error("cannot add alternatives without at least one schema")]
    NoAlternatives,
    /// A reference path is empty or has an empty segment.
    #[error("invalid reference: {0:?}")]
    InvalidReference(String),
    /// `when` options are missing the `is` condition.
    #[error("missing \"is\" directive")]
    MissingIs,
    /// `when` options define neither `then` nor `otherwise`.
    #[error("options must have at least one of \"then\" or \"otherwise\"")]
    MissingOutcome,
    /// The alternatives node already carries a base type.
    #[error("alternatives already have a base type")]
    BaseTypeAlreadySet,
    /// Two schemas of different types cannot be merged.
    #[error("cannot merge {overlay} schema into {base} schema")]
    IncompatibleConcat { base: String, overlay: String },
    /// Object keys reference each other in a cycle.
    #[error("object keys have cyclic dependencies: {keys}")]
    DependencyCycle { keys: String },
    /// A string pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    /// A description names a schema type this crate does not know.
    #[error("unknown schema type: {0}")]
    UnknownType(String),
    /// A description names a rule the schema type does not support.
    #[error("unknown rule {rule:?} for {kind} schema")]
    UnknownRule { kind: String, rule: String },
    /// A rule argument has the wrong shape.
    #[error("invalid argument for rule {rule:?}: {arg}")]
    InvalidRuleArgument { rule: String, arg: String },
}

/// Stable identifier of a validation failure.
///
/// Serialized in dotted form (`"alternatives.base"`, `"any.required"`), which
/// is also what [`Display`](fmt::Display) prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "any.required")]
    AnyRequired,
    #[serde(rename = "any.unknown")]
    AnyUnknown,
    #[serde(rename = "any.invalid")]
    AnyInvalid,
    #[serde(rename = "any.empty")]
    AnyEmpty,
    #[serde(rename = "any.allowOnly")]
    AnyAllowOnly,
    #[serde(rename = "boolean.base")]
    BooleanBase,
    #[serde(rename = "number.base")]
    NumberBase,
    #[serde(rename = "number.min")]
    NumberMin,
    #[serde(rename = "number.max")]
    NumberMax,
    #[serde(rename = "number.integer")]
    NumberInteger,
    #[serde(rename = "string.base")]
    StringBase,
    #[serde(rename = "string.min")]
    StringMin,
    #[serde(rename = "string.max")]
    StringMax,
    #[serde(rename = "string.regex")]
    StringRegex,
    #[serde(rename = "object.base")]
    ObjectBase,
    #[serde(rename = "object.allowUnknown")]
    ObjectAllowUnknown,
    #[serde(rename = "alternatives.base")]
    AlternativesBase,
}

impl ErrorCode {
    /// Returns the dotted code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnyRequired => "any.required",
            Self::AnyUnknown => "any.unknown",
            Self::AnyInvalid => "any.invalid",
            Self::AnyEmpty => "any.empty",
            Self::AnyAllowOnly => "any.allowOnly",
            Self::BooleanBase => "boolean.base",
            Self::NumberBase => "number.base",
            Self::NumberMin => "number.min",
            Self::NumberMax => "number.max",
            Self::NumberInteger => "number.integer",
            Self::StringBase => "string.base",
            Self::StringMin => "string.min",
            Self::StringMax => "string.max",
            Self::StringRegex => "string.regex",
            Self::ObjectBase => "object.base",
            Self::ObjectAllowUnknown => "object.allowUnknown",
            Self::AlternativesBase => "alternatives.base",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Self::AnyRequired => "\"{label}\" is required",
            Self::AnyUnknown => "\"{label}\" is not allowed",
            Self::AnyInvalid => "\"{label}\" contains an invalid value",
            Self::AnyEmpty => "\"{label}\" is not allowed to be empty",
            Self::AnyAllowOnly => "\"{label}\" must be one of {valids}",
            Self::BooleanBase => "\"{label}\" must be a boolean",
            Self::NumberBase => "\"{label}\" must be a number",
            Self::NumberMin => "\"{label}\" must be larger than or equal to {limit}",
            Self::NumberMax => "\"{label}\" must be less than or equal to {limit}",
            Self::NumberInteger => "\"{label}\" must be an integer",
            Self::StringBase => "\"{label}\" must be a string",
            Self::StringMin => "\"{label}\" length must be at least {limit} characters long",
            Self::StringMax => {
                "\"{label}\" length must be less than or equal to {limit} characters long"
            }
            Self::StringRegex => {
                "\"{label}\" with value \"{value}\" fails to match the required pattern: {pattern}"
            }
            Self::ObjectBase => "\"{label}\" must be an object",
            Self::ObjectAllowUnknown => "\"{label}\" is not allowed",
            Self::AlternativesBase => "\"{label}\" not matching any of the allowed alternatives",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure with structured context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Failure identifier.
    pub code: ErrorCode,
    /// Key path from the validated root to the failing value.
    pub path: Vec<String>,
    /// Schema label, else the key under validation, else `"value"`.
    pub label: String,
    /// Template parameters (limits, offending values, allowed values).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
    /// Rendered human-readable message.
    pub message: String,
}

impl ValidationError {
    /// Builds a failure for `code` at the position described by `state`.
    pub fn new(
        code: ErrorCode,
        context: Option<Map<String, Value>>,
        state: &State<'_>,
        label: Option<&str>,
    ) -> Self {
        let label = label
            .or(state.key.as_deref())
            .unwrap_or("value")
            .to_string();
        let context = context.unwrap_or_default();
        let message = render(code.template(), &label, &context);
        Self {
            code,
            path: state.path.clone(),
            label,
            context,
            message,
        }
    }

    /// Returns the path joined with `.` (empty for the root).
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

/// Produces the standard single-failure error list for `code`.
pub(crate) fn create_error(
    code: ErrorCode,
    context: Option<Map<String, Value>>,
    state: &State<'_>,
    label: Option<&str>,
) -> Vec<ValidationError> {
    vec![ValidationError::new(code, context, state, label)]
}

fn render(template: &str, label: &str, context: &Map<String, Value>) -> String {
    let mut message = template.replace("{label}", label);
    for (name, value) in context {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        message = message.replace(&format!("{{{name}}}"), &rendered);
    }
    message
}

/// Aggregate of every failure produced by one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Returns the number of failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if there are no failures.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a slice of all failures.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Returns the failure codes in order.
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if error.path.is_empty() {
                write!(f, "  (root): {}", error.message)?;
            } else {
                write!(f, "  {}: {}", error.path_string(), error.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_code_serializes_dotted() {
        let encoded = serde_json::to_value(ErrorCode::AlternativesBase).unwrap();
        assert_eq!(encoded, json!("alternatives.base"));
        assert_eq!(ErrorCode::AnyAllowOnly.to_string(), "any.allowOnly");
    }

    #[test]
    fn test_message_uses_key_when_unlabelled() {
        let state = State::root().child("age", None);
        let error = ValidationError::new(ErrorCode::AnyRequired, None, &state, None);
        assert_eq!(error.label, "age");
        assert_eq!(error.message, "\"age\" is required");
        assert_eq!(error.path, vec!["age".to_string()]);
    }

    #[test]
    fn test_message_renders_context() {
        let mut context = Map::new();
        context.insert("limit".into(), json!(3));
        let error = ValidationError::new(
            ErrorCode::NumberMin,
            Some(context),
            &State::root(),
            Some("count"),
        );
        assert_eq!(error.message, "\"count\" must be larger than or equal to 3");
    }

    #[test]
    fn test_errors_display_lists_paths() {
        let state = State::root().child("a", None);
        let errors = ValidationErrors::from(vec![
            ValidationError::new(ErrorCode::NumberBase, None, &state, None),
            ValidationError::new(ErrorCode::AlternativesBase, None, &State::root(), None),
        ]);
        let rendered = errors.to_string();
        assert!(rendered.contains("  a: \"a\" must be a number"));
        assert!(rendered.contains("  (root): \"value\" not matching"));
    }
}
