//! Scalar schema kinds: any, boolean, number and string.
//!
//! These are deliberately small: a type check, optional coercion when
//! [`ValidationOptions::convert`] is set, and a handful of rules.

use regex::Regex;
use serde_json::{Number, Value};

use crate::describe::{Description, RuleDescription};
use crate::error::{ConfigurationError, ErrorCode, ValidationError, create_error};
use crate::options::ValidationOptions;
use crate::state::State;
use crate::types::{Outcome, SchemaBase, SchemaBuilder, SchemaKind};
use crate::validate::{context, finish};

/// Accepts any value, including `null`.
#[derive(Debug, Clone)]
pub struct AnySchema {
    pub(crate) base: SchemaBase,
}

impl AnySchema {
    /// Creates a schema that accepts anything.
    pub fn new() -> Self {
        let mut base = SchemaBase::new();
        base.invalids.remove(&Value::Null);
        Self { base }
    }
}

impl Default for AnySchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaKind for AnySchema {
    fn base(&self) -> &SchemaBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "any"
    }

    fn check(&self, value: Option<&Value>, _: &State<'_>, _: &ValidationOptions) -> Outcome {
        Ok(value.cloned())
    }
}

impl SchemaBuilder for AnySchema {
    fn base_mut(&mut self) -> &mut SchemaBase {
        &mut self.base
    }
}

/// Accepts JSON booleans.
#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    pub(crate) base: SchemaBase,
}

impl BooleanSchema {
    /// Creates a boolean schema.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaKind for BooleanSchema {
    fn base(&self) -> &SchemaBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn check(&self, value: Option<&Value>, state: &State<'_>, options: &ValidationOptions) -> Outcome {
        let Some(value) = value else {
            return Ok(None);
        };
        match value {
            Value::Bool(_) => Ok(Some(value.clone())),
            Value::String(text) if options.convert => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(Some(Value::Bool(true))),
                "false" => Ok(Some(Value::Bool(false))),
                _ => Err(create_error(ErrorCode::BooleanBase, None, state, self.base.label())),
            },
            _ => Err(create_error(ErrorCode::BooleanBase, None, state, self.base.label())),
        }
    }
}

impl SchemaBuilder for BooleanSchema {
    fn base_mut(&mut self) -> &mut SchemaBase {
        &mut self.base
    }
}

/// Accepts JSON numbers.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub(crate) base: SchemaBase,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) integer: bool,
}

impl NumberSchema {
    /// Creates a number schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the value to be at least `limit`.
    pub fn min(mut self, limit: f64) -> Self {
        self.min = Some(limit);
        self
    }

    /// Requires the value to be at most `limit`.
    pub fn max(mut self, limit: f64) -> Self {
        self.max = Some(limit);
        self
    }

    /// Requires the value to have no fractional part.
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    fn coerce(&self, value: &Value, options: &ValidationOptions) -> Option<Number> {
        match value {
            Value::Number(number) => Some(number.clone()),
            Value::String(text) if options.convert => {
                let text = text.trim();
                match text.parse::<i64>() {
                    Ok(int) => Some(Number::from(int)),
                    Err(_) => text.parse::<f64>().ok().and_then(Number::from_f64),
                }
            }
            _ => None,
        }
    }
}

impl SchemaKind for NumberSchema {
    fn base(&self) -> &SchemaBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "number"
    }

    fn check(&self, value: Option<&Value>, state: &State<'_>, options: &ValidationOptions) -> Outcome {
        let Some(value) = value else {
            return Ok(None);
        };
        let label = self.base.label();
        let Some(number) = self.coerce(value, options) else {
            return Err(create_error(ErrorCode::NumberBase, None, state, label));
        };
        let Some(float) = number.as_f64() else {
            return Err(create_error(ErrorCode::NumberBase, None, state, label));
        };

        let mut errors = Vec::new();
        if self.integer && float.fract() != 0.0 {
            errors.push(ValidationError::new(ErrorCode::NumberInteger, None, state, label));
        }
        if let Some(limit) = self.min.filter(|limit| float < *limit) {
            errors.push(ValidationError::new(
                ErrorCode::NumberMin,
                Some(context([("limit", limit_value(limit))])),
                state,
                label,
            ));
        }
        if let Some(limit) = self.max.filter(|limit| float > *limit) {
            errors.push(ValidationError::new(
                ErrorCode::NumberMax,
                Some(context([("limit", limit_value(limit))])),
                state,
                label,
            ));
        }

        finish(Value::Number(number), errors, options)
    }

    fn describe_kind(&self, description: &mut Description) {
        if let Some(limit) = self.min {
            description.rules.push(RuleDescription::new("min", Some(limit_value(limit))));
        }
        if let Some(limit) = self.max {
            description.rules.push(RuleDescription::new("max", Some(limit_value(limit))));
        }
        if self.integer {
            description.rules.push(RuleDescription::new("integer", None));
        }
    }
}

impl SchemaBuilder for NumberSchema {
    fn base_mut(&mut self) -> &mut SchemaBase {
        &mut self.base
    }
}

/// Renders whole limits as integers so descriptions read `5`, not `5.0`.
fn limit_value(limit: f64) -> Value {
    if limit.fract() == 0.0 && limit.abs() < i64::MAX as f64 {
        Value::from(limit as i64)
    } else {
        Number::from_f64(limit).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Compiled regular expression together with its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPattern`] if the expression does
    /// not compile.
    pub fn new(source: &str) -> Result<Self, ConfigurationError> {
        let regex = Regex::new(source).map_err(|err| ConfigurationError::InvalidPattern {
            pattern: source.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Source text of the expression.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Accepts JSON strings. The empty string is rejected unless allowed.
#[derive(Debug, Clone)]
pub struct StringSchema {
    pub(crate) base: SchemaBase,
    pub(crate) min: Option<usize>,
    pub(crate) max: Option<usize>,
    pub(crate) pattern: Option<Pattern>,
}

impl StringSchema {
    /// Creates a string schema.
    pub fn new() -> Self {
        let mut base = SchemaBase::new();
        base.invalids.insert(Value::String(String::new()));
        Self {
            base,
            min: None,
            max: None,
            pattern: None,
        }
    }

    /// Requires at least `limit` characters.
    pub fn min(mut self, limit: usize) -> Self {
        self.min = Some(limit);
        self
    }

    /// Requires at most `limit` characters.
    pub fn max(mut self, limit: usize) -> Self {
        self.max = Some(limit);
        self
    }

    /// Requires the value to match `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPattern`] if the expression does
    /// not compile.
    pub fn pattern(mut self, source: &str) -> Result<Self, ConfigurationError> {
        self.pattern = Some(Pattern::new(source)?);
        Ok(self)
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaKind for StringSchema {
    fn base(&self) -> &SchemaBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn check(&self, value: Option<&Value>, state: &State<'_>, options: &ValidationOptions) -> Outcome {
        let Some(value) = value else {
            return Ok(None);
        };
        let label = self.base.label();
        let Value::String(text) = value else {
            return Err(create_error(ErrorCode::StringBase, None, state, label));
        };

        let length = text.chars().count();
        let mut errors = Vec::new();
        if let Some(limit) = self.min.filter(|limit| length < *limit) {
            errors.push(ValidationError::new(
                ErrorCode::StringMin,
                Some(context([("limit", Value::from(limit))])),
                state,
                label,
            ));
        }
        if let Some(limit) = self.max.filter(|limit| length > *limit) {
            errors.push(ValidationError::new(
                ErrorCode::StringMax,
                Some(context([("limit", Value::from(limit))])),
                state,
                label,
            ));
        }
        if let Some(pattern) = self.pattern.as_ref().filter(|p| !p.regex.is_match(text)) {
            errors.push(ValidationError::new(
                ErrorCode::StringRegex,
                Some(context([
                    ("value", value.clone()),
                    ("pattern", Value::String(pattern.source.clone())),
                ])),
                state,
                label,
            ));
        }

        finish(value.clone(), errors, options)
    }

    fn describe_kind(&self, description: &mut Description) {
        if let Some(limit) = self.min {
            description.rules.push(RuleDescription::new("min", Some(Value::from(limit))));
        }
        if let Some(limit) = self.max {
            description.rules.push(RuleDescription::new("max", Some(Value::from(limit))));
        }
        if let Some(pattern) = &self.pattern {
            description.rules.push(RuleDescription::new(
                "pattern",
                Some(Value::String(pattern.source.clone())),
            ));
        }
    }
}

impl SchemaBuilder for StringSchema {
    fn base_mut(&mut self) -> &mut SchemaBase {
        &mut self.base
    }
}
