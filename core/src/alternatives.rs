//! The alternatives node: first-match-wins candidates and conditional
//! branches driven by a referenced value.
//!
//! An [`Alternatives`] node holds an ordered list of [`Match`] entries.
//! Validation walks them in order:
//!
//! - a [`Match::Try`] entry validates the value directly; success returns
//!   immediately, failure adds its errors to the accumulated list;
//! - a [`Match::When`] entry resolves its reference against the parent
//!   object, tests the referenced value against `is`, and validates the
//!   value against `then`, `otherwise` or the node's base type.
//!
//! When no entry decides, the accumulated errors are returned, or a single
//! `alternatives.base` error if nothing was accumulated.
//!
//! Builders never mutate the receiver: [`Alternatives::try_schemas`] and
//! [`Alternatives::when`] return a new node.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use value_schema_core::{Schema, WhenOptions, alternatives, object, number, string};
//!
//! let limit = alternatives()
//!     .when("unit", WhenOptions::new().is("ms").then(number().min(100.0)).otherwise(number()))
//!     .unwrap();
//! let schema: Schema = object()
//!     .keys([("unit", Schema::from(string())), ("limit", limit.into())])
//!     .unwrap()
//!     .into();
//!
//! assert!(schema.validate(&json!({ "unit": "ms", "limit": 250 })).is_ok());
//! assert!(schema.validate(&json!({ "unit": "ms", "limit": 5 })).is_err());
//! assert!(schema.validate(&json!({ "unit": "s", "limit": 5 })).is_ok());
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::cast::{IntoReference, SchemaLike, to_schema};
use crate::describe::{AlternativeDescription, Description, WhenDescription};
use crate::error::{ConfigurationError, ErrorCode, create_error};
use crate::kinds::{AnySchema, BooleanSchema, NumberSchema, StringSchema};
use crate::object::ObjectSchema;
use crate::options::{Presence, ValidationOptions};
use crate::reference::{Reference, push_ref};
use crate::schema::Schema;
use crate::state::State;
use crate::types::{Outcome, SchemaBase, SchemaBuilder, SchemaKind};

/// One entry of an alternatives node.
#[derive(Debug, Clone)]
pub enum Match {
    /// Unconditional candidate.
    Try(Arc<Schema>),
    /// Branch selected by a referenced value.
    When(Condition),
}

/// A conditional entry: `reference` is tested against `is` to pick `then`
/// or `otherwise`.
#[derive(Debug, Clone)]
pub struct Condition {
    pub(crate) reference: Reference,
    pub(crate) is: Arc<Schema>,
    pub(crate) then: Option<Arc<Schema>>,
    pub(crate) otherwise: Option<Arc<Schema>>,
}

impl Condition {
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn is(&self) -> &Schema {
        &self.is
    }

    pub fn then(&self) -> Option<&Schema> {
        self.then.as_deref()
    }

    pub fn otherwise(&self) -> Option<&Schema> {
        self.otherwise.as_deref()
    }
}

/// Options for [`Alternatives::when`].
///
/// `is` is mandatory and at least one of `then` / `otherwise` must be set.
/// A literal `is` (anything but a built schema) is made required, so a
/// missing referenced value never matches it.
#[derive(Debug, Clone, Default)]
pub struct WhenOptions {
    pub is: Option<SchemaLike>,
    pub then: Option<SchemaLike>,
    pub otherwise: Option<SchemaLike>,
}

impl WhenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Condition the referenced value must satisfy.
    pub fn is(mut self, is: impl Into<SchemaLike>) -> Self {
        self.is = Some(is.into());
        self
    }

    /// Schema applied when the condition holds.
    pub fn then(mut self, then: impl Into<SchemaLike>) -> Self {
        self.then = Some(then.into());
        self
    }

    /// Schema applied when the condition does not hold.
    pub fn otherwise(mut self, otherwise: impl Into<SchemaLike>) -> Self {
        self.otherwise = Some(otherwise.into());
        self
    }
}

/// Schema that accepts a value matching one of several candidates.
#[derive(Debug, Clone)]
pub struct Alternatives {
    pub(crate) base: SchemaBase,
    pub(crate) matches: Vec<Match>,
    pub(crate) base_type: Option<Arc<Schema>>,
}

impl Alternatives {
    /// Creates an empty node. `null` is not rejected up front; candidates
    /// decide.
    pub fn new() -> Self {
        let mut base = SchemaBase::new();
        base.invalids.remove(&Value::Null);
        Self {
            base,
            matches: Vec::new(),
            base_type: None,
        }
    }

    /// Match entries in evaluation order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Fallback schema for conditional entries.
    pub fn base_type(&self) -> Option<&Schema> {
        self.base_type.as_deref()
    }

    /// Returns a copy of this node with `schema` as its base type.
    ///
    /// Conditional entries added afterwards have their `then` and
    /// `otherwise` schemas composed with the base type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::BaseTypeAlreadySet`] if the node
    /// already has a base type.
    pub fn with_base_type(&self, schema: impl Into<Schema>) -> Result<Self, ConfigurationError> {
        if self.base_type.is_some() {
            return Err(ConfigurationError::BaseTypeAlreadySet);
        }
        let schema = schema.into();
        let mut next = self.clone();
        next.base.refs.extend_from_slice(schema.refs());
        next.base_type = Some(Arc::new(schema));
        Ok(next)
    }

    /// Returns a copy of this node with one candidate appended per item.
    ///
    /// Items are cast to schemas; nested lists are flattened first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoAlternatives`] when `schemas` is
    /// empty, or the error of a failing cast.
    pub fn try_schemas<I, S>(&self, schemas: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SchemaLike>,
    {
        let mut flat = Vec::new();
        for item in schemas {
            flatten(item.into(), &mut flat);
        }
        if flat.is_empty() {
            return Err(ConfigurationError::NoAlternatives);
        }

        let mut next = self.clone();
        for like in flat {
            next.push_try(to_schema(like)?);
        }
        Ok(next)
    }

    /// Returns a copy of this node with a conditional entry appended.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the reference does not parse,
    /// `is` is missing, both `then` and `otherwise` are missing, or a
    /// branch cannot be composed with the base type.
    pub fn when(
        &self,
        reference: impl IntoReference,
        options: WhenOptions,
    ) -> Result<Self, ConfigurationError> {
        let reference = reference.into_reference()?;
        let WhenOptions {
            is,
            then,
            otherwise,
        } = options;
        let is = is.ok_or(ConfigurationError::MissingIs)?;
        if then.is_none() && otherwise.is_none() {
            return Err(ConfigurationError::MissingOutcome);
        }

        let literal = !is.is_schema();
        let mut is = to_schema(is)?;
        if literal {
            is = is.required();
        }

        let mut then = then.map(to_schema).transpose()?;
        let mut otherwise = otherwise.map(to_schema).transpose()?;
        if let Some(base_type) = &self.base_type {
            then = then.map(|schema| base_type.concat(&schema)).transpose()?;
            otherwise = otherwise.map(|schema| base_type.concat(&schema)).transpose()?;
        }

        let mut next = self.clone();
        next.push_condition(Condition {
            reference,
            is: Arc::new(is),
            then: then.map(Arc::new),
            otherwise: otherwise.map(Arc::new),
        });
        Ok(next)
    }

    pub(crate) fn push_try(&mut self, schema: Schema) {
        self.base.refs.extend_from_slice(schema.refs());
        self.matches.push(Match::Try(Arc::new(schema)));
    }

    pub(crate) fn push_condition(&mut self, condition: Condition) {
        push_ref(&mut self.base.refs, &condition.reference);
        self.base.refs.extend_from_slice(condition.is.refs());
        for branch in [&condition.then, &condition.otherwise].into_iter().flatten() {
            self.base.refs.extend_from_slice(branch.refs());
        }
        self.matches.push(Match::When(condition));
    }
}

impl Default for Alternatives {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten(like: SchemaLike, out: &mut Vec<SchemaLike>) {
    match like {
        SchemaLike::Many(items) => items.into_iter().for_each(|item| flatten(item, out)),
        SchemaLike::Literal(Value::Array(items)) => items
            .into_iter()
            .for_each(|item| flatten(SchemaLike::Literal(item), out)),
        other => out.push(other),
    }
}

impl SchemaKind for Alternatives {
    fn base(&self) -> &SchemaBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "alternatives"
    }

    fn check(&self, value: Option<&Value>, state: &State<'_>, options: &ValidationOptions) -> Outcome {
        let mut errors = Vec::new();
        let last = self.matches.len().saturating_sub(1);

        for (index, entry) in self.matches.iter().enumerate() {
            match entry {
                Match::Try(schema) => match schema.validate_at(value, state, options) {
                    Ok(result) => {
                        trace!(index, path = %state.path_string(), "candidate matched");
                        return Ok(result);
                    }
                    Err(mut failed) => errors.append(&mut failed),
                },
                Match::When(condition) => {
                    let referenced = condition.reference.resolve(state.parent, options);
                    let detached = State::detached(state.parent);
                    let matched = condition.is.validate_at(referenced, &detached, options).is_ok();
                    debug!(
                        index,
                        reference = %condition.reference,
                        matched,
                        path = %state.path_string(),
                        "evaluated conditional alternative"
                    );

                    if matched {
                        if let Some(target) = condition.then().or(self.base_type()) {
                            return target.validate_at(value, state, options);
                        }
                    } else if let Some(otherwise) = condition.otherwise() {
                        return otherwise.validate_at(value, state, options);
                    } else if index == last {
                        if let Some(base_type) = self.base_type() {
                            return base_type.validate_at(value, state, options);
                        }
                    }
                }
            }
        }

        if errors.is_empty() {
            trace!(path = %state.path_string(), "no alternative decided");
            return Err(create_error(ErrorCode::AlternativesBase, None, state, self.base.label()));
        }
        trace!(
            path = %state.path_string(),
            failures = errors.len(),
            "all candidates rejected the value"
        );
        Err(errors)
    }

    fn describe_kind(&self, description: &mut Description) {
        let entries = self
            .matches
            .iter()
            .map(|entry| match entry {
                Match::Try(schema) => AlternativeDescription::Schema(Box::new(schema.describe())),
                Match::When(condition) => AlternativeDescription::When(WhenDescription {
                    reference: condition.reference.to_string(),
                    is: Box::new(condition.is.describe()),
                    then: condition.then().map(|schema| Box::new(schema.describe())),
                    otherwise: condition.otherwise().map(|schema| Box::new(schema.describe())),
                }),
            })
            .collect();
        description.alternatives = Some(entries);
        description.base_type = self.base_type().map(|schema| Box::new(schema.describe()));
    }
}

impl SchemaBuilder for Alternatives {
    fn base_mut(&mut self) -> &mut SchemaBase {
        &mut self.base
    }
}

/// Conditional entry point on typed schemas.
///
/// `schema.when(reference, options)` builds an alternatives node whose base
/// type is `schema`. The node ignores presence so that an absent value still
/// reaches the condition.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use value_schema_core::{Conditional, Schema, WhenOptions, boolean, number, object};
///
/// let port = number()
///     .when("tls", WhenOptions::new().is(true).then(number().min(1024.0)))
///     .unwrap();
/// let schema: Schema = object()
///     .keys([("tls", Schema::from(boolean())), ("port", port.into())])
///     .unwrap()
///     .into();
///
/// assert!(schema.validate(&json!({ "tls": true, "port": 80 })).is_err());
/// assert!(schema.validate(&json!({ "tls": false, "port": 80 })).is_ok());
/// ```
pub trait Conditional: Into<Schema> + Sized {
    /// Builds an alternatives node with `self` as base type and one
    /// conditional entry.
    ///
    /// # Errors
    ///
    /// Same as [`Alternatives::when`].
    fn when(
        self,
        reference: impl IntoReference,
        options: WhenOptions,
    ) -> Result<Alternatives, ConfigurationError> {
        Alternatives::new()
            .with_base_type(self)?
            .presence(Presence::Ignore)
            .when(reference, options)
    }
}

impl Conditional for AnySchema {}
impl Conditional for BooleanSchema {}
impl Conditional for NumberSchema {}
impl Conditional for StringSchema {}
impl Conditional for ObjectSchema {}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::{ValidationError, any, boolean, number, string};

    fn parent(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn run(node: &Alternatives, value: Option<Value>, siblings: &Map<String, Value>) -> Outcome {
        let schema = Schema::from(node.clone());
        let state = State::child(&State::root(), "b", Some(siblings));
        schema.validate_at(value.as_ref(), &state, &ValidationOptions::default())
    }

    fn codes(errors: &[ValidationError]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_try_requires_a_schema() {
        let none: Vec<Schema> = Vec::new();
        assert_eq!(
            Alternatives::new().try_schemas(none).unwrap_err(),
            ConfigurationError::NoAlternatives
        );
    }

    #[test]
    fn test_when_rejects_missing_options() {
        let node = Alternatives::new();
        assert_eq!(
            node.when("a", WhenOptions::new()).unwrap_err(),
            ConfigurationError::MissingIs
        );
        assert_eq!(
            node.when("a", WhenOptions::new().is(5)).unwrap_err(),
            ConfigurationError::MissingOutcome
        );
        assert!(matches!(
            node.when("a..b", WhenOptions::new().is(5).then(any())),
            Err(ConfigurationError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_builders_leave_receiver_untouched() {
        let node = Alternatives::new().try_schemas([number()]).unwrap();
        let before = Schema::from(node.clone()).describe();
        let extended = node.try_schemas([string()]).unwrap();
        let conditioned = node
            .when("a", WhenOptions::new().is(true).then(string()))
            .unwrap();

        assert_eq!(Schema::from(node.clone()).describe(), before);
        assert_eq!(node.matches().len(), 1);
        assert_eq!(extended.matches().len(), 2);
        assert_eq!(conditioned.matches().len(), 2);
    }

    #[test]
    fn test_try_returns_first_success() {
        let node = Alternatives::new()
            .try_schemas([Schema::from(boolean()), number().into(), string().into()])
            .unwrap();
        let siblings = Map::new();
        assert_eq!(run(&node, Some(json!("12")), &siblings), Ok(Some(json!(12))));
    }

    #[test]
    fn test_try_exhaustion_concatenates_errors() {
        let node = Alternatives::new()
            .try_schemas([Schema::from(boolean()), number().into()])
            .unwrap();
        let errors = run(&node, Some(json!({})), &Map::new()).unwrap_err();
        assert_eq!(codes(&errors), vec![ErrorCode::BooleanBase, ErrorCode::NumberBase]);
    }

    #[test]
    fn test_when_selects_branch_from_sibling() {
        let node = Alternatives::new()
            .when(
                "a",
                WhenOptions::new().is(number()).then(string()).otherwise(boolean()),
            )
            .unwrap();

        let numeric = parent(json!({ "a": 5 }));
        assert_eq!(run(&node, Some(json!("x")), &numeric), Ok(Some(json!("x"))));
        assert_eq!(
            codes(&run(&node, Some(json!(true)), &numeric).unwrap_err()),
            vec![ErrorCode::StringBase]
        );

        let text = parent(json!({ "a": "text" }));
        assert_eq!(run(&node, Some(json!(true)), &text), Ok(Some(json!(true))));
        assert_eq!(
            codes(&run(&node, Some(json!("x")), &text).unwrap_err()),
            vec![ErrorCode::BooleanBase]
        );
    }

    #[test]
    fn test_literal_is_requires_referenced_value() {
        let node = Alternatives::new()
            .when("a", WhenOptions::new().is(1).then(number()).otherwise(string()))
            .unwrap();
        let Match::When(condition) = &node.matches()[0] else {
            panic!("expected a conditional entry");
        };
        assert_eq!(condition.is().base().presence(), Some(Presence::Required));
        assert!(run(&node, Some(json!("x")), &Map::new()).is_ok());
    }

    #[test]
    fn test_last_entry_falls_back_to_base_type() {
        let node = Alternatives::new()
            .with_base_type(number())
            .unwrap()
            .when("a", WhenOptions::new().is(true).then(number().min(10.0)))
            .unwrap();
        let off = parent(json!({ "a": false }));
        assert_eq!(run(&node, Some(json!(3)), &off), Ok(Some(json!(3))));
        assert_eq!(
            codes(&run(&node, Some(json!("x")), &off).unwrap_err()),
            vec![ErrorCode::NumberBase]
        );

        let on = parent(json!({ "a": true }));
        assert_eq!(
            codes(&run(&node, Some(json!(3)), &on).unwrap_err()),
            vec![ErrorCode::NumberMin]
        );
    }

    #[test]
    fn test_trailing_try_prevents_base_fallback() {
        let node = Alternatives::new()
            .with_base_type(number())
            .unwrap()
            .when("a", WhenOptions::new().is(true).then(number().min(10.0)))
            .unwrap()
            .try_schemas([string()])
            .unwrap();
        let off = parent(json!({ "a": false }));
        assert_eq!(
            codes(&run(&node, Some(json!(3)), &off).unwrap_err()),
            vec![ErrorCode::StringBase]
        );
    }

    #[test]
    fn test_condition_without_consequence_falls_through() {
        let mut node = Alternatives::new();
        node.push_condition(Condition {
            reference: Reference::parse("a").unwrap(),
            is: Arc::new(any().into()),
            then: None,
            otherwise: Some(Arc::new(string().into())),
        });
        let node = node.try_schemas([number()]).unwrap();
        let siblings = parent(json!({ "a": 1 }));
        assert_eq!(run(&node, Some(json!(4)), &siblings), Ok(Some(json!(4))));
    }

    #[test]
    fn test_no_decision_reports_alternatives_base() {
        let node = Alternatives::new()
            .when("a", WhenOptions::new().is(true).then(string()))
            .unwrap();
        let errors = run(&node, Some(json!("x")), &parent(json!({ "a": false }))).unwrap_err();
        assert_eq!(codes(&errors), vec![ErrorCode::AlternativesBase]);
        assert_eq!(errors[0].path, vec!["b".to_string()]);
    }

    #[test]
    fn test_base_type_set_once() {
        let node = Alternatives::new().with_base_type(number()).unwrap();
        assert_eq!(
            node.with_base_type(string()).unwrap_err(),
            ConfigurationError::BaseTypeAlreadySet
        );
    }

    #[test]
    fn test_refs_track_value_references_only() {
        let node = Alternatives::new()
            .when("a.b", WhenOptions::new().is(true).then(any()))
            .unwrap()
            .when("$tenant", WhenOptions::new().is("x").then(any()))
            .unwrap();
        assert_eq!(node.base().refs(), ["a".to_string()]);
    }

    #[test]
    fn test_conditional_on_typed_schema() {
        let node = number()
            .when("a", WhenOptions::new().is(true).otherwise(number().max(5.0)))
            .unwrap();
        assert_eq!(node.base().presence(), Some(Presence::Ignore));
        assert_eq!(node.base_type().map(Schema::type_name), Some("number"));

        let Match::When(condition) = &node.matches()[0] else {
            panic!("expected a conditional entry");
        };
        assert_eq!(condition.otherwise().map(Schema::type_name), Some("number"));
        assert_eq!(
            codes(&run(&node, Some(json!(9)), &parent(json!({ "a": false }))).unwrap_err()),
            vec![ErrorCode::NumberMax]
        );
        assert_eq!(run(&node, Some(json!(9)), &parent(json!({ "a": true }))), Ok(Some(json!(9))));
    }

    #[test]
    fn test_incompatible_branch_is_rejected() {
        let result = number().when("a", WhenOptions::new().is(true).then(string()));
        assert!(matches!(result, Err(ConfigurationError::IncompatibleConcat { .. })));
    }
}
