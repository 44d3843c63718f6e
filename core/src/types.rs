//! Shared schema state and the capability traits every schema kind implements.
//!
//! Schema kinds do not inherit from a common base. Each one owns a
//! [`SchemaBase`] (presence, allowed and invalid literals, references,
//! labels) and implements [`SchemaKind`], which the generic validation
//! pipeline in [`validate`](crate::validate) drives. [`SchemaBuilder`] adds
//! the common builder methods on top of the owned base.

use serde_json::Value;

use crate::describe::Description;
use crate::error::ValidationError;
use crate::options::{Presence, ValidationOptions};
use crate::state::State;

/// Result of validating one value: the (possibly coerced) value, `None` when
/// the value is absent, or the failures found.
pub type Outcome = Result<Option<Value>, Vec<ValidationError>>;

/// Ordered set of JSON literals.
///
/// Numbers compare by numeric value, so `5` and `5.0` are the same member.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    values: Vec<Value>,
}

impl ValueSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `value` is a member.
    pub fn contains(&self, value: &Value) -> bool {
        self.values.iter().any(|v| same_value(v, value))
    }

    /// Adds `value` unless it is already a member.
    pub fn insert(&mut self, value: Value) {
        if !self.contains(&value) {
            self.values.push(value);
        }
    }

    /// Removes `value` if present.
    pub fn remove(&mut self, value: &Value) {
        self.values.retain(|v| !same_value(v, value));
    }

    /// Returns the members in insertion order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns an iterator over the members.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for ValueSet {
    fn from(values: Vec<Value>) -> Self {
        let mut set = Self::new();
        for value in values {
            set.insert(value);
        }
        set
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// State shared by every schema kind.
#[derive(Debug, Clone)]
pub struct SchemaBase {
    pub(crate) presence: Option<Presence>,
    pub(crate) allow_only: bool,
    pub(crate) valids: ValueSet,
    pub(crate) invalids: ValueSet,
    pub(crate) refs: Vec<String>,
    pub(crate) label: Option<String>,
    pub(crate) description: Option<String>,
}

impl SchemaBase {
    /// Creates a base that rejects `null`.
    pub fn new() -> Self {
        let mut invalids = ValueSet::new();
        invalids.insert(Value::Null);
        Self {
            presence: None,
            allow_only: false,
            valids: ValueSet::new(),
            invalids,
            refs: Vec::new(),
            label: None,
            description: None,
        }
    }

    /// Presence set on the schema itself, if any.
    pub fn presence(&self) -> Option<Presence> {
        self.presence
    }

    /// Returns `true` if only the allowed literals are accepted.
    pub fn allow_only(&self) -> bool {
        self.allow_only
    }

    /// Literals accepted without further checks.
    pub fn valids(&self) -> &ValueSet {
        &self.valids
    }

    /// Literals always rejected.
    pub fn invalids(&self) -> &ValueSet {
        &self.invalids
    }

    /// Sibling keys this schema reads through references.
    pub fn refs(&self) -> &[String] {
        &self.refs
    }

    /// Label used in failure messages.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Free-form description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Default for SchemaBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability implemented by each schema kind.
pub trait SchemaKind {
    /// Shared state owned by the kind.
    fn base(&self) -> &SchemaBase;

    /// Type name used in descriptions (`"number"`, `"alternatives"`).
    fn type_name(&self) -> &'static str;

    /// Kind-specific check, run after the presence and literal checks.
    fn check(&self, value: Option<&Value>, state: &State<'_>, options: &ValidationOptions)
    -> Outcome;

    /// Adds kind-specific rules, children or alternatives to `description`.
    fn describe_kind(&self, _description: &mut Description) {}
}

/// Builder methods shared by every schema kind.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use value_schema_core::{Presence, SchemaBuilder, SchemaKind, number};
///
/// let schema = number().required().label("port").allow(json!("auto"));
/// assert_eq!(schema.base().presence(), Some(Presence::Required));
/// assert!(schema.base().valids().contains(&json!("auto")));
/// ```
pub trait SchemaBuilder: Sized {
    /// Mutable access to the shared state.
    fn base_mut(&mut self) -> &mut SchemaBase;

    /// Marks the value as required.
    fn required(mut self) -> Self {
        self.base_mut().presence = Some(Presence::Required);
        self
    }

    /// Marks the value as optional.
    fn optional(mut self) -> Self {
        self.base_mut().presence = Some(Presence::Optional);
        self
    }

    /// Marks the value as forbidden.
    fn forbidden(mut self) -> Self {
        self.base_mut().presence = Some(Presence::Forbidden);
        self
    }

    /// Sets presence explicitly.
    fn presence(mut self, presence: Presence) -> Self {
        self.base_mut().presence = Some(presence);
        self
    }

    /// Accepts `value` and restricts the schema to its allowed literals.
    fn valid(self, value: impl Into<Value>) -> Self {
        let mut schema = self.allow(value);
        schema.base_mut().allow_only = true;
        schema
    }

    /// Accepts `value` in addition to what the schema accepts.
    fn allow(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        let base = self.base_mut();
        base.invalids.remove(&value);
        base.valids.insert(value);
        self
    }

    /// Rejects `value`.
    fn invalid(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        let base = self.base_mut();
        base.valids.remove(&value);
        base.invalids.insert(value);
        self
    }

    /// Sets the label used in failure messages.
    fn label(mut self, label: impl Into<String>) -> Self {
        self.base_mut().label = Some(label.into());
        self
    }

    /// Sets a free-form description.
    fn description(mut self, text: impl Into<String>) -> Self {
        self.base_mut().description = Some(text.into());
        self
    }
}
