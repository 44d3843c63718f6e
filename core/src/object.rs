//! Object schema with declared children and unknown-key handling.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::cast::{SchemaLike, to_schema};
use crate::dependency::DependencyGraph;
use crate::describe::Description;
use crate::error::{ConfigurationError, ErrorCode, ValidationError, create_error};
use crate::options::ValidationOptions;
use crate::schema::Schema;
use crate::state::State;
use crate::types::{Outcome, SchemaBase, SchemaBuilder, SchemaKind};
use crate::validate::{context, finish};

/// A declared key of an object schema.
#[derive(Debug, Clone)]
pub struct ObjectChild {
    pub(crate) key: String,
    pub(crate) schema: Arc<Schema>,
}

impl ObjectChild {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Accepts JSON objects.
///
/// Without [`keys`](ObjectSchema::keys) any object is accepted. Once keys
/// are declared, children are validated in dependency order so that a key
/// referencing a sibling sees the sibling's coerced value.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub(crate) base: SchemaBase,
    pub(crate) children: Option<Vec<ObjectChild>>,
    pub(crate) order: Vec<usize>,
    pub(crate) unknown: Option<bool>,
}

impl ObjectSchema {
    /// Creates an object schema without declared keys.
    pub fn new() -> Self {
        Self {
            base: SchemaBase::new(),
            children: None,
            order: Vec::new(),
            unknown: None,
        }
    }

    /// Declares child schemas. A key declared again replaces the earlier
    /// schema in place.
    ///
    /// # Errors
    ///
    /// Returns the error of a failing cast, or
    /// [`ConfigurationError::DependencyCycle`] when children reference each
    /// other in a cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use value_schema_core::{Schema, SchemaBuilder, number, object, string};
    ///
    /// let schema: Schema = object()
    ///     .keys([("name", Schema::from(string().required())), ("age", number().into())])
    ///     .unwrap()
    ///     .into();
    ///
    /// assert_eq!(
    ///     schema.validate(&json!({ "name": "ada", "age": "36" })).unwrap(),
    ///     json!({ "name": "ada", "age": 36 })
    /// );
    /// assert!(schema.validate(&json!({ "age": 36 })).is_err());
    /// ```
    pub fn keys<I, K, S>(mut self, keys: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<SchemaLike>,
    {
        let mut children = self.children.take().unwrap_or_default();
        for (key, like) in keys {
            let key = key.into();
            let schema = Arc::new(to_schema(like.into())?);
            match children.iter_mut().find(|child| child.key == key) {
                Some(existing) => existing.schema = schema,
                None => children.push(ObjectChild { key, schema }),
            }
        }
        self.with_children(children)
    }

    /// Overrides [`ValidationOptions::allow_unknown`] for this object.
    pub fn unknown(mut self, allow: bool) -> Self {
        self.unknown = Some(allow);
        self
    }

    /// Declared children in declaration order, or `None` if keys were never
    /// declared.
    pub fn children(&self) -> Option<&[ObjectChild]> {
        self.children.as_deref()
    }

    /// Schema of the child `key`.
    pub fn child(&self, key: &str) -> Option<&Schema> {
        self.children
            .as_deref()?
            .iter()
            .find(|child| child.key == key)
            .map(ObjectChild::schema)
    }

    pub(crate) fn with_children(
        mut self,
        children: Vec<ObjectChild>,
    ) -> Result<Self, ConfigurationError> {
        let mut graph = DependencyGraph::new();
        for child in &children {
            graph.add(child.key.as_str(), child.schema.refs());
        }
        self.order = graph.sort()?;
        self.children = Some(children);
        Ok(self)
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaKind for ObjectSchema {
    fn base(&self) -> &SchemaBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "object"
    }

    fn check(&self, value: Option<&Value>, state: &State<'_>, options: &ValidationOptions) -> Outcome {
        let Some(value) = value else {
            return Ok(None);
        };
        let Value::Object(input) = value else {
            return Err(create_error(ErrorCode::ObjectBase, None, state, self.base.label()));
        };
        let Some(children) = &self.children else {
            return Ok(Some(value.clone()));
        };

        let mut target: Map<String, Value> = input.clone();
        let mut errors = Vec::new();

        for &index in &self.order {
            let child = &children[index];
            let outcome = {
                let child_state = state.child(&child.key, Some(&target));
                child
                    .schema
                    .validate_at(target.get(&child.key), &child_state, options)
            };
            match outcome {
                Ok(Some(coerced)) => {
                    target.insert(child.key.clone(), coerced);
                }
                Ok(None) => {
                    target.remove(&child.key);
                }
                Err(mut failed) => {
                    if options.abort_early {
                        return Err(failed);
                    }
                    errors.append(&mut failed);
                }
            }
        }

        let allow_unknown = self.unknown.unwrap_or(options.allow_unknown);
        if !allow_unknown {
            let unknown = input
                .keys()
                .filter(|key| !children.iter().any(|child| &child.key == *key));
            for key in unknown {
                if options.strip_unknown {
                    target.remove(key);
                    continue;
                }
                let child_state = state.child(key, Some(input));
                errors.push(ValidationError::new(
                    ErrorCode::ObjectAllowUnknown,
                    Some(context([("child", Value::String(key.clone()))])),
                    &child_state,
                    None,
                ));
                if options.abort_early {
                    return Err(errors);
                }
            }
        }

        finish(Value::Object(target), errors, options)
    }

    fn describe_kind(&self, description: &mut Description) {
        description.flags.allow_unknown = self.unknown;
        if let Some(children) = &self.children {
            description.children = Some(
                children
                    .iter()
                    .map(|child| (child.key.clone(), child.schema.describe()))
                    .collect(),
            );
        }
    }
}

impl SchemaBuilder for ObjectSchema {
    fn base_mut(&mut self) -> &mut SchemaBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{WhenOptions, alternatives, any, boolean, number, string};

    fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    fn codes(result: Result<Value, crate::ValidationErrors>) -> Vec<ErrorCode> {
        result.err().map(|errors| errors.codes()).unwrap_or_default()
    }

    #[test]
    fn test_object_without_keys_accepts_any_object() {
        let schema: Schema = ObjectSchema::new().into();
        assert!(schema.validate(&json!({ "x": 1 })).is_ok());
        assert_eq!(codes(schema.validate(&json!([1]))), vec![ErrorCode::ObjectBase]);
    }

    #[test]
    fn test_unknown_keys_rejected_by_default() {
        let schema: Schema = ObjectSchema::new().keys([("a", number())]).unwrap().into();
        let errors = schema.validate(&json!({ "a": 1, "b": 2 })).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::ObjectAllowUnknown]);
        assert_eq!(errors.errors()[0].path, vec!["b".to_string()]);
        assert_eq!(errors.errors()[0].message, "\"b\" is not allowed");
    }

    #[test]
    fn test_unknown_keys_allowed_or_stripped() {
        let keys = ObjectSchema::new().keys([("a", number())]).unwrap();
        let open: Schema = keys.clone().unknown(true).into();
        assert_eq!(
            open.validate(&json!({ "a": 1, "b": 2 })).unwrap(),
            json!({ "a": 1, "b": 2 })
        );

        let closed: Schema = keys.into();
        let strip = ValidationOptions {
            strip_unknown: true,
            ..options()
        };
        assert_eq!(
            closed.validate_with(&json!({ "a": "1", "b": 2 }), &strip).unwrap(),
            json!({ "a": 1 })
        );
    }

    #[test]
    fn test_collects_all_child_errors_without_abort_early() {
        let schema: Schema = ObjectSchema::new()
            .keys([("a", number()), ("b", number())])
            .unwrap()
            .into();
        let all = ValidationOptions {
            abort_early: false,
            ..options()
        };
        let errors = schema
            .validate_with(&json!({ "a": "x", "b": "y", "c": 1 }), &all)
            .unwrap_err();
        assert_eq!(
            errors.codes(),
            vec![ErrorCode::NumberBase, ErrorCode::NumberBase, ErrorCode::ObjectAllowUnknown]
        );
    }

    #[test]
    fn test_children_see_coerced_siblings() {
        let b = alternatives()
            .when(
                "a",
                WhenOptions::new()
                    .is(any().valid(5))
                    .then(string())
                    .otherwise(boolean()),
            )
            .unwrap();
        let schema: Schema = ObjectSchema::new()
            .keys([("b", Schema::from(b)), ("a", number().into())])
            .unwrap()
            .into();
        assert_eq!(
            schema.validate(&json!({ "b": "x", "a": "5" })).unwrap(),
            json!({ "b": "x", "a": 5 })
        );
    }

    #[test]
    fn test_cyclic_keys_are_rejected() {
        let a = alternatives()
            .when("b", WhenOptions::new().is(true).then(any()))
            .unwrap();
        let b = alternatives()
            .when("a", WhenOptions::new().is(true).then(any()))
            .unwrap();
        let result = ObjectSchema::new().keys([("a", a), ("b", b)]);
        assert!(matches!(result, Err(ConfigurationError::DependencyCycle { .. })));
    }

    #[test]
    fn test_redeclared_key_replaces_schema() {
        let schema = ObjectSchema::new()
            .keys([("a", Schema::from(number())), ("b", string().into())])
            .unwrap()
            .keys([("a", string())])
            .unwrap();
        let children = schema.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].key(), "a");
        assert_eq!(children[0].schema().type_name(), "string");
    }

    #[test]
    fn test_describe_lists_children_in_declaration_order() {
        let schema: Schema = ObjectSchema::new()
            .keys([("z", Schema::from(number())), ("a", string().into())])
            .unwrap()
            .unknown(false)
            .into();
        let description = schema.describe();
        let keys: Vec<_> = description.children.unwrap().into_keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(description.flags.allow_unknown, Some(false));
    }
}
