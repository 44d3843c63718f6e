//! Schema concatenation.
//!
//! [`Schema::concat`] combines a base schema with an overlay, producing a
//! new schema that enforces the rules of both. It is how the branches of a
//! conditional are composed with the base type of an alternatives node.
//!
//! Conflicts resolve toward the overlay:
//!
//! - the two schemas must share a type, or one of them must be `any`, in
//!   which case the result takes the typed side;
//! - single-valued settings (presence, label, limits, pattern, unknown-key
//!   flag) come from the overlay when it sets them;
//! - allowed and invalid literals are unioned, and a literal the overlay
//!   allows is no longer invalid (and vice versa);
//! - object children are merged key by key, recursively;
//! - alternatives entries are appended after the base's entries.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use value_schema_core::{Schema, number};
//!
//! let base: Schema = number().min(0.0).into();
//! let merged = base.concat(&number().max(10.0).into()).unwrap();
//!
//! assert!(merged.validate(&json!(5)).is_ok());
//! assert!(merged.validate(&json!(-1)).is_err());
//! assert!(merged.validate(&json!(11)).is_err());
//! ```

use std::sync::Arc;

use crate::alternatives::Alternatives;
use crate::error::ConfigurationError;
use crate::kinds::{BooleanSchema, NumberSchema, StringSchema};
use crate::object::ObjectSchema;
use crate::schema::Schema;
use crate::types::{SchemaBase, SchemaBuilder};

impl Schema {
    /// Returns a new schema combining `self` with `overlay`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::IncompatibleConcat`] when the schemas
    /// have different types and neither is `any`, or when merging object
    /// children fails.
    pub fn concat(&self, overlay: &Schema) -> Result<Schema, ConfigurationError> {
        let merged = match (self, overlay) {
            (Schema::Any(base), typed) if !matches!(typed, Schema::Any(_)) => {
                let mut result = typed.clone();
                *result.base_mut() = merge_base(&base.base, typed.base());
                result
            }
            (typed, Schema::Any(extra)) => {
                let mut result = typed.clone();
                *result.base_mut() = merge_base(typed.base(), &extra.base);
                result
            }
            (Schema::Boolean(a), Schema::Boolean(b)) => Schema::Boolean(BooleanSchema {
                base: merge_base(&a.base, &b.base),
            }),
            (Schema::Number(a), Schema::Number(b)) => Schema::Number(NumberSchema {
                base: merge_base(&a.base, &b.base),
                min: b.min.or(a.min),
                max: b.max.or(a.max),
                integer: a.integer || b.integer,
            }),
            (Schema::String(a), Schema::String(b)) => Schema::String(StringSchema {
                base: merge_base(&a.base, &b.base),
                min: b.min.or(a.min),
                max: b.max.or(a.max),
                pattern: b.pattern.clone().or_else(|| a.pattern.clone()),
            }),
            (Schema::Object(a), Schema::Object(b)) => Schema::Object(merge_objects(a, b)?),
            (Schema::Alternatives(a), Schema::Alternatives(b)) => {
                Schema::Alternatives(Alternatives {
                    base: merge_base(&a.base, &b.base),
                    matches: a.matches.iter().chain(&b.matches).cloned().collect(),
                    base_type: b.base_type.clone().or_else(|| a.base_type.clone()),
                })
            }
            _ => {
                return Err(ConfigurationError::IncompatibleConcat {
                    base: self.type_name().to_string(),
                    overlay: overlay.type_name().to_string(),
                });
            }
        };
        Ok(merged)
    }
}

fn merge_base(base: &SchemaBase, overlay: &SchemaBase) -> SchemaBase {
    let mut merged = base.clone();
    for value in overlay.valids.iter() {
        merged.invalids.remove(value);
        merged.valids.insert(value.clone());
    }
    for value in overlay.invalids.iter() {
        merged.valids.remove(value);
        merged.invalids.insert(value.clone());
    }
    merged.presence = overlay.presence.or(base.presence);
    merged.allow_only = base.allow_only || overlay.allow_only;
    merged.refs.extend_from_slice(&overlay.refs);
    merged.label = overlay.label.clone().or_else(|| base.label.clone());
    merged.description = overlay
        .description
        .clone()
        .or_else(|| base.description.clone());
    merged
}

fn merge_objects(
    base: &ObjectSchema,
    overlay: &ObjectSchema,
) -> Result<ObjectSchema, ConfigurationError> {
    let merged = ObjectSchema {
        base: merge_base(&base.base, &overlay.base),
        children: None,
        order: Vec::new(),
        unknown: overlay.unknown.or(base.unknown),
    };

    let children = match (&base.children, &overlay.children) {
        (None, None) => return Ok(merged),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (Some(left), Some(right)) => {
            let mut children = left.clone();
            for child in right {
                match children.iter_mut().find(|existing| existing.key == child.key) {
                    Some(existing) => {
                        existing.schema = Arc::new(existing.schema.concat(&child.schema)?);
                    }
                    None => children.push(child.clone()),
                }
            }
            children
        }
    };
    merged.with_children(children)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        ErrorCode, Presence, SchemaKind, WhenOptions, alternatives, any, boolean, number, object,
        string,
    };

    #[test]
    fn test_overlay_wins_scalar_settings() {
        let base: Schema = number().min(1.0).max(5.0).label("base").into();
        let merged = base
            .concat(&number().max(9.0).required().into())
            .unwrap();
        let Schema::Number(number) = &merged else {
            panic!("expected a number schema");
        };
        assert_eq!(number.min, Some(1.0));
        assert_eq!(number.max, Some(9.0));
        assert_eq!(merged.base().label(), Some("base"));
        assert_eq!(merged.base().presence(), Some(Presence::Required));
    }

    #[test]
    fn test_literals_union_with_cross_removal() {
        let base: Schema = string().valid("a").invalid("b").into();
        let merged = base.concat(&string().allow("b").into()).unwrap();
        assert!(merged.base().valids().contains(&json!("a")));
        assert!(merged.base().valids().contains(&json!("b")));
        assert!(!merged.base().invalids().contains(&json!("b")));
        assert!(merged.base().allow_only());
    }

    #[test]
    fn test_any_adopts_typed_side() {
        let base: Schema = any().label("x").into();
        let merged = base.concat(&number().into()).unwrap();
        assert_eq!(merged.type_name(), "number");
        assert_eq!(merged.base().label(), Some("x"));
        assert!(merged.base().invalids().contains(&Value::Null));

        let typed: Schema = boolean().into();
        let merged = typed.concat(&any().required().into()).unwrap();
        assert_eq!(merged.type_name(), "boolean");
        assert_eq!(merged.base().presence(), Some(Presence::Required));
    }

    #[test]
    fn test_mismatched_types_are_rejected() {
        let base: Schema = number().into();
        assert_eq!(
            base.concat(&string().into()).unwrap_err(),
            ConfigurationError::IncompatibleConcat {
                base: "number".into(),
                overlay: "string".into(),
            }
        );
    }

    #[test]
    fn test_object_children_merge_by_key() {
        let base: Schema = object()
            .keys([("a", Schema::from(number().min(1.0))), ("b", string().into())])
            .unwrap()
            .into();
        let overlay: Schema = object()
            .keys([("a", Schema::from(number().max(3.0))), ("c", boolean().into())])
            .unwrap()
            .into();
        let merged = base.concat(&overlay).unwrap();

        let Schema::Object(object) = &merged else {
            panic!("expected an object schema");
        };
        let keys: Vec<_> = object.children().unwrap().iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert!(merged.validate(&json!({ "a": 2, "b": "x", "c": true })).is_ok());
        assert_eq!(
            merged.validate(&json!({ "a": 4 })).unwrap_err().codes(),
            vec![ErrorCode::NumberMax]
        );
    }

    #[test]
    fn test_alternatives_entries_append() {
        let base: Schema = alternatives().try_schemas([number()]).unwrap().into();
        let overlay: Schema = alternatives()
            .when("x", WhenOptions::new().is(true).then(string()))
            .unwrap()
            .into();
        let merged = base.concat(&overlay).unwrap();
        let node = merged.as_alternatives().unwrap();
        assert_eq!(node.matches().len(), 2);
        assert_eq!(node.base().refs(), ["x".to_string()]);
    }
}
