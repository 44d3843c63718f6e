//! Generic validation pipeline shared by every schema kind.
//!
//! [`run`] applies the steps common to all kinds (presence, allowed and
//! invalid literals, `allow_only`) around the kind-specific
//! [`SchemaKind::check`]. Kinds never call each other's checks directly;
//! nested schemas are validated through [`Schema::validate_at`], which
//! re-enters this pipeline.
//!
//! [`Schema::validate_at`]: crate::Schema::validate_at

use serde_json::{Map, Value};

use crate::error::{ErrorCode, ValidationError, create_error};
use crate::options::{Presence, ValidationOptions};
use crate::state::State;
use crate::types::{Outcome, SchemaBase, SchemaKind};

pub(crate) fn run(
    kind: &dyn SchemaKind,
    value: Option<&Value>,
    state: &State<'_>,
    options: &ValidationOptions,
) -> Outcome {
    let base = kind.base();
    let label = base.label();
    let presence = base.presence().unwrap_or(options.presence);

    match value {
        None => match presence {
            Presence::Required => return Err(create_error(ErrorCode::AnyRequired, None, state, label)),
            Presence::Optional | Presence::Forbidden => return Ok(None),
            Presence::Ignore => return kind.check(None, state, options),
        },
        Some(value) => {
            if presence == Presence::Forbidden {
                return Err(create_error(ErrorCode::AnyUnknown, None, state, label));
            }
            if base.valids().contains(value) {
                return Ok(Some(value.clone()));
            }
            if base.invalids().contains(value) {
                return Err(vec![invalid_error(value, state, label)]);
            }
        }
    }

    let checked = kind.check(value, state, options)?;
    let Some(coerced) = &checked else {
        return Ok(None);
    };

    if base.valids().contains(coerced) {
        return Ok(checked);
    }
    if base.invalids().contains(coerced) {
        return Err(vec![invalid_error(coerced, state, label)]);
    }
    if base.allow_only() {
        return Err(create_error(
            ErrorCode::AnyAllowOnly,
            Some(allowed_context(base)),
            state,
            label,
        ));
    }

    Ok(checked)
}

/// Collapses rule failures into an outcome, keeping only the first failure
/// when `abort_early` is set.
pub(crate) fn finish(
    value: Value,
    mut errors: Vec<ValidationError>,
    options: &ValidationOptions,
) -> Outcome {
    if errors.is_empty() {
        return Ok(Some(value));
    }
    if options.abort_early {
        errors.truncate(1);
    }
    Err(errors)
}

/// Builds a context map from `(name, value)` pairs.
pub(crate) fn context<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn invalid_error(value: &Value, state: &State<'_>, label: Option<&str>) -> ValidationError {
    if value.as_str() == Some("") {
        ValidationError::new(ErrorCode::AnyEmpty, None, state, label)
    } else {
        ValidationError::new(
            ErrorCode::AnyInvalid,
            Some(context([("value", value.clone())])),
            state,
            label,
        )
    }
}

fn allowed_context(base: &SchemaBase) -> Map<String, Value> {
    let valids = base
        .valids()
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    context([("valids", Value::String(format!("[{valids}]")))])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Schema, SchemaBuilder, any, number, string};

    fn codes(schema: &Schema, value: Option<&Value>, options: &ValidationOptions) -> Vec<ErrorCode> {
        match schema.validate_at(value, &State::root(), options) {
            Ok(_) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.code).collect(),
        }
    }

    #[test]
    fn test_absent_value_follows_presence() {
        let options = ValidationOptions::default();
        let optional: Schema = number().into();
        assert_eq!(optional.validate_at(None, &State::root(), &options), Ok(None));

        let required: Schema = number().required().into();
        assert_eq!(codes(&required, None, &options), vec![ErrorCode::AnyRequired]);

        let strict = ValidationOptions {
            presence: Presence::Required,
            ..ValidationOptions::default()
        };
        assert_eq!(codes(&optional, None, &strict), vec![ErrorCode::AnyRequired]);
    }

    #[test]
    fn test_forbidden_rejects_present_value() {
        let schema: Schema = any().forbidden().into();
        let options = ValidationOptions::default();
        assert_eq!(
            codes(&schema, Some(&json!(1)), &options),
            vec![ErrorCode::AnyUnknown]
        );
        assert_eq!(schema.validate_at(None, &State::root(), &options), Ok(None));
    }

    #[test]
    fn test_null_rejected_unless_allowed() {
        let options = ValidationOptions::default();
        let schema: Schema = number().into();
        assert_eq!(
            codes(&schema, Some(&Value::Null), &options),
            vec![ErrorCode::AnyInvalid]
        );

        let nullable: Schema = number().allow(Value::Null).into();
        assert!(codes(&nullable, Some(&Value::Null), &options).is_empty());
    }

    #[test]
    fn test_allow_only_checks_coerced_value() {
        let options = ValidationOptions::default();
        let schema: Schema = number().valid(5).into();
        assert_eq!(
            schema.validate_at(Some(&json!("5")), &State::root(), &options),
            Ok(Some(json!(5)))
        );
        assert_eq!(
            codes(&schema, Some(&json!(6)), &options),
            vec![ErrorCode::AnyAllowOnly]
        );
    }

    #[test]
    fn test_empty_string_reports_empty() {
        let options = ValidationOptions::default();
        let schema: Schema = string().into();
        assert_eq!(codes(&schema, Some(&json!("")), &options), vec![ErrorCode::AnyEmpty]);
    }
}
