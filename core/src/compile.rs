//! Compilation of [`Description`] values back into schemas.
//!
//! This is the inverse of [`Schema::describe`]: definitions stored as JSON
//! or YAML are deserialized into descriptions and compiled here. Conditional
//! entries are restored exactly as described, since their branches were
//! already composed with the base type when the schema was first built.

use std::sync::Arc;

use serde_json::Value;

use crate::alternatives::{Alternatives, Condition};
use crate::describe::{AlternativeDescription, Description, RuleDescription};
use crate::error::ConfigurationError;
use crate::kinds::{NumberSchema, Pattern, StringSchema};
use crate::object::{ObjectChild, ObjectSchema};
use crate::reference::Reference;
use crate::schema::{Schema, any, boolean};
use crate::types::{SchemaBase, SchemaBuilder, ValueSet};

impl Schema {
    /// Compiles `description` into a schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for an unknown type or rule, a rule
    /// argument of the wrong shape, a malformed reference, or a conditional
    /// entry with neither `then` nor `otherwise`.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use value_schema_core::{Description, Schema};
    ///
    /// let description: Description = serde_json::from_value(json!({
    ///     "type": "number",
    ///     "flags": { "presence": "required" },
    ///     "rules": [{ "name": "min", "arg": 1 }]
    /// }))
    /// .unwrap();
    /// let schema = Schema::from_description(&description).unwrap();
    ///
    /// assert!(schema.validate(&json!(3)).is_ok());
    /// assert!(schema.validate(&json!(0)).is_err());
    /// ```
    pub fn from_description(description: &Description) -> Result<Schema, ConfigurationError> {
        let kind = description.kind.as_str();
        let mut schema: Schema = match kind {
            "any" => {
                reject_rules(kind, &description.rules)?;
                any().into()
            }
            "boolean" => {
                reject_rules(kind, &description.rules)?;
                boolean().into()
            }
            "number" => compile_number(&description.rules)?.into(),
            "string" => compile_string(&description.rules)?.into(),
            "object" => {
                reject_rules(kind, &description.rules)?;
                compile_object(description)?.into()
            }
            "alternatives" => {
                reject_rules(kind, &description.rules)?;
                compile_alternatives(description)?.into()
            }
            other => return Err(ConfigurationError::UnknownType(other.to_string())),
        };
        apply_base(schema.base_mut(), description);
        Ok(schema)
    }
}

impl TryFrom<&Description> for Schema {
    type Error = ConfigurationError;

    fn try_from(description: &Description) -> Result<Self, Self::Error> {
        Schema::from_description(description)
    }
}

fn apply_base(base: &mut SchemaBase, description: &Description) {
    base.presence = description.flags.presence;
    base.allow_only = description.flags.allow_only;
    base.valids = ValueSet::from(description.valids.clone());
    base.invalids = ValueSet::from(description.invalids.clone());
    base.label = description.label.clone();
    base.description = description.description.clone();
}

fn reject_rules(kind: &str, rules: &[RuleDescription]) -> Result<(), ConfigurationError> {
    match rules.first() {
        Some(rule) => Err(unknown_rule(kind, rule)),
        None => Ok(()),
    }
}

fn unknown_rule(kind: &str, rule: &RuleDescription) -> ConfigurationError {
    ConfigurationError::UnknownRule {
        kind: kind.to_string(),
        rule: rule.name.clone(),
    }
}

fn invalid_argument(rule: &RuleDescription) -> ConfigurationError {
    ConfigurationError::InvalidRuleArgument {
        rule: rule.name.clone(),
        arg: rule
            .arg
            .as_ref()
            .map_or_else(|| "none".to_string(), Value::to_string),
    }
}

fn compile_number(rules: &[RuleDescription]) -> Result<NumberSchema, ConfigurationError> {
    let mut schema = NumberSchema::new();
    for rule in rules {
        schema = match rule.name.as_str() {
            "min" => schema.min(float_arg(rule)?),
            "max" => schema.max(float_arg(rule)?),
            "integer" => schema.integer(),
            _ => return Err(unknown_rule("number", rule)),
        };
    }
    Ok(schema)
}

fn compile_string(rules: &[RuleDescription]) -> Result<StringSchema, ConfigurationError> {
    let mut schema = StringSchema::new();
    for rule in rules {
        match rule.name.as_str() {
            "min" => schema.min = Some(length_arg(rule)?),
            "max" => schema.max = Some(length_arg(rule)?),
            "pattern" => {
                let source = rule
                    .arg
                    .as_ref()
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid_argument(rule))?;
                schema.pattern = Some(Pattern::new(source)?);
            }
            _ => return Err(unknown_rule("string", rule)),
        }
    }
    Ok(schema)
}

fn float_arg(rule: &RuleDescription) -> Result<f64, ConfigurationError> {
    rule.arg
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid_argument(rule))
}

fn length_arg(rule: &RuleDescription) -> Result<usize, ConfigurationError> {
    rule.arg
        .as_ref()
        .and_then(Value::as_u64)
        .and_then(|limit| usize::try_from(limit).ok())
        .ok_or_else(|| invalid_argument(rule))
}

fn compile_object(description: &Description) -> Result<ObjectSchema, ConfigurationError> {
    let mut schema = ObjectSchema::new();
    schema.unknown = description.flags.allow_unknown;
    let Some(children) = &description.children else {
        return Ok(schema);
    };

    let children = children
        .iter()
        .map(|(key, child)| {
            Ok(ObjectChild {
                key: key.clone(),
                schema: Arc::new(Schema::from_description(child)?),
            })
        })
        .collect::<Result<Vec<_>, ConfigurationError>>()?;
    schema.with_children(children)
}

fn compile_alternatives(description: &Description) -> Result<Alternatives, ConfigurationError> {
    let mut node = Alternatives::new();
    if let Some(base_type) = &description.base_type {
        node = node.with_base_type(Schema::from_description(base_type)?)?;
    }

    for entry in description.alternatives.iter().flatten() {
        match entry {
            AlternativeDescription::Schema(schema) => {
                node.push_try(Schema::from_description(schema)?);
            }
            AlternativeDescription::When(when) => {
                if when.then.is_none() && when.otherwise.is_none() {
                    return Err(ConfigurationError::MissingOutcome);
                }
                let branch = |branch: &Option<Box<Description>>| {
                    branch
                        .as_deref()
                        .map(Schema::from_description)
                        .transpose()
                        .map(|schema| schema.map(Arc::new))
                };
                node.push_condition(Condition {
                    reference: Reference::parse_display(&when.reference)?,
                    is: Arc::new(Schema::from_description(&when.is)?),
                    then: branch(&when.then)?,
                    otherwise: branch(&when.otherwise)?,
                });
            }
        }
    }
    Ok(node)
}
