//! Declarative, data-only descriptions of schemas.
//!
//! [`Schema::describe`] projects a schema into a [`Description`] without
//! touching validation state; describing the same schema twice yields equal
//! values. Descriptions serialize to JSON/YAML and can be compiled back into
//! schemas with [`Schema::from_description`](crate::Schema::from_description).
//!
//! ```
//! use value_schema_core::{Schema, alternatives, number, string};
//!
//! let schema: Schema = alternatives()
//!     .try_schemas([Schema::from(number()), string().into()])
//!     .unwrap()
//!     .into();
//! let description = schema.describe();
//! let alternatives = description.alternatives.as_ref().unwrap();
//!
//! assert_eq!(description.kind, "alternatives");
//! assert_eq!(alternatives.len(), 2);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::Presence;
use crate::schema::Schema;
use crate::types::SchemaBase;

/// Description of one schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    /// Schema type (`"any"`, `"number"`, `"alternatives"`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Presence and literal-restriction flags.
    #[serde(default, skip_serializing_if = "DescriptionFlags::is_empty")]
    pub flags: DescriptionFlags,
    /// Label used in failure messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed literals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valids: Vec<Value>,
    /// Rejected literals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalids: Vec<Value>,
    /// Kind-specific rules in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleDescription>,
    /// Object children in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<IndexMap<String, Description>>,
    /// Alternatives match entries in evaluation order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<AlternativeDescription>>,
    /// Fallback schema of an alternatives node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<Box<Description>>,
}

/// Flags section of a [`Description`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unknown: Option<bool>,
}

impl DescriptionFlags {
    /// Returns `true` when no flag is set.
    pub fn is_empty(&self) -> bool {
        self.presence.is_none() && !self.allow_only && self.allow_unknown.is_none()
    }
}

/// One kind-specific rule (`min`, `max`, `integer`, `pattern`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<Value>,
}

impl RuleDescription {
    /// Creates a rule description.
    pub fn new(name: &str, arg: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            arg,
        }
    }
}

/// One alternatives match entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlternativeDescription {
    /// A conditional entry.
    When(WhenDescription),
    /// A plain candidate schema.
    Schema(Box<Description>),
}

/// Description of a conditional entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenDescription {
    /// Reference in its rendered form (`ref:a.b`, `context:x`).
    #[serde(rename = "ref")]
    pub reference: String,
    pub is: Box<Description>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Box<Description>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Box<Description>>,
}

impl Schema {
    /// Describes the schema.
    pub fn describe(&self) -> Description {
        let kind = self.kind();
        let mut description = describe_base(kind.type_name(), kind.base());
        kind.describe_kind(&mut description);
        description
    }
}

fn describe_base(kind: &str, base: &SchemaBase) -> Description {
    Description {
        kind: kind.to_string(),
        flags: DescriptionFlags {
            presence: base.presence(),
            allow_only: base.allow_only(),
            allow_unknown: None,
        },
        label: base.label().map(String::from),
        description: base.description().map(String::from),
        valids: base.valids().values().to_vec(),
        invalids: base.invalids().values().to_vec(),
        ..Description::default()
    }
}
