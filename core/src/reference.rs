//! Symbolic references into the document being validated.
//!
//! A reference names a value by path. Plain paths (`"a.b"`) resolve against
//! the object that contains the value under validation; paths prefixed with
//! `$` (`"$tenant.id"`) resolve against
//! [`ValidationOptions::context`](crate::ValidationOptions::context).
//!
//! ```
//! use serde_json::json;
//! use value_schema_core::{Reference, ValidationOptions};
//!
//! let reference = Reference::parse("limits.max").unwrap();
//! let parent = json!({ "limits": { "max": 10 } });
//! let options = ValidationOptions::default();
//!
//! assert_eq!(reference.to_string(), "ref:limits.max");
//! assert_eq!(
//!     reference.resolve(parent.as_object(), &options),
//!     Some(&json!(10))
//! );
//! ```

use std::fmt;

use serde_json::{Map, Value};

use crate::error::ConfigurationError;
use crate::options::ValidationOptions;

const CONTEXT_PREFIX: char = '$';
const SEPARATOR: char = '.';

/// A parsed reference path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    context: bool,
    key: String,
    path: Vec<String>,
}

impl Reference {
    /// Parses a reference path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidReference`] for an empty path, a
    /// bare `$`, or a path with an empty segment (`"a..b"`).
    pub fn parse(key: &str) -> Result<Self, ConfigurationError> {
        let (context, body) = match key.strip_prefix(CONTEXT_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, key),
        };

        if body.is_empty() || body.split(SEPARATOR).any(str::is_empty) {
            return Err(ConfigurationError::InvalidReference(key.to_string()));
        }

        Ok(Self {
            context,
            key: body.to_string(),
            path: body.split(SEPARATOR).map(String::from).collect(),
        })
    }

    /// Parses the rendered form produced by [`Display`](fmt::Display)
    /// (`ref:a.b` or `context:a.b`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidReference`] if the prefix is
    /// missing or the path is malformed.
    pub fn parse_display(rendered: &str) -> Result<Self, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidReference(rendered.to_string());
        if let Some(rest) = rendered.strip_prefix("ref:") {
            if rest.starts_with(CONTEXT_PREFIX) {
                return Err(invalid());
            }
            Self::parse(rest).map_err(|_| invalid())
        } else if let Some(rest) = rendered.strip_prefix("context:") {
            Self::parse(&format!("{CONTEXT_PREFIX}{rest}")).map_err(|_| invalid())
        } else {
            Err(invalid())
        }
    }

    /// Path without the `$` prefix.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Path segments.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// First path segment, the sibling key a value reference depends on.
    pub fn root(&self) -> &str {
        &self.path[0]
    }

    /// Returns `true` for `$`-prefixed references.
    pub fn is_context(&self) -> bool {
        self.context
    }

    /// Resolves the reference, returning `None` when the value is absent.
    pub fn resolve<'v>(
        &self,
        parent: Option<&'v Map<String, Value>>,
        options: &'v ValidationOptions,
    ) -> Option<&'v Value> {
        let source = if self.context {
            &options.context
        } else {
            parent?
        };

        let (first, rest) = self.path.split_first()?;
        let mut current = source.get(first)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context {
            write!(f, "context:{}", self.key)
        } else {
            write!(f, "ref:{}", self.key)
        }
    }
}

/// Records the sibling key `reference` depends on.
///
/// Context references do not point into the document and are never tracked.
pub fn push_ref(refs: &mut Vec<String>, reference: &Reference) {
    if !reference.is_context() {
        refs.push(reference.root().to_string());
    }
}
