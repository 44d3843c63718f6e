//! Position of a value inside the document being validated.

use serde_json::{Map, Value};

/// Validation state threaded through nested schema calls.
///
/// `parent` is the object that contains the value under validation. Value
/// references resolve against it, which is how a conditional alternative
/// reads a sibling key.
#[derive(Debug, Clone, Default)]
pub struct State<'a> {
    /// Keys from the root to the current value.
    pub path: Vec<String>,
    /// Key of the current value inside its parent.
    pub key: Option<String>,
    /// Object containing the current value.
    pub parent: Option<&'a Map<String, Value>>,
}

impl<'a> State<'a> {
    /// State for the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Fresh state that keeps only the parent, used to evaluate a condition
    /// in isolation from the value's own position.
    pub fn detached(parent: Option<&'a Map<String, Value>>) -> Self {
        Self {
            path: Vec::new(),
            key: None,
            parent,
        }
    }

    /// State for the child `key` held by `parent`.
    pub fn child<'b>(&self, key: &str, parent: Option<&'b Map<String, Value>>) -> State<'b> {
        let mut path = self.path.clone();
        path.push(key.to_string());
        State {
            path,
            key: Some(key.to_string()),
            parent,
        }
    }

    /// Returns the path joined with `.`.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}
