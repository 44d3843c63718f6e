//! Ordering of object keys by their reference dependencies.
//!
//! A key whose schema references a sibling must be validated after that
//! sibling, so the reference sees the coerced value. [`DependencyGraph`] is
//! built per object schema; there is no process-wide registry.

use crate::error::ConfigurationError;

#[derive(Debug, Clone)]
struct Node {
    key: String,
    after: Vec<String>,
}

/// Dependency edges between sibling keys.
///
/// # Examples
///
/// ```
/// use value_schema_core::DependencyGraph;
///
/// let mut graph = DependencyGraph::new();
/// graph.add("b", ["a"]);
/// graph.add("a", Vec::<String>::new());
/// graph.add("c", ["elsewhere"]);
/// assert_eq!(graph.sort().unwrap(), vec![1, 0, 2]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key`, to be ordered after every sibling named in `after`.
    pub fn add<I, S>(&mut self, key: impl Into<String>, after: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes.push(Node {
            key: key.into(),
            after: after.into_iter().map(Into::into).collect(),
        });
    }

    /// Returns node indices in dependency order.
    ///
    /// Independent keys keep their insertion order. Dependencies on names
    /// that are not in the graph are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DependencyCycle`] naming every key that
    /// could not be placed, including a key that references itself.
    pub fn sort(&self) -> Result<Vec<usize>, ConfigurationError> {
        let mut placed = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());

        while order.len() < self.nodes.len() {
            let ready = self.nodes.iter().enumerate().position(|(index, node)| {
                !placed[index]
                    && node.after.iter().all(|dep| {
                        self.nodes
                            .iter()
                            .enumerate()
                            .filter(|(_, other)| &other.key == dep)
                            .all(|(other_index, _)| placed[other_index] && other_index != index)
                    })
            });

            match ready {
                Some(index) => {
                    placed[index] = true;
                    order.push(index);
                }
                None => {
                    let keys = self
                        .nodes
                        .iter()
                        .enumerate()
                        .filter(|(index, _)| !placed[*index])
                        .map(|(_, node)| node.key.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(ConfigurationError::DependencyCycle { keys });
                }
            }
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_keeps_insertion_order_without_edges() {
        let mut graph = DependencyGraph::new();
        graph.add("x", Vec::<String>::new());
        graph.add("y", Vec::<String>::new());
        assert_eq!(graph.sort().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_sort_moves_dependents_after_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.add("c", ["b"]);
        graph.add("b", ["a"]);
        graph.add("a", Vec::<String>::new());
        assert_eq!(graph.sort().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_sort_rejects_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add("a", ["b"]);
        graph.add("b", ["a"]);
        graph.add("c", Vec::<String>::new());
        assert_eq!(
            graph.sort(),
            Err(ConfigurationError::DependencyCycle {
                keys: "a, b".to_string()
            })
        );
    }

    #[test]
    fn test_sort_rejects_self_reference() {
        let mut graph = DependencyGraph::new();
        graph.add("a", ["a"]);
        assert!(matches!(
            graph.sort(),
            Err(ConfigurationError::DependencyCycle { .. })
        ));
    }
}
