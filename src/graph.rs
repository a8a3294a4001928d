//! The key graph of a keyed type.
//!
//! [`build_graph`](crate::build_graph) runs a type's mapping routine without
//! any input and records every key path it would read, descending into
//! nested keyed types, plain serde structs and the elements of arrays. The
//! result is a [`Graph`]: an ordered tree of path segments that renders as
//! a nested selection set, the shape a GraphQL query for the type needs.
//!
//! ```rust
//! use serde_keyed::{build_graph, KeyMap, Keyed, Result};
//!
//! #[derive(Default, Clone)]
//! struct User { name: String, city: Option<String> }
//!
//! impl Keyed for User {
//!     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
//!         map.field(&mut self.name, "user.name")?;
//!         map.optional(&mut self.city, "user.address.city")
//!     }
//! }
//!
//! let graph = build_graph::<User>().unwrap().updating(&["user"], "user(id: 7)");
//! assert_eq!(
//!     graph.to_string(),
//!     "{\n  user(id: 7) {\n    name\n    address {\n      city\n    }\n  }\n}"
//! );
//! ```

use crate::Result;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct GraphNode {
    label: String,
    children: IndexMap<String, GraphNode>,
}

impl GraphNode {
    fn named(segment: &str) -> Self {
        GraphNode {
            label: segment.to_string(),
            children: IndexMap::new(),
        }
    }

    fn descend<S: AsRef<str>>(&mut self, path: &[S]) -> &mut GraphNode {
        path.iter().fold(self, |node, segment| {
            let segment = segment.as_ref();
            node.children
                .entry(segment.to_string())
                .or_insert_with(|| GraphNode::named(segment))
        })
    }

    fn find(&self, path: &[&str]) -> Option<&GraphNode> {
        path.iter()
            .try_fold(self, |node, segment| node.children.get(*segment))
    }

    fn merge(&mut self, other: GraphNode) {
        for (segment, child) in other.children {
            self.children
                .entry(segment.clone())
                .or_insert_with(|| GraphNode::named(&segment))
                .merge(child);
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        f.write_str(&self.label)?;
        if self.children.is_empty() {
            return Ok(());
        }
        if !self.label.is_empty() {
            f.write_str(" ")?;
        }
        f.write_str("{\n")?;
        for child in self.children.values() {
            write!(f, "{}", "  ".repeat(depth + 1))?;
            child.render(f, depth + 1)?;
            f.write_str("\n")?;
        }
        write!(f, "{}}}", "  ".repeat(depth))
    }
}

/// An ordered tree of key path segments.
///
/// Every node is labelled with its segment until [`updating`] gives it
/// another label, such as a field with arguments. `Display` renders the
/// tree as nested braces indented by two spaces.
///
/// [`updating`]: Graph::updating
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    root: GraphNode,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Adds `path`, creating every missing node along it.
    pub fn add(&mut self, path: &[&str]) {
        self.root.descend(path);
    }

    #[must_use]
    pub fn contains(&self, path: &[&str]) -> bool {
        self.root.find(path).is_some()
    }

    /// The label of the node at `path`.
    #[must_use]
    pub fn label(&self, path: &[&str]) -> Option<&str> {
        self.root.find(path).map(|node| node.label.as_str())
    }

    /// Returns the graph with the node at `path` relabelled; the empty path
    /// labels the root. Missing nodes are created.
    ///
    /// ```rust
    /// use serde_keyed::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.add(&["hero", "name"]);
    /// let query = graph.updating(&[], "query").updating(&["hero"], "hero(episode: JEDI)");
    /// assert_eq!(query.to_string(), "query {\n  hero(episode: JEDI) {\n    name\n  }\n}");
    /// ```
    #[must_use]
    pub fn updating(mut self, path: &[&str], label: &str) -> Self {
        self.root.descend(path).label = label.to_string();
        self
    }

    /// Merges `other` under the node at `path`.
    pub(crate) fn graft(&mut self, path: &[String], other: Graph) {
        self.root.descend(path).merge(other.root);
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.render(f, 0)
    }
}

thread_local! {
    static CAPTURES: RefCell<Vec<Graph>> = RefCell::new(Vec::new());
}

struct CaptureScope;

impl Drop for CaptureScope {
    fn drop(&mut self) {
        CAPTURES.with(|captures| {
            captures.borrow_mut().pop();
        });
    }
}

/// Runs `f` and collects the graphs that keyed types and structs reached
/// from it deposit.
pub(crate) fn capture<R>(f: impl FnOnce() -> Result<R>) -> Result<(R, Graph)> {
    CAPTURES.with(|captures| captures.borrow_mut().push(Graph::new()));
    let _scope = CaptureScope;
    let value = f()?;
    let graph = CAPTURES.with(|captures| {
        captures
            .borrow_mut()
            .last_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    });
    Ok((value, graph))
}

/// Whether a [`capture`] is running on this thread.
pub(crate) fn capturing() -> bool {
    CAPTURES.with(|captures| !captures.borrow().is_empty())
}

/// Merges `graph` under `path` of the innermost capture.
pub(crate) fn deposit(path: &[String], graph: Graph) {
    CAPTURES.with(|captures| {
        if let Some(open) = captures.borrow_mut().last_mut() {
            open.graft(path, graph);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut graph = Graph::new();
        graph.add(&["b", "x"]);
        graph.add(&["a"]);
        graph.add(&["b", "y"]);
        assert_eq!(graph.to_string(), "{\n  b {\n    x\n    y\n  }\n  a\n}");
        assert!(graph.contains(&["b", "y"]));
        assert!(!graph.contains(&["a", "x"]));
    }

    #[test]
    fn test_empty_graph_renders_nothing() {
        let graph = Graph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.to_string(), "");
        assert_eq!(graph.updating(&[], "query").to_string(), "query");
    }

    #[test]
    fn test_graft_merges_shared_nodes() {
        let mut graph = Graph::new();
        graph.add(&["data", "id"]);
        let mut nested = Graph::new();
        nested.add(&["id"]);
        nested.add(&["name"]);
        graph.graft(&segments(&["data"]), nested);
        assert_eq!(graph.to_string(), "{\n  data {\n    id\n    name\n  }\n}");
    }

    #[test]
    fn test_updating_creates_missing_nodes() {
        let graph = Graph::new().updating(&["a", "b"], "b(first: 2)");
        assert_eq!(graph.label(&["a"]), Some("a"));
        assert_eq!(graph.label(&["a", "b"]), Some("b(first: 2)"));
    }

    #[test]
    fn test_deposit_reaches_innermost_capture() {
        let ((), outer) = capture(|| {
            deposit(&segments(&["outer"]), Graph::new());
            let ((), inner) = capture(|| {
                deposit(&segments(&["inner"]), Graph::new());
                Ok(())
            })?;
            assert!(inner.contains(&["inner"]));
            Ok(())
        })
        .unwrap();
        assert!(outer.contains(&["outer"]));
        assert!(!outer.contains(&["inner"]));
        assert!(!capturing());
    }
}
