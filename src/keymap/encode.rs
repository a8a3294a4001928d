use super::{joiner, Shape, Target};
use crate::cache::ContainerCache;
use crate::options::KeyOptions;
use crate::ser::to_value;
use crate::{Error, Map, Result, Value};
use indexmap::IndexMap;
use serde::Serialize;

type NodeId = usize;

const ROOT: NodeId = 0;

/// A leaf value waiting for its object, with the field key that wrote it.
#[derive(Debug)]
struct PendingWrite {
    key: String,
    leaf: String,
    value: Value,
}

/// One nesting level of the output: child levels by segment and the leaf
/// values that end here.
#[derive(Debug, Default)]
struct PendingNode {
    children: IndexMap<String, NodeId>,
    writes: Vec<PendingWrite>,
}

/// Arena of pending nodes; node 0 is the object being encoded.
#[derive(Debug)]
struct PendingTree {
    nodes: Vec<PendingNode>,
}

impl PendingTree {
    fn new() -> Self {
        PendingTree {
            nodes: vec![PendingNode::default()],
        }
    }

    fn child(&mut self, parent: NodeId, segment: &str) -> Result<NodeId> {
        let next = self.nodes.len();
        let node = self
            .nodes
            .get_mut(parent)
            .ok_or_else(|| Error::missing_parent(segment))?;
        let id = *node.children.entry(segment.to_string()).or_insert(next);
        if id == next {
            self.nodes.push(PendingNode::default());
        }
        Ok(id)
    }

    fn push(&mut self, node: NodeId, key: &str, leaf: String, value: Value) -> Result<()> {
        let node = self
            .nodes
            .get_mut(node)
            .ok_or_else(|| Error::missing_parent(key))?;
        node.writes.push(PendingWrite {
            key: key.to_string(),
            leaf,
            value,
        });
        Ok(())
    }

    fn is_empty(&self, id: NodeId) -> bool {
        self.nodes.get(id).map_or(true, |node| {
            node.writes.is_empty() && node.children.values().all(|&child| self.is_empty(child))
        })
    }

    /// Writes node `id` into `into`: its own leaves first, then every
    /// non-empty child as a nested object. A leaf landing on a key that is
    /// already taken is a [`Error::TypeMismatch`] at the writing field.
    fn flush(&mut self, id: NodeId, into: &mut Map, path: &str) -> Result<()> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Err(Error::missing_parent(path));
        };
        let writes = std::mem::take(&mut node.writes);
        let children = std::mem::take(&mut node.children);
        tracing::trace!(
            path,
            writes = writes.len(),
            children = children.len(),
            "flushing pending node"
        );

        for write in writes {
            if let Some(taken) = into.get(&write.leaf) {
                return Err(Error::type_mismatch(&write.key, "unused key", taken.kind()));
            }
            into.insert(write.leaf, write.value);
        }

        for (segment, child) in children {
            if self.is_empty(child) {
                continue;
            }
            let child_path = if path.is_empty() {
                segment.clone()
            } else {
                format!("{}.{}", path, segment)
            };
            let slot = into
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
            match slot {
                Value::Object(object) => self.flush(child, object, &child_path)?,
                other => {
                    return Err(Error::type_mismatch(&child_path, "object", other.kind()));
                }
            }
        }
        Ok(())
    }
}

/// Collects fields into a pending tree and flushes it into one object.
pub(crate) struct Encoder {
    out: Map,
    tree: PendingTree,
    cache: ContainerCache<NodeId>,
}

impl Encoder {
    pub(crate) fn new() -> Self {
        Encoder {
            out: Map::new(),
            tree: PendingTree::new(),
            cache: ContainerCache::new(ROOT),
        }
    }

    pub(crate) fn materialized(&self) -> usize {
        self.cache.materialized()
    }

    pub(crate) fn write<T>(
        &mut self,
        key: &str,
        options: &KeyOptions,
        shape: Shape,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = to_value(value).map_err(|err| err.at_with(key, joiner(options)))?;
        match Target::resolve(key, options, shape)? {
            Target::Flat => match value {
                Value::Object(object) => {
                    self.out.extend(object);
                    Ok(())
                }
                Value::Null => Ok(()),
                other => Err(Error::type_mismatch(key, "object", other.kind())),
            },
            Target::Keyed {
                containers, leaf, ..
            } => {
                let tree = &mut self.tree;
                let node = self
                    .cache
                    .resolve(&containers, |parent, segment| tree.child(*parent, segment))?;
                self.tree.push(node, key, leaf, value)
            }
        }
    }

    pub(crate) fn finish(mut self) -> Result<Map> {
        self.tree.flush(ROOT, &mut self.out, "")?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(fields: &[(&str, Value)]) -> Result<String> {
        let options = KeyOptions::new();
        let mut encoder = Encoder::new();
        for (key, value) in fields {
            encoder.write(key, &options, Shape::Required, value)?;
        }
        Ok(Value::Object(encoder.finish()?).to_string())
    }

    #[test]
    fn test_nested_paths_share_objects() {
        let json = encode(&[
            ("inner.details.description", Value::from("nice")),
            ("inner.name", Value::from("x")),
            ("greeting", Value::from("hi")),
        ])
        .unwrap();
        assert_eq!(
            json,
            r#"{"greeting":"hi","inner":{"name":"x","details":{"description":"nice"}}}"#
        );
    }

    #[test]
    fn test_flat_object_is_merged() {
        let mut inner = Map::new();
        inner.insert("a".to_string(), Value::from(1));
        let json = encode(&[("", Value::Object(inner)), ("b", Value::from(2))]).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_flat_scalar_is_rejected() {
        let err = encode(&[("", Value::from(1))]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_leaf_conflicting_with_container() {
        let err = encode(&[("a", Value::from(1)), ("a.b", Value::from(2))]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref path, .. } if path == "a"));
    }

    #[test]
    fn test_leaf_over_merged_key_fails() {
        let mut merged = Map::new();
        merged.insert("a".to_string(), Value::from(1));
        let err = encode(&[("", Value::Object(merged)), ("a", Value::from(2))]).unwrap_err();
        assert_eq!(err, Error::type_mismatch("a", "unused key", "number"));
    }

    #[test]
    fn test_repeated_leaf_fails_at_second_key() {
        let options = KeyOptions::new().with_delimiter('/');
        let mut encoder = Encoder::new();
        encoder
            .write("x/y", &options, Shape::Required, &Value::from(1))
            .unwrap();
        encoder
            .write("x/y", &options, Shape::Required, &Value::from(2))
            .unwrap();
        let err = encoder.finish().unwrap_err();
        assert_eq!(err.path(), Some("x/y"));
    }

    #[test]
    fn test_leaf_object_is_extended_by_child() {
        let mut existing = Map::new();
        existing.insert("x".to_string(), Value::from(1));
        let json = encode(&[("a", Value::Object(existing)), ("a.b", Value::from(2))]).unwrap();
        assert_eq!(json, r#"{"a":{"x":1,"b":2}}"#);
    }

    #[test]
    fn test_untouched_branches_are_omitted() {
        let mut tree = PendingTree::new();
        let user = tree.child(ROOT, "user").unwrap();
        tree.child(user, "address").unwrap();
        let mut out = Map::new();
        tree.flush(ROOT, &mut out, "").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_containers_materialized_once() {
        let options = KeyOptions::new();
        let mut encoder = Encoder::new();
        for key in ["a.b.c", "a.b.d", "a.e"] {
            encoder
                .write(key, &options, Shape::Required, &Value::Null)
                .unwrap();
        }
        assert_eq!(encoder.materialized(), 2);
    }
}
