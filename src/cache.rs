//! Prefix-keyed cache of nested containers.
//!
//! Decoding and encoding both walk a path down a tree of containers. The
//! cache remembers every prefix it has already resolved, so sibling fields
//! sharing a parent (`"user.name"`, `"user.age"`) open that parent once.
//! The container handle is generic: decoding caches borrowed objects,
//! encoding caches pending tree node ids.

use crate::error::{Error, Result};
use std::collections::HashMap;

const SEPARATOR: char = '\u{1f}';

/// Memoizes the container reached by each path prefix.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::ContainerCache;
///
/// let mut cache = ContainerCache::new(String::new());
/// let open = |parent: &String, segment: &str| Ok(format!("{}/{}", parent, segment));
///
/// let segments = vec!["a".to_string(), "b".to_string()];
/// assert_eq!(cache.resolve(&segments, open).unwrap(), "/a/b");
/// assert_eq!(cache.resolve(&segments[..1], open).unwrap(), "/a");
/// assert_eq!(cache.materialized(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ContainerCache<C> {
    entries: HashMap<String, C>,
    materialized: usize,
}

impl<C: Clone> ContainerCache<C> {
    /// Creates a cache whose empty prefix resolves to `root`.
    #[must_use]
    pub fn new(root: C) -> Self {
        let mut entries = HashMap::new();
        entries.insert(String::new(), root);
        ContainerCache {
            entries,
            materialized: 0,
        }
    }

    /// Resolves the container addressed by `segments`.
    ///
    /// Starts from the deepest prefix already cached and calls `open` once
    /// for each missing level, caching every container it returns. An error
    /// from `open` is returned as is and nothing is cached for that level.
    pub fn resolve<F>(&mut self, segments: &[String], mut open: F) -> Result<C>
    where
        F: FnMut(&C, &str) -> Result<C>,
    {
        let keys = prefix_keys(segments);
        let cached = (0..keys.len())
            .rev()
            .find(|&depth| self.entries.contains_key(&keys[depth]))
            .ok_or_else(|| Error::missing_parent(""))?;

        for depth in cached + 1..keys.len() {
            let parent = self
                .entries
                .get(&keys[depth - 1])
                .ok_or_else(|| Error::missing_parent(&segments[..depth - 1].join(".")))?;
            let child = open(parent, &segments[depth - 1])?;
            tracing::trace!(
                path = %segments[..depth].join("."),
                "materialized container"
            );
            self.entries.insert(keys[depth].clone(), child);
            self.materialized += 1;
        }

        self.entries
            .get(&keys[keys.len() - 1])
            .cloned()
            .ok_or_else(|| Error::missing_parent(&segments.join(".")))
    }

    /// Looks up an already resolved container without opening anything.
    #[must_use]
    pub fn get(&self, segments: &[String]) -> Option<&C> {
        let keys = prefix_keys(segments);
        keys.last().and_then(|key| self.entries.get(key))
    }

    /// Number of containers opened since the cache was created.
    #[must_use]
    pub fn materialized(&self) -> usize {
        self.materialized
    }
}

// Keys for the prefixes of `segments`, shortest first. Each segment is
// terminated by the separator so the root and a lone empty segment differ.
fn prefix_keys(segments: &[String]) -> Vec<String> {
    let mut keys = Vec::with_capacity(segments.len() + 1);
    let mut key = String::new();
    keys.push(key.clone());
    for segment in segments {
        key.push_str(segment);
        key.push(SEPARATOR);
        keys.push(key.clone());
    }
    keys
}
