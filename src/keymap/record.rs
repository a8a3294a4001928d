use super::{Shape, Target};
use crate::graph::{self, Graph};
use crate::options::KeyOptions;
use crate::zero::{zero_value, ZeroMode};
use crate::Result;
use serde::de::DeserializeOwned;

/// Records the key path of every mapped field into a [`Graph`].
pub(crate) struct Recorder {
    graph: Graph,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Recorder {
            graph: Graph::new(),
        }
    }

    /// Records `key` and, below it, the keys that a value of type `T` reads.
    ///
    /// `T` is built as a populated zero instance inside a capture, so keyed
    /// types and structs it contains deposit their own keys; array elements
    /// add no index segment.
    pub(crate) fn record<T>(
        &mut self,
        key: &str,
        options: &KeyOptions,
        shape: Shape,
    ) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let path = match Target::resolve(key, options, shape)? {
            Target::Flat => Vec::new(),
            Target::Keyed {
                mut containers,
                leaf,
                ..
            } => {
                containers.push(leaf);
                containers
            }
        };
        let (_, nested) = graph::capture(|| zero_value::<T>(ZeroMode::Populated))?;
        tracing::trace!(key, depth = path.len(), "recording key path");
        self.graph.graft(&path, nested);
        Ok(())
    }

    /// Records `key` alone, for fields whose inner keys are only known from
    /// input.
    pub(crate) fn record_leaf(&mut self, key: &str, options: &KeyOptions) -> Result<()> {
        if let Target::Keyed {
            mut containers,
            leaf,
            ..
        } = Target::resolve(key, options, Shape::Optional)?
        {
            containers.push(leaf);
            self.graph.graft(&containers, Graph::new());
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Graph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_stripped_from_array_keys() {
        let options = KeyOptions::legacy();
        let mut recorder = Recorder::new();
        recorder
            .record::<Vec<i32>>("feed.* items", &options, Shape::Array)
            .unwrap();
        recorder
            .record::<String>("feed.title", &options, Shape::Required)
            .unwrap();
        let graph = recorder.finish();
        assert!(graph.contains(&["feed", "items"]));
        assert_eq!(graph.to_string(), "{\n  feed {\n    items\n    title\n  }\n}");
    }

    #[test]
    fn test_flat_scalar_adds_nothing() {
        let mut recorder = Recorder::new();
        recorder
            .record::<i32>("", &KeyOptions::new(), Shape::Optional)
            .unwrap();
        recorder.record_leaf("", &KeyOptions::new()).unwrap();
        assert!(recorder.finish().is_empty());
    }
}
