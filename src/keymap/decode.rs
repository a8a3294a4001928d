use super::{joiner, Shape, Target};
use crate::cache::ContainerCache;
use crate::de::from_value;
use crate::options::KeyOptions;
use crate::path::Path;
use crate::{Error, Map, Result, Value};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::hash::Hash;

/// Reads fields out of one JSON object.
pub(crate) struct Decoder<'a> {
    object: &'a Map,
    cache: ContainerCache<&'a Map>,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(object: &'a Map) -> Self {
        Decoder {
            object,
            cache: ContainerCache::new(object),
        }
    }

    pub(crate) fn materialized(&self) -> usize {
        self.cache.materialized()
    }

    /// The object at `segments`, or `None` if one of them is absent or null.
    fn container(&mut self, key: &str, segments: &[String]) -> Result<Option<&'a Map>> {
        let resolved = self.cache.resolve(segments, |parent, segment| {
            let parent: &'a Map = *parent;
            match parent.get(segment) {
                None | Some(Value::Null) => Err(Error::missing_key(key)),
                Some(Value::Object(child)) => Ok(child),
                Some(other) => Err(Error::type_mismatch(key, "object", other.kind())),
            }
        });
        match resolved {
            Ok(container) => Ok(Some(container)),
            Err(Error::MissingRequiredKey { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// The value stored at `leaf` under `containers`; absent and null
    /// values both come back as `None`.
    fn lookup(
        &mut self,
        key: &str,
        containers: &[String],
        leaf: &str,
    ) -> Result<Option<&'a Value>> {
        let found = self
            .container(key, containers)?
            .and_then(|container| container.get(leaf))
            .filter(|value| !value.is_null());
        Ok(found)
    }

    fn current(&self) -> Value {
        Value::Object(self.object.clone())
    }

    pub(crate) fn required<T>(
        &mut self,
        key: &str,
        options: &KeyOptions,
        shape: Shape,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match Target::resolve(key, options, shape)? {
            Target::Flat => read(self.current(), key, options),
            Target::Keyed {
                containers, leaf, ..
            } => {
                let container = self
                    .container(key, &containers)?
                    .ok_or_else(|| Error::missing_key(key))?;
                match container.get(&leaf) {
                    Some(value) => read(value.clone(), key, options),
                    None => Err(Error::missing_key(key)),
                }
            }
        }
    }

    pub(crate) fn optional<T>(&mut self, key: &str, options: &KeyOptions) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match Target::resolve(key, options, Shape::Optional)? {
            Target::Flat => Ok(read(self.current(), key, options).ok()),
            Target::Keyed {
                containers, leaf, ..
            } => match self.lookup(key, &containers, &leaf)? {
                Some(value) => read(value.clone(), key, options).map(Some),
                None => Ok(None),
            },
        }
    }

    pub(crate) fn array<T>(&mut self, key: &str, options: &KeyOptions) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        match Target::resolve(key, options, Shape::Array)? {
            Target::Keyed {
                containers,
                leaf,
                tolerant: true,
            } => match self.lookup(key, &containers, &leaf)? {
                Some(value) => tolerant_elements(value, key),
                None => Err(Error::missing_key(key)),
            },
            _ => self.required(key, options, Shape::Array),
        }
    }

    pub(crate) fn optional_array<T>(
        &mut self,
        key: &str,
        options: &KeyOptions,
    ) -> Result<Option<Vec<T>>>
    where
        T: DeserializeOwned,
    {
        match Target::resolve(key, options, Shape::OptionalArray)? {
            Target::Keyed {
                containers,
                leaf,
                tolerant: true,
            } => match self.lookup(key, &containers, &leaf)? {
                Some(value) => tolerant_elements(value, key).map(Some),
                None => Ok(Some(Vec::new())),
            },
            _ => self.optional(key, options),
        }
    }

    /// Entries of the object at `key` whose name and value both decode.
    /// An absent or null object has no entries.
    pub(crate) fn tolerant_map<K, T>(
        &mut self,
        key: &str,
        options: &KeyOptions,
    ) -> Result<IndexMap<K, T>>
    where
        K: DeserializeOwned + Eq + Hash,
        T: DeserializeOwned,
    {
        let object = match Target::resolve(key, options, Shape::Optional)? {
            Target::Flat => self.object,
            Target::Keyed {
                containers, leaf, ..
            } => match self.lookup(key, &containers, &leaf)? {
                Some(Value::Object(object)) => object,
                Some(other) => return Err(Error::type_mismatch(key, "object", other.kind())),
                None => return Ok(IndexMap::new()),
            },
        };
        Ok(object
            .iter()
            .filter_map(|(name, value)| {
                let name = entry_name(name)?;
                let value = from_value(value.clone()).ok()?;
                Some((name, value))
            })
            .collect())
    }

    pub(crate) fn all_keys(&mut self, key: &str, options: &KeyOptions) -> Result<Vec<String>> {
        if options.is_flat(key) {
            return Ok(self.object.keys().cloned().collect());
        }
        let delimiter = options.delimiter.as_char().ok_or_else(|| {
            Error::path_parse(key, "cannot join child keys without a delimiter")
        })?;

        let path = Path::parse(key, options);
        let segments = if options.is_first_segment_flat(&path) {
            path.without_first()
        } else {
            path
        };
        let container = match self.container(key, segments.segments()) {
            Ok(Some(container)) => container,
            Ok(None) | Err(Error::TypeMismatch { .. }) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        Ok(container
            .keys()
            .map(|child| format!("{}{}{}", key, delimiter, child))
            .collect())
    }
}

fn read<T: DeserializeOwned>(value: Value, key: &str, options: &KeyOptions) -> Result<T> {
    from_value(value).map_err(|err| err.at_with(key, joiner(options)))
}

/// Decodes an object key as `K`: first as the string itself, then, for keys
/// like `"7"`, as the number it spells.
fn entry_name<K: DeserializeOwned>(name: &str) -> Option<K> {
    from_value(Value::String(name.to_string()))
        .ok()
        .or_else(|| {
            let number: Value = serde_json::from_str(name).ok()?;
            if number.is_number() {
                from_value(number).ok()
            } else {
                None
            }
        })
}

fn tolerant_elements<T: DeserializeOwned>(value: &Value, key: &str) -> Result<Vec<T>> {
    match value {
        Value::Array(elements) => Ok(elements
            .iter()
            .filter_map(|element| from_value(element.clone()).ok())
            .collect()),
        other => Err(Error::type_mismatch(key, "array", other.kind())),
    }
}
