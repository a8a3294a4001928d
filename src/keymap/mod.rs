//! The field mapper handed to [`Keyed::map`](crate::Keyed::map).
//!
//! A [`KeyMap`] runs in one of four directions. Decoding reads each field
//! out of a JSON object, encoding collects each field into a pending tree
//! that becomes the output object, and zero mode fills every field with a
//! neutral value. Graph mode leaves the fields alone and records their key
//! paths (see [`build_graph`](crate::build_graph)). The mapping routine is
//! the same in all of them, so a type's layout is written once.
//!
//! ## Field shapes
//!
//! | Method | Field type | Absent on decode | `None` on encode |
//! |---|---|---|---|
//! | [`field`](KeyMap::field) | `T` | error | n/a |
//! | [`optional`](KeyMap::optional) | `Option<T>` | left unchanged | key omitted |
//! | [`array`](KeyMap::array) | `Vec<T>` | error | n/a |
//! | [`optional_array`](KeyMap::optional_array) | `Option<Vec<T>>` | unchanged, or `Some(vec![])` when tolerant | key omitted |
//! | [`tolerant_map`](KeyMap::tolerant_map) | `IndexMap<K, T>` | empty | n/a |
//!
//! Array keys whose leaf starts with the optional-array prefix (legacy
//! default `"* "`) are tolerant: elements that fail to decode are dropped.

mod decode;
mod encode;
mod record;

pub(crate) use decode::Decoder;
pub(crate) use encode::Encoder;
pub(crate) use record::Recorder;

use crate::graph::Graph;
use crate::options::KeyOptions;
use crate::path::Path;
use crate::ser::to_value;
use crate::transform::Transformer;
use crate::zero::{zero_value, ZeroMode};
use crate::{Error, Map, Result, Value};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::hash::Hash;

/// The direction a [`KeyMap`] runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingType {
    Decoding,
    Encoding,
    Zero(ZeroMode),
    /// Recording key paths; fields are left untouched.
    Graph,
}

/// Requested shape of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Shape {
    Required,
    Optional,
    Array,
    OptionalArray,
}

impl Shape {
    fn is_array(self) -> bool {
        matches!(self, Shape::Array | Shape::OptionalArray)
    }
}

/// Where a field key points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    /// The object currently being mapped.
    Flat,
    Keyed {
        containers: Vec<String>,
        leaf: String,
        tolerant: bool,
    },
}

impl Target {
    /// Resolves `key` under `options` for a field of the given shape.
    pub(crate) fn resolve(key: &str, options: &KeyOptions, shape: Shape) -> Result<Target> {
        if options.is_flat(key) {
            return Ok(Target::Flat);
        }

        let prefix = if shape.is_array() {
            options.optional_array_prefix.as_deref()
        } else {
            None
        };
        if let (Some(prefix), Some(delimiter)) = (prefix, options.delimiter.as_char()) {
            if prefix.contains(delimiter) {
                return Err(Error::path_parse(
                    key,
                    "optional array prefix contains the path delimiter",
                ));
            }
        }

        let mut path = Path::parse(key, options);
        if options.is_first_segment_flat(&path) {
            path = path.without_first();
        }
        let (containers, mut leaf) = path.into_parts();

        let mut tolerant = false;
        if let Some(stripped) = prefix.and_then(|prefix| leaf.strip_prefix(prefix)) {
            if stripped.is_empty() {
                return Err(Error::path_parse(
                    key,
                    "optional array prefix leaves an empty key",
                ));
            }
            leaf = stripped.to_string();
            tolerant = true;
        }

        Ok(Target::Keyed {
            containers,
            leaf,
            tolerant,
        })
    }
}

/// Character joining a field key with paths reported from inside its value.
pub(crate) fn joiner(options: &KeyOptions) -> char {
    options.delimiter.as_char().unwrap_or('.')
}

enum Backend<'a> {
    Decode(Decoder<'a>),
    Encode(Encoder),
    Zero(ZeroMode),
    Graph(Recorder),
}

/// Maps the fields of one object.
///
/// Every method comes in two forms: the short one uses the default
/// [`KeyOptions`], the `_with` one takes options for that field only.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::{decode_keyed, KeyMap, Keyed, Result};
///
/// #[derive(Default, Clone)]
/// struct Reading {
///     sensor: String,
///     samples: Vec<f64>,
/// }
///
/// impl Keyed for Reading {
///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
///         let slash = map.default_options().with_delimiter('/');
///         map.field_with(&mut self.sensor, "meta/sensor", &slash)?;
///         map.array(&mut self.samples, "samples")
///     }
/// }
///
/// let reading: Reading = decode_keyed(r#"{"meta":{"sensor":"t1"},"samples":[1.5,2.0]}"#).unwrap();
/// assert_eq!(reading.sensor, "t1");
/// assert_eq!(reading.samples, vec![1.5, 2.0]);
/// ```
pub struct KeyMap<'a> {
    backend: Backend<'a>,
    options: &'a KeyOptions,
}

impl<'a> KeyMap<'a> {
    pub(crate) fn decoding(object: &'a Map, options: &'a KeyOptions) -> Self {
        KeyMap {
            backend: Backend::Decode(Decoder::new(object)),
            options,
        }
    }

    pub(crate) fn encoding(options: &'a KeyOptions) -> Self {
        KeyMap {
            backend: Backend::Encode(Encoder::new()),
            options,
        }
    }

    pub(crate) fn zero(mode: ZeroMode, options: &'a KeyOptions) -> Self {
        KeyMap {
            backend: Backend::Zero(mode),
            options,
        }
    }

    pub(crate) fn graph(options: &'a KeyOptions) -> Self {
        KeyMap {
            backend: Backend::Graph(Recorder::new()),
            options,
        }
    }

    /// Flushes the pending tree into the encoded object.
    pub(crate) fn finish(self) -> Result<Map> {
        match self.backend {
            Backend::Encode(encoder) => encoder.finish(),
            Backend::Decode(_) | Backend::Zero(_) | Backend::Graph(_) => Ok(Map::new()),
        }
    }

    /// The key paths recorded in graph mode.
    pub(crate) fn into_graph(self) -> Graph {
        match self.backend {
            Backend::Graph(recorder) => recorder.finish(),
            Backend::Decode(_) | Backend::Encode(_) | Backend::Zero(_) => Graph::new(),
        }
    }

    #[must_use]
    pub fn mapping_type(&self) -> MappingType {
        match &self.backend {
            Backend::Decode(_) => MappingType::Decoding,
            Backend::Encode(_) => MappingType::Encoding,
            Backend::Zero(mode) => MappingType::Zero(*mode),
            Backend::Graph(_) => MappingType::Graph,
        }
    }

    #[must_use]
    pub fn is_decoding(&self) -> bool {
        matches!(self.backend, Backend::Decode(_))
    }

    /// The options used by the methods without a `_with` suffix.
    #[must_use]
    pub fn default_options(&self) -> KeyOptions {
        self.options.clone()
    }

    /// Number of nested containers opened so far.
    #[must_use]
    pub fn materialized(&self) -> usize {
        match &self.backend {
            Backend::Decode(decoder) => decoder.materialized(),
            Backend::Encode(encoder) => encoder.materialized(),
            Backend::Zero(_) | Backend::Graph(_) => 0,
        }
    }

    /// Maps a required field.
    ///
    /// # Errors
    ///
    /// On decode, [`Error::MissingRequiredKey`] if the key or one of its
    /// containers is absent, and [`Error::TypeMismatch`] if the value has
    /// the wrong type.
    pub fn field<T>(&mut self, field: &mut T, key: &str) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let options = self.options;
        self.field_with(field, key, options)
    }

    pub fn field_with<T>(&mut self, field: &mut T, key: &str, options: &KeyOptions) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        match &mut self.backend {
            Backend::Decode(decoder) => {
                *field = decoder.required(key, options, Shape::Required)?;
            }
            Backend::Encode(encoder) => encoder.write(key, options, Shape::Required, &*field)?,
            Backend::Zero(mode) => *field = zero_value(*mode)?,
            Backend::Graph(recorder) => recorder.record::<T>(key, options, Shape::Required)?,
        }
        Ok(())
    }

    /// Maps an optional field: absent or `null` leaves it unchanged on
    /// decode, and `None` writes nothing on encode.
    pub fn optional<T>(&mut self, field: &mut Option<T>, key: &str) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let options = self.options;
        self.optional_with(field, key, options)
    }

    pub fn optional_with<T>(
        &mut self,
        field: &mut Option<T>,
        key: &str,
        options: &KeyOptions,
    ) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        match &mut self.backend {
            Backend::Decode(decoder) => {
                if let Some(value) = decoder.optional(key, options)? {
                    *field = Some(value);
                }
            }
            Backend::Encode(encoder) => {
                if let Some(value) = field {
                    encoder.write(key, options, Shape::Optional, &*value)?;
                }
            }
            Backend::Zero(ZeroMode::Minimum) => *field = None,
            Backend::Zero(mode) => *field = Some(zero_value(*mode)?),
            Backend::Graph(recorder) => recorder.record::<T>(key, options, Shape::Optional)?,
        }
        Ok(())
    }

    /// Maps a required array.
    ///
    /// With a tolerant key, elements that fail to decode are skipped and the
    /// rest keep their order.
    pub fn array<T>(&mut self, field: &mut Vec<T>, key: &str) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let options = self.options;
        self.array_with(field, key, options)
    }

    pub fn array_with<T>(
        &mut self,
        field: &mut Vec<T>,
        key: &str,
        options: &KeyOptions,
    ) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        match &mut self.backend {
            Backend::Decode(decoder) => *field = decoder.array(key, options)?,
            Backend::Encode(encoder) => encoder.write(key, options, Shape::Array, &*field)?,
            Backend::Zero(mode) => *field = zero_value(*mode)?,
            Backend::Graph(recorder) => recorder.record::<Vec<T>>(key, options, Shape::Array)?,
        }
        Ok(())
    }

    /// Maps an optional array. An absent tolerant array decodes as empty.
    pub fn optional_array<T>(&mut self, field: &mut Option<Vec<T>>, key: &str) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let options = self.options;
        self.optional_array_with(field, key, options)
    }

    pub fn optional_array_with<T>(
        &mut self,
        field: &mut Option<Vec<T>>,
        key: &str,
        options: &KeyOptions,
    ) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        match &mut self.backend {
            Backend::Decode(decoder) => {
                if let Some(values) = decoder.optional_array(key, options)? {
                    *field = Some(values);
                }
            }
            Backend::Encode(encoder) => {
                if let Some(values) = field {
                    encoder.write(key, options, Shape::OptionalArray, &*values)?;
                }
            }
            Backend::Zero(ZeroMode::Minimum) => *field = None,
            Backend::Zero(mode) => *field = Some(zero_value(*mode)?),
            Backend::Graph(recorder) => {
                recorder.record::<Vec<T>>(key, options, Shape::OptionalArray)?;
            }
        }
        Ok(())
    }

    /// Maps a required field through a [`Transformer`].
    ///
    /// # Errors
    ///
    /// [`Error::TransformFailed`] if the transformer rejects the value, in
    /// addition to the errors of [`field`](KeyMap::field). In zero mode a
    /// rejected zero source leaves the field as it is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use serde_keyed::{decode_keyed, IsoDate, KeyMap, Keyed, Result};
    ///
    /// #[derive(Default, Clone)]
    /// struct Event {
    ///     day: NaiveDate,
    /// }
    ///
    /// impl Keyed for Event {
    ///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
    ///         map.transformed::<IsoDate>(&mut self.day, "day")
    ///     }
    /// }
    ///
    /// let event: Event = decode_keyed(r#"{"day":"2012-05-01"}"#).unwrap();
    /// assert_eq!(event.day, NaiveDate::from_ymd_opt(2012, 5, 1).unwrap());
    /// ```
    pub fn transformed<X>(&mut self, field: &mut X::Object, key: &str) -> Result<()>
    where
        X: Transformer,
    {
        let options = self.options;
        self.transformed_with::<X>(field, key, options)
    }

    pub fn transformed_with<X>(
        &mut self,
        field: &mut X::Object,
        key: &str,
        options: &KeyOptions,
    ) -> Result<()>
    where
        X: Transformer,
    {
        match &mut self.backend {
            Backend::Decode(decoder) => {
                let source: X::Source = decoder.required(key, options, Shape::Required)?;
                *field = X::decode(source).ok_or_else(|| Error::transform_failed(key))?;
            }
            Backend::Encode(encoder) => {
                let source = X::encode(field).ok_or_else(|| Error::transform_failed(key))?;
                encoder.write(key, options, Shape::Required, &source)?;
            }
            Backend::Zero(mode) => {
                if let Some(object) = X::decode(zero_value(*mode)?) {
                    *field = object;
                }
            }
            Backend::Graph(recorder) => {
                recorder.record::<X::Source>(key, options, Shape::Required)?;
            }
        }
        Ok(())
    }

    /// Maps an optional field through a [`Transformer`]. `None` is skipped
    /// on encode; an absent key leaves the field unchanged on decode.
    pub fn transformed_optional<X>(
        &mut self,
        field: &mut Option<X::Object>,
        key: &str,
    ) -> Result<()>
    where
        X: Transformer,
    {
        let options = self.options;
        self.transformed_optional_with::<X>(field, key, options)
    }

    pub fn transformed_optional_with<X>(
        &mut self,
        field: &mut Option<X::Object>,
        key: &str,
        options: &KeyOptions,
    ) -> Result<()>
    where
        X: Transformer,
    {
        match &mut self.backend {
            Backend::Decode(decoder) => {
                if let Some(source) = decoder.optional::<X::Source>(key, options)? {
                    let object = X::decode(source).ok_or_else(|| Error::transform_failed(key))?;
                    *field = Some(object);
                }
            }
            Backend::Encode(encoder) => {
                if let Some(object) = field {
                    let source = X::encode(object).ok_or_else(|| Error::transform_failed(key))?;
                    encoder.write(key, options, Shape::Optional, &source)?;
                }
            }
            Backend::Zero(ZeroMode::Minimum) => *field = None,
            Backend::Zero(mode) => {
                if let Some(object) = X::decode(zero_value(*mode)?) {
                    *field = Some(object);
                }
            }
            Backend::Graph(recorder) => {
                recorder.record::<X::Source>(key, options, Shape::Optional)?;
            }
        }
        Ok(())
    }

    /// Maps a dictionary whose entries decode one by one: an entry whose
    /// name does not decode as `K` or whose value does not decode as `T` is
    /// dropped, and the rest keep document order.
    ///
    /// Names decode from their string form, so `K` can be `String`, a
    /// unit-variant enum or an integer. An absent object decodes as an empty
    /// map; encoding writes a plain object.
    ///
    /// # Errors
    ///
    /// On decode, [`Error::TypeMismatch`] if the value at `key` is present
    /// but not an object. On encode, [`Error::TypeMismatch`] if a name does
    /// not serialize to a string or number.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyed::{decode_keyed, IndexMap, KeyMap, Keyed, Result};
    ///
    /// #[derive(Default, Clone)]
    /// struct Labels {
    ///     labels: IndexMap<String, String>,
    /// }
    ///
    /// impl Keyed for Labels {
    ///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
    ///         map.tolerant_map(&mut self.labels, "i18n.labels")
    ///     }
    /// }
    ///
    /// let json = r#"{"i18n":{"labels":{"ok":"OK","rich":[{"text":"x"}],"no":"No"}}}"#;
    /// let labels: Labels = decode_keyed(json).unwrap();
    /// assert_eq!(labels.labels.keys().collect::<Vec<_>>(), ["ok", "no"]);
    /// ```
    pub fn tolerant_map<K, T>(&mut self, field: &mut IndexMap<K, T>, key: &str) -> Result<()>
    where
        K: Serialize + DeserializeOwned + Eq + Hash,
        T: Serialize + DeserializeOwned,
    {
        let options = self.options;
        self.tolerant_map_with(field, key, options)
    }

    pub fn tolerant_map_with<K, T>(
        &mut self,
        field: &mut IndexMap<K, T>,
        key: &str,
        options: &KeyOptions,
    ) -> Result<()>
    where
        K: Serialize + DeserializeOwned + Eq + Hash,
        T: Serialize + DeserializeOwned,
    {
        match &mut self.backend {
            Backend::Decode(decoder) => *field = decoder.tolerant_map(key, options)?,
            Backend::Encode(encoder) => {
                let mut object = Map::with_capacity(field.len());
                for (name, value) in field.iter() {
                    let name = match to_value(name)? {
                        Value::String(name) => name,
                        Value::Number(number) => number.to_string(),
                        other => {
                            return Err(Error::type_mismatch(key, "string key", other.kind()));
                        }
                    };
                    object.insert(name, to_value(value)?);
                }
                encoder.write(key, options, Shape::Required, &Value::Object(object))?;
            }
            Backend::Zero(_) => field.clear(),
            Backend::Graph(recorder) => recorder.record_leaf(key, options)?,
        }
        Ok(())
    }

    /// Lists the keys of the object at `key`, each joined back onto `key`
    /// with the delimiter (`"vault.0"`), in document order.
    ///
    /// A flat key lists the keys of the current object unprefixed. An absent
    /// object or a value that is not an object yields an empty list, and so
    /// does every call outside decoding. The result is meant for per-key
    /// decoding that skips failures.
    ///
    /// # Errors
    ///
    /// [`Error::PathParseFailed`] for a non-flat key when the options have
    /// no delimiter to join with.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_keyed::{decode_keyed, KeyMap, Keyed, Result};
    ///
    /// #[derive(Default, Clone)]
    /// struct Vault {
    ///     cards: Vec<String>,
    /// }
    ///
    /// impl Keyed for Vault {
    ///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
    ///         for key in map.all_keys("vault")? {
    ///             let mut card: Option<String> = None;
    ///             if map.optional(&mut card, &key).is_ok() {
    ///                 self.cards.extend(card);
    ///             }
    ///         }
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let vault: Vault = decode_keyed(r#"{"vault":{"0":"visa","1":"amex","limit":5}}"#).unwrap();
    /// assert_eq!(vault.cards, ["visa", "amex"]);
    /// ```
    pub fn all_keys(&mut self, key: &str) -> Result<Vec<String>> {
        let options = self.options;
        self.all_keys_with(key, options)
    }

    pub fn all_keys_with(&mut self, key: &str, options: &KeyOptions) -> Result<Vec<String>> {
        match &mut self.backend {
            Backend::Decode(decoder) => decoder.all_keys(key, options),
            Backend::Encode(_) | Backend::Zero(_) | Backend::Graph(_) => Ok(Vec::new()),
        }
    }
}
