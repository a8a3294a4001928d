//! # serde_keyed
//!
//! Declarative, path-addressed mapping between JSON and Rust types.
//!
//! A type implementing [`Keyed`] lists its fields once, each with a
//! delimited path into the JSON tree (`"data.user.address"`). The same
//! listing decodes the type, encodes it back into the same nested shape, and
//! builds a neutral "zero" instance of it.
//!
//! ## Key Features
//!
//! - **Key paths**: `"inner.details.description"` reads and writes
//!   `{"inner":{"details":{"description":…}}}`; the delimiter is configurable
//!   per field or can be turned off
//! - **Flattening**: a blank key maps a field onto the current object, so a
//!   sub-object's fields sit beside their siblings
//! - **Tolerant arrays**: with an optional-array prefix (`"* list"`), array
//!   elements that fail to decode are dropped instead of failing the whole
//!   decode
//! - **Dynamic keys**: [`KeyMap::all_keys`] lists the keys of an object so
//!   each entry can be decoded on its own, and [`KeyMap::tolerant_map`]
//!   decodes a whole dictionary while dropping entries that fail
//! - **Zero values**: [`zero`] builds an instance with every field neutral
//! - **Key graphs**: [`build_graph`] lists every key path a type reads as a
//!   tree, ready to render as a query selection set
//! - **Transformers**: [`Transformer`] converts a JSON representation into a
//!   domain object, e.g. [`IsoDate`]
//! - **Serde compatible**: leaf fields are any `Serialize + Deserialize`
//!   type, and [`impl_keyed_serde!`] makes keyed types usable as serde types
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_keyed::{decode_keyed, encode_keyed, KeyMap, Keyed, Result};
//!
//! #[derive(Default, Clone, Debug, PartialEq)]
//! struct Example {
//!     greeting: String,
//!     description: String,
//!     count: Option<i32>,
//! }
//!
//! impl Keyed for Example {
//!     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
//!         map.field(&mut self.greeting, "greeting")?;
//!         map.field(&mut self.description, "inner.details.description")?;
//!         map.optional(&mut self.count, "inner.count")
//!     }
//! }
//!
//! let json = r#"{"greeting":"hallo","inner":{"details":{"description":"nice"}}}"#;
//! let example: Example = decode_keyed(json).unwrap();
//! assert_eq!(example.description, "nice");
//! assert_eq!(example.count, None);
//!
//! // Encoding rebuilds the same nesting; `None` leaves no key behind
//! assert_eq!(encode_keyed(&example).unwrap(), json);
//! ```
//!
//! ### Flattening and tolerant arrays
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_keyed::{decode_keyed, KeyMap, KeyOptions, Keyed, Result};
//!
//! #[derive(Default, Clone, Serialize, Deserialize)]
//! struct Location { latitude: f64, longitude: f64 }
//!
//! #[derive(Default, Clone)]
//! struct Place {
//!     name: String,
//!     location: Location,
//!     ratings: Vec<u8>,
//! }
//!
//! impl Keyed for Place {
//!     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
//!         let legacy = KeyOptions::legacy();
//!         map.field(&mut self.name, "name")?;
//!         map.field(&mut self.location, "")?;
//!         map.array_with(&mut self.ratings, "* ratings", &legacy)
//!     }
//! }
//!
//! let json = r#"{"name":"Pier","latitude":59.9,"longitude":10.7,"ratings":[5,"bad",4]}"#;
//! let place: Place = decode_keyed(json).unwrap();
//! assert_eq!(place.location.latitude, 59.9);
//! assert_eq!(place.ratings, vec![5, 4]);
//! ```
//!
//! ### Dynamic values with the value! macro
//!
//! ```rust
//! use serde_keyed::{value, Value};
//!
//! let data = value!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"]
//! });
//!
//! if let Value::Object(obj) = data {
//!     assert_eq!(obj.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! }
//! ```
//!
//! ## Errors
//!
//! Every failure is an [`Error`] naming the field path it happened at:
//! a missing required key, a value of the wrong type, a rejected transform,
//! or a key that cannot be split into a path.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`payment_methods.rs`** - Dynamic keys and tolerant decoding of a vault
//! - **`zero_values.rs`** - Building placeholder instances
//!
//! Run any example with: `cargo run --example <name>`

pub mod cache;
pub mod config;
pub mod de;
pub mod error;
pub mod graph;
pub mod keyed;
pub mod keymap;
pub mod macros;
pub mod map;
pub mod options;
pub mod path;
pub mod ser;
pub mod transform;
pub mod value;
pub mod zero;

pub use cache::ContainerCache;
pub use config::{decode_json, encode_json, DecodeFn, EncodeFn, KeyedConfig};
pub use de::{from_value, ValueDeserializer};
pub use error::{Error, Result};
pub use graph::Graph;
pub use keyed::Keyed;
pub use keymap::{KeyMap, MappingType};
pub use map::Map;
pub use options::{Delimiter, Flatten, KeyOptions};
pub use path::Path;
pub use ser::{to_value, ValueSerializer};
pub use transform::{IsoDate, Transformer};
pub use value::{Number, Value};
pub use zero::{zero_value, ZeroDeserializer, ZeroMode};

pub use indexmap::IndexMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

#[doc(hidden)]
pub mod __private {
    pub use crate::keyed::{deserialize_keyed, serialize_keyed};
    pub use serde;
}

/// Deserialize an instance of type `T` from a string of JSON text.
///
/// Text that is not JSON and does not start like an object, array or
/// string is read as a bare string.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::from_str;
///
/// let numbers: Vec<f64> = from_str("[1, 2.5]").unwrap();
/// assert_eq!(numbers, vec![1.0, 2.5]);
///
/// let word: String = from_str("domek").unwrap();
/// assert_eq!(word, "domek");
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed JSON or cannot be
/// deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice(s.as_bytes())
}

/// Like [`from_str`], parsing with the decoder of `config`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with<T>(s: &str, config: &KeyedConfig) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice_with(s.as_bytes(), config)
}

/// Deserialize an instance of type `T` from bytes of JSON text.
///
/// # Errors
///
/// Returns an error if the bytes are malformed JSON or cannot be
/// deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice_with(v, KeyedConfig::global())
}

/// Like [`from_slice`], with `config` applying to every keyed type inside `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice_with<T>(v: &[u8], config: &KeyedConfig) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = (config.decoder)(v)?;
    keyed::scoped(config, || from_value(value))
}

/// Deserialize an instance of type `T` from an I/O stream of JSON.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::from_reader;
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(b"[1, 2, 3]");
/// let numbers: Vec<u8> = from_reader(cursor).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, or the data cannot be
/// deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_slice(&bytes)
}

/// Serialize any `T: Serialize` to a JSON string.
///
/// Output is compact unless the global config asks for pretty output.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), r#"{"x":1,"y":2}"#);
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with(value, KeyedConfig::global())
}

/// Serialize any `T: Serialize` to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let config = KeyedConfig::global();
    let value = keyed::scoped(config, || to_value(value))?;
    into_string((config.encoder)(&value, true)?)
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with<T>(value: &T, config: &KeyedConfig) -> Result<String>
where
    T: ?Sized + Serialize,
{
    into_string(to_vec_with(value, config)?)
}

/// Serialize any `T: Serialize` to JSON bytes.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_vec_with(value, KeyedConfig::global())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with<T>(value: &T, config: &KeyedConfig) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let value = keyed::scoped(config, || to_value(value))?;
    (config.encoder)(&value, config.pretty)
}

/// Serialize any `T: Serialize` to a writer as JSON.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec![1, 2]).unwrap();
/// assert_eq!(buffer, b"[1,2]");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let bytes = to_vec(value)?;
    writer
        .write_all(&bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Decode a keyed type from JSON text using the global config.
///
/// Unlike [`from_str`], this runs the type's mapping routine directly, so it
/// does not need [`impl_keyed_serde!`].
///
/// # Errors
///
/// Returns an error if the text is malformed, is not an object, or a field
/// fails to map.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_keyed<T>(s: &str) -> Result<T>
where
    T: Keyed,
{
    decode_keyed_with(s, KeyedConfig::global())
}

/// Decode a keyed type from JSON text using `config`.
///
/// `config` applies to the fields of `T` and to every keyed type nested
/// inside it.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::{decode_keyed_with, KeyMap, KeyOptions, Keyed, KeyedConfig, Result};
///
/// #[derive(Default, Clone)]
/// struct Row { id: u32 }
///
/// impl Keyed for Row {
///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
///         map.field(&mut self.id, "meta/id")
///     }
/// }
///
/// let config = KeyedConfig::new().with_key_options(KeyOptions::new().with_delimiter('/'));
/// let row: Row = decode_keyed_with(r#"{"meta":{"id":7}}"#, &config).unwrap();
/// assert_eq!(row.id, 7);
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_keyed_with<T>(s: &str, config: &KeyedConfig) -> Result<T>
where
    T: Keyed,
{
    let value = (config.decoder)(s.as_bytes())?;
    keyed::decode_value(&value, config)
}

/// Decode a keyed type from a [`Value`] using the global config.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_keyed_value<T>(value: &Value) -> Result<T>
where
    T: Keyed,
{
    decode_keyed_value_with(value, KeyedConfig::global())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_keyed_value_with<T>(value: &Value, config: &KeyedConfig) -> Result<T>
where
    T: Keyed,
{
    keyed::decode_value(value, config)
}

/// Encode a keyed type into JSON text using the global config.
///
/// # Errors
///
/// Returns an error if a field fails to serialize or transform, or two
/// fields claim the same location with incompatible values.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_keyed<T>(value: &T) -> Result<String>
where
    T: Keyed,
{
    encode_keyed_with(value, KeyedConfig::global())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_keyed_with<T>(value: &T, config: &KeyedConfig) -> Result<String>
where
    T: Keyed,
{
    let object = keyed::encode_object(value, config)?;
    into_string((config.encoder)(&Value::Object(object), config.pretty)?)
}

/// Encode a keyed type into a [`Value`] using the global config.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_keyed_value<T>(value: &T) -> Result<Value>
where
    T: Keyed,
{
    encode_keyed_value_with(value, KeyedConfig::global())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_keyed_value_with<T>(value: &T, config: &KeyedConfig) -> Result<Value>
where
    T: Keyed,
{
    keyed::encode_object(value, config).map(Value::Object)
}

/// Build the zero instance of a keyed type: required fields neutral,
/// optional fields `None`, arrays empty.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::{zero, KeyMap, Keyed, Result};
///
/// #[derive(Default, Clone)]
/// struct Profile { name: String, age: Option<u8> }
///
/// impl Keyed for Profile {
///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
///         map.field(&mut self.name, "profile.name")?;
///         map.optional(&mut self.age, "profile.age")
///     }
/// }
///
/// let profile: Profile = zero().unwrap();
/// assert_eq!(profile.name, "");
/// assert_eq!(profile.age, None);
/// ```
///
/// # Errors
///
/// Returns an error if a field type rejects its neutral value.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn zero<T>() -> Result<T>
where
    T: Keyed,
{
    zero_with(ZeroMode::Minimum, KeyedConfig::global())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn zero_with<T>(mode: ZeroMode, config: &KeyedConfig) -> Result<T>
where
    T: Keyed,
{
    keyed::zero_object(mode, config)
}

/// Records every key path the mapping routine of `T` reads, including those
/// of keyed types, structs and array elements nested in it.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::{build_graph, KeyMap, Keyed, Result};
///
/// #[derive(Default, Clone)]
/// struct Order { id: u64, lines: Vec<String> }
///
/// impl Keyed for Order {
///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
///         map.field(&mut self.id, "order.id")?;
///         map.array(&mut self.lines, "order.lines")
///     }
/// }
///
/// let graph = build_graph::<Order>().unwrap();
/// assert!(graph.contains(&["order", "lines"]));
/// ```
///
/// # Errors
///
/// Returns an error if a key cannot be parsed, or a field type rejects its
/// populated zero value.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn build_graph<T>() -> Result<Graph>
where
    T: Keyed,
{
    build_graph_with::<T>(KeyedConfig::global())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn build_graph_with<T>(config: &KeyedConfig) -> Result<Graph>
where
    T: Keyed,
{
    keyed::graph_object::<T>(config)
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::custom(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Default, Clone, Debug, PartialEq)]
    struct Labeled {
        label: String,
        point: Option<Point>,
    }

    impl Keyed for Labeled {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.field(&mut self.label, "meta.label")?;
            map.optional(&mut self.point, "meta.point")
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let json = to_string(&point).unwrap();
        let point_back: Point = from_str(&json).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_pretty_printing() {
        let json = to_string_pretty(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(json, "{\n  \"x\": 1,\n  \"y\": 2\n}");
    }

    #[test]
    fn test_to_value() {
        let value = to_value(&Point { x: 1, y: 2 }).unwrap();
        match value {
            Value::Object(obj) => {
                assert_eq!(obj.get("x"), Some(&Value::Number(Number::Integer(1))));
                assert_eq!(obj.get("y"), Some(&Value::Number(Number::Integer(2))));
            }
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_keyed_round_trip() {
        let labeled = Labeled {
            label: "origin".to_string(),
            point: Some(Point { x: 0, y: 0 }),
        };
        let json = encode_keyed(&labeled).unwrap();
        assert_eq!(json, r#"{"meta":{"label":"origin","point":{"x":0,"y":0}}}"#);
        assert_eq!(decode_keyed::<Labeled>(&json).unwrap(), labeled);
    }

    #[test]
    fn test_decode_keyed_rejects_non_objects() {
        let err = decode_keyed::<Labeled>("[1]").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_missing_key_names_path() {
        let err = decode_keyed::<Labeled>(r#"{"meta":{}}"#).unwrap_err();
        assert_eq!(err, Error::missing_key("meta.label"));
    }

    #[test]
    fn test_zero_populated() {
        let labeled: Labeled = zero_with(ZeroMode::Populated, KeyedConfig::global()).unwrap();
        assert_eq!(labeled.point, Some(Point { x: 0, y: 0 }));
    }
}
