//! The [`Keyed`] trait and its bridge into serde.
//!
//! A keyed type describes its JSON layout in one routine, [`Keyed::map`],
//! which the engine runs for decoding, encoding and zero construction alike.
//! [`impl_keyed_serde!`](crate::impl_keyed_serde) gives such a type ordinary
//! `Serialize`/`Deserialize` impls so it can be nested inside other keyed
//! types, plain serde structs, `Vec`s and maps.

use crate::config::KeyedConfig;
use crate::graph::{self, Graph};
use crate::keymap::KeyMap;
use crate::zero::ZeroMode;
use crate::{Error, Map, Result, Value};
use serde::de::{self, MapAccess, Visitor};
use serde::{ser, Deserializer, Serialize, Serializer};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

/// A type whose fields map onto paths of a JSON object.
///
/// `map` is called once per decode, encode or zero construction. It calls a
/// [`KeyMap`] method for every field; the same calls read the fields when
/// decoding and write them when encoding.
///
/// # Examples
///
/// ```rust
/// use serde_keyed::{decode_keyed, encode_keyed, KeyMap, Keyed, Result};
///
/// #[derive(Default, Clone, Debug, PartialEq)]
/// struct User {
///     name: String,
///     city: Option<String>,
/// }
///
/// impl Keyed for User {
///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
///         map.field(&mut self.name, "user.name")?;
///         map.optional(&mut self.city, "user.address.city")
///     }
/// }
///
/// let user: User = decode_keyed(r#"{"user":{"name":"Ann","address":{"city":"Oslo"}}}"#).unwrap();
/// assert_eq!(user.city.as_deref(), Some("Oslo"));
///
/// let json = encode_keyed(&User { name: "Bo".into(), city: None }).unwrap();
/// assert_eq!(json, r#"{"user":{"name":"Bo"}}"#);
/// ```
pub trait Keyed: Default + Clone {
    /// Maps every field of `self` through `map`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by a `KeyMap` call.
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()>;
}

#[doc(hidden)]
pub const KEYED_STRUCT_TOKEN: &str = "$serde_keyed::private::Keyed";
#[doc(hidden)]
pub const ZERO_TOKEN: &str = "$serde_keyed::private::zero";

pub(crate) fn decode_object<T: Keyed>(object: &Map, config: &KeyedConfig) -> Result<T> {
    scoped(config, || {
        let mut target = T::default();
        let mut map = KeyMap::decoding(object, &config.key_options);
        target.map(&mut map)?;
        Ok(target)
    })
}

pub(crate) fn decode_value<T: Keyed>(value: &Value, config: &KeyedConfig) -> Result<T> {
    match value {
        Value::Object(object) => decode_object(object, config),
        other => Err(Error::type_mismatch("", "object", other.kind())),
    }
}

pub(crate) fn encode_object<T: Keyed>(value: &T, config: &KeyedConfig) -> Result<Map> {
    scoped(config, || {
        let mut source = value.clone();
        let mut map = KeyMap::encoding(&config.key_options);
        source.map(&mut map)?;
        map.finish()
    })
}

pub(crate) fn zero_object<T: Keyed>(mode: ZeroMode, config: &KeyedConfig) -> Result<T> {
    scoped(config, || {
        let mut target = T::default();
        let mut map = KeyMap::zero(mode, &config.key_options);
        target.map(&mut map)?;
        Ok(target)
    })
}

pub(crate) fn graph_object<T: Keyed>(config: &KeyedConfig) -> Result<Graph> {
    scoped(config, || {
        let mut target = T::default();
        let mut map = KeyMap::graph(&config.key_options);
        target.map(&mut map)?;
        Ok(map.into_graph())
    })
}

thread_local! {
    static ACTIVE_CONFIG: RefCell<Vec<KeyedConfig>> = RefCell::new(Vec::new());
}

struct ConfigScope;

impl Drop for ConfigScope {
    fn drop(&mut self) {
        ACTIVE_CONFIG.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Runs `f` with `config` as the config of every keyed type that serde
/// reaches on this thread until `f` returns.
pub(crate) fn scoped<R>(config: &KeyedConfig, f: impl FnOnce() -> R) -> R {
    ACTIVE_CONFIG.with(|stack| stack.borrow_mut().push(config.clone()));
    let _scope = ConfigScope;
    f()
}

/// The innermost scoped config, falling back to the global one.
pub(crate) fn active_config() -> KeyedConfig {
    ACTIVE_CONFIG
        .with(|stack| stack.borrow().last().cloned())
        .unwrap_or_else(|| KeyedConfig::global().clone())
}

thread_local! {
    static NESTED_ERROR: RefCell<Option<Error>> = RefCell::new(None);
}

// Serde only lets a nested deserializer report a message. The structured
// error is parked here and picked up again by `recover`.
fn park(err: Error) -> String {
    let message = err.to_string();
    NESTED_ERROR.with(|slot| *slot.borrow_mut() = Some(err));
    message
}

/// Restores the structured error behind a message produced by a nested
/// keyed type.
pub(crate) fn recover(err: Error) -> Error {
    let parked = NESTED_ERROR.with(|slot| slot.borrow_mut().take());
    match (err, parked) {
        (Error::Custom(message), Some(nested)) if nested.to_string() == message => nested,
        (err, _) => err,
    }
}

#[doc(hidden)]
pub fn serialize_keyed<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: Keyed,
    S: Serializer,
{
    let object = encode_object(value, &active_config())
        .map_err(<S::Error as ser::Error>::custom)?;
    Value::Object(object).serialize(serializer)
}

#[doc(hidden)]
pub fn deserialize_keyed<'de, T, D>(deserializer: D) -> std::result::Result<T, D::Error>
where
    T: Keyed,
    D: Deserializer<'de>,
{
    deserializer.deserialize_struct(KEYED_STRUCT_TOKEN, &[], KeyedVisitor(PhantomData))
}

struct KeyedVisitor<T>(PhantomData<T>);

impl<'de, T: Keyed> Visitor<'de> for KeyedVisitor<T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a keyed object")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<T, A::Error>
    where
        A: MapAccess<'de>,
    {
        let config = active_config();
        let mut object = Map::new();

        if let Some(key) = access.next_key::<String>()? {
            if key == ZERO_TOKEN {
                let minimum: bool = access.next_value()?;
                if graph::capturing() {
                    let nested =
                        graph_object::<T>(&config).map_err(|e| de::Error::custom(park(e)))?;
                    graph::deposit(&[], nested);
                    return Ok(T::default());
                }
                let mode = if minimum {
                    ZeroMode::Minimum
                } else {
                    ZeroMode::Populated
                };
                return zero_object(mode, &config).map_err(|e| de::Error::custom(park(e)));
            }
            let value: Value = access.next_value()?;
            object.insert(key, value);
            while let Some((key, value)) = access.next_entry::<String, Value>()? {
                object.insert(key, value);
            }
        }

        decode_object(&object, &config).map_err(|e| de::Error::custom(park(e)))
    }
}
