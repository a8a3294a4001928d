//! Neutral instances of any deserializable type.
//!
//! [`ZeroDeserializer`] answers every request with the neutral value for the
//! requested shape: `0`, `false`, `""`, empty collections, the first enum
//! variant, and structs whose fields are all zero. It lets a caller obtain a
//! placeholder instance of a type without writing a `Default` impl that
//! matches its decoding rules.
//!
//! Types implementing [`Keyed`](crate::Keyed) are recognized and built by
//! running their mapping routine in zero mode, so optional fields stay
//! `None` and tolerant arrays stay empty. While a key graph is being built,
//! struct fields are recorded as they are supplied.
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_keyed::{zero_value, ZeroMode};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Counter { name: String, hits: u32, tags: Vec<String>, note: Option<String> }
//!
//! let minimum: Counter = zero_value(ZeroMode::Minimum).unwrap();
//! assert_eq!(minimum, Counter { name: String::new(), hits: 0, tags: vec![], note: None });
//!
//! let populated: Counter = zero_value(ZeroMode::Populated).unwrap();
//! assert_eq!(populated.tags, vec![String::new()]);
//! assert_eq!(populated.note, Some(String::new()));
//! ```

use crate::graph;
use crate::keyed::{KEYED_STRUCT_TOKEN, ZERO_TOKEN};
use crate::{Error, Result};
use serde::de::{self, IntoDeserializer};

/// How much structure a zero instance carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ZeroMode {
    /// Optionals are `None` and sequences are empty.
    #[default]
    Minimum,
    /// Optionals are `Some(zero)` and sequences hold one zero element.
    Populated,
}

impl ZeroMode {
    fn sequence_len(self) -> usize {
        match self {
            ZeroMode::Minimum => 0,
            ZeroMode::Populated => 1,
        }
    }
}

/// Builds the zero instance of `T`.
///
/// # Errors
///
/// Fails only if `T`'s own `Deserialize` impl rejects a neutral value, for
/// example a type that validates its input.
pub fn zero_value<T>(mode: ZeroMode) -> Result<T>
where
    T: de::DeserializeOwned,
{
    T::deserialize(ZeroDeserializer::new(mode))
}

/// A serde `Deserializer` that produces neutral values.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroDeserializer {
    mode: ZeroMode,
}

impl ZeroDeserializer {
    #[must_use]
    pub fn new(mode: ZeroMode) -> Self {
        ZeroDeserializer { mode }
    }
}

macro_rules! zero_number {
    ($($method:ident => $visit:ident($zero:expr)),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit($zero)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ZeroDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(false)
    }

    zero_number! {
        deserialize_i8 => visit_i8(0),
        deserialize_i16 => visit_i16(0),
        deserialize_i32 => visit_i32(0),
        deserialize_i64 => visit_i64(0),
        deserialize_i128 => visit_i128(0),
        deserialize_u8 => visit_u8(0),
        deserialize_u16 => visit_u16(0),
        deserialize_u32 => visit_u32(0),
        deserialize_u64 => visit_u64(0),
        deserialize_u128 => visit_u128(0),
        deserialize_f32 => visit_f32(0.0),
        deserialize_f64 => visit_f64(0.0),
        deserialize_char => visit_char('\0'),
        deserialize_str => visit_str(""),
        deserialize_string => visit_string(String::new()),
        deserialize_bytes => visit_bytes(&[]),
        deserialize_byte_buf => visit_byte_buf(Vec::new()),
        deserialize_identifier => visit_str(""),
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.mode {
            ZeroMode::Minimum => visitor.visit_none(),
            ZeroMode::Populated => visitor.visit_some(self),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(ZeroSeq::new(self.mode, self.mode.sequence_len()))
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(ZeroSeq::new(self.mode, len))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(ZeroSeq::new(self.mode, len))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(ZeroStruct::new(self.mode, &[]))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == KEYED_STRUCT_TOKEN {
            visitor.visit_map(ZeroMarker {
                mode: Some(self.mode),
            })
        } else {
            visitor.visit_map(ZeroStruct::new(self.mode, fields))
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let variant = variants
            .first()
            .copied()
            .ok_or_else(|| Error::custom(format!("enum `{}` has no variants", name)))?;
        visitor.visit_enum(ZeroEnum {
            mode: self.mode,
            variant,
        })
    }
}

struct ZeroSeq {
    mode: ZeroMode,
    remaining: usize,
}

impl ZeroSeq {
    fn new(mode: ZeroMode, len: usize) -> Self {
        ZeroSeq {
            mode,
            remaining: len,
        }
    }
}

impl<'de> de::SeqAccess<'de> for ZeroSeq {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(ZeroDeserializer::new(self.mode)).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

// Supplies every declared field once, each with a zero value.
struct ZeroStruct {
    mode: ZeroMode,
    fields: std::slice::Iter<'static, &'static str>,
    current: Option<&'static str>,
}

impl ZeroStruct {
    fn new(mode: ZeroMode, fields: &'static [&'static str]) -> Self {
        ZeroStruct {
            mode,
            fields: fields.iter(),
            current: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for ZeroStruct {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.fields.next() {
            Some(field) => {
                self.current = Some(field);
                let key: de::value::StrDeserializer<'_, Error> = field.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let zero = ZeroDeserializer::new(self.mode);
        match self.current.take() {
            Some(field) if graph::capturing() => {
                let (value, nested) = graph::capture(|| seed.deserialize(zero))?;
                graph::deposit(&[field.to_string()], nested);
                Ok(value)
            }
            _ => seed.deserialize(zero),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

// The single entry `{ZERO_TOKEN: minimum}` telling a keyed type to run its
// mapping routine in zero mode.
struct ZeroMarker {
    mode: Option<ZeroMode>,
}

impl<'de> de::MapAccess<'de> for ZeroMarker {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.mode.is_none() {
            return Ok(None);
        }
        let key: de::value::StrDeserializer<'_, Error> = ZERO_TOKEN.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let mode = self
            .mode
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        let minimum = mode == ZeroMode::Minimum;
        let minimum: de::value::BoolDeserializer<Error> = minimum.into_deserializer();
        seed.deserialize(minimum)
    }
}

struct ZeroEnum {
    mode: ZeroMode,
    variant: &'static str,
}

impl<'de> de::EnumAccess<'de> for ZeroEnum {
    type Error = Error;
    type Variant = ZeroDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name: de::value::StrDeserializer<'_, Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, ZeroDeserializer::new(self.mode)))
    }
}

impl<'de> de::VariantAccess<'de> for ZeroDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(ZeroSeq::new(self.mode, len))
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(ZeroStruct::new(self.mode, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    enum Status {
        Active,
        Suspended(String),
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Payload {
        Pair(i32, bool),
        Other,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Account {
        id: u64,
        ratio: f32,
        initial: char,
        status: Status,
        pair: (u8, String),
        labels: HashMap<String, i32>,
    }

    #[test]
    fn test_scalars() {
        assert_eq!(zero_value::<i32>(ZeroMode::Minimum).unwrap(), 0);
        assert!(!zero_value::<bool>(ZeroMode::Minimum).unwrap());
        assert_eq!(zero_value::<String>(ZeroMode::Minimum).unwrap(), "");
        assert_eq!(zero_value::<char>(ZeroMode::Minimum).unwrap(), '\0');
        assert_eq!(zero_value::<f64>(ZeroMode::Populated).unwrap(), 0.0);
    }

    #[test]
    fn test_struct_fields_are_all_zero() {
        let account: Account = zero_value(ZeroMode::Minimum).unwrap();
        assert_eq!(
            account,
            Account {
                id: 0,
                ratio: 0.0,
                initial: '\0',
                status: Status::Active,
                pair: (0, String::new()),
                labels: HashMap::new(),
            }
        );
    }

    #[test]
    fn test_first_variant_gets_zero_payload() {
        assert_eq!(
            zero_value::<Payload>(ZeroMode::Minimum).unwrap(),
            Payload::Pair(0, false)
        );
    }

    #[test]
    fn test_sequence_length_follows_mode() {
        assert!(zero_value::<Vec<i32>>(ZeroMode::Minimum).unwrap().is_empty());
        assert_eq!(zero_value::<Vec<i32>>(ZeroMode::Populated).unwrap(), vec![0]);
        assert!(zero_value::<HashMap<String, i32>>(ZeroMode::Populated)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_option_follows_mode() {
        assert_eq!(zero_value::<Option<i32>>(ZeroMode::Minimum).unwrap(), None);
        assert_eq!(
            zero_value::<Option<i32>>(ZeroMode::Populated).unwrap(),
            Some(0)
        );
    }
}
