//! Value transformers.
//!
//! A [`Transformer`] converts between the JSON representation of a field
//! (its `Source`, any serde type) and the domain object stored in the
//! struct. It is applied through
//! [`KeyMap::transformed`](crate::KeyMap::transformed) and
//! [`KeyMap::transformed_optional`](crate::KeyMap::transformed_optional).

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Two-way conversion between a JSON representation and a domain object.
///
/// Returning `None` from either direction makes the mapping call fail with
/// [`Error::TransformFailed`](crate::Error::TransformFailed).
///
/// # Examples
///
/// ```rust
/// use serde_keyed::Transformer;
///
/// /// Cents stored as a decimal string.
/// struct Cents;
///
/// impl Transformer for Cents {
///     type Source = String;
///     type Object = u64;
///
///     fn decode(source: String) -> Option<u64> {
///         let (whole, fraction) = source.split_once('.')?;
///         Some(whole.parse::<u64>().ok()? * 100 + fraction.parse::<u64>().ok()?)
///     }
///
///     fn encode(object: &u64) -> Option<String> {
///         Some(format!("{}.{:02}", object / 100, object % 100))
///     }
/// }
///
/// assert_eq!(Cents::decode("12.34".to_string()), Some(1234));
/// assert_eq!(Cents::encode(&1234).as_deref(), Some("12.34"));
/// ```
pub trait Transformer {
    type Source: Serialize + DeserializeOwned;
    type Object;

    fn decode(source: Self::Source) -> Option<Self::Object>;

    fn encode(object: &Self::Object) -> Option<Self::Source>;
}

/// Calendar dates written as `yyyy-MM-dd` strings.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use serde_keyed::{IsoDate, Transformer};
///
/// let date = IsoDate::decode("2012-05-01".to_string()).unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2012, 5, 1).unwrap());
/// assert_eq!(IsoDate::encode(&date).as_deref(), Some("2012-05-01"));
/// assert_eq!(IsoDate::decode("01.05.2012".to_string()), None);
/// ```
pub struct IsoDate;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

impl Transformer for IsoDate {
    type Source = String;
    type Object = NaiveDate;

    fn decode(source: String) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&source, ISO_DATE_FORMAT).ok()
    }

    fn encode(object: &NaiveDate) -> Option<String> {
        Some(object.format(ISO_DATE_FORMAT).to_string())
    }
}
