/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// ```rust
/// use serde_keyed::value;
///
/// let doc = value!({
///     "name": "Alice",
///     "tags": ["rust", "serde"],
///     "address": { "city": "Oslo" },
///     "spouse": null
/// });
/// assert_eq!(doc.to_string(), r#"{"name":"Alice","tags":["rust","serde"],"address":{"city":"Oslo"},"spouse":null}"#);
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Any other expression goes through `Serialize`.
    ($s:expr) => {{
        $crate::to_value(&$s).unwrap_or($crate::Value::Null)
    }};
}

/// Implements `Serialize` and `Deserialize` for [`Keyed`](crate::Keyed)
/// types.
///
/// The generated impls run the type's mapping routine with the global
/// [`KeyedConfig`](crate::KeyedConfig), which lets keyed types appear as
/// fields of other keyed types, inside collections, and in plain serde
/// structs.
///
/// ```rust
/// use serde_keyed::{from_str, impl_keyed_serde, KeyMap, Keyed, Result};
///
/// #[derive(Default, Clone, Debug, PartialEq)]
/// struct Tag {
///     label: String,
/// }
///
/// impl Keyed for Tag {
///     fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
///         map.field(&mut self.label, "meta.label")
///     }
/// }
///
/// impl_keyed_serde!(Tag);
///
/// let tags: Vec<Tag> = from_str(r#"[{"meta":{"label":"a"}},{"meta":{"label":"b"}}]"#).unwrap();
/// assert_eq!(tags[1].label, "b");
/// ```
#[macro_export]
macro_rules! impl_keyed_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::__private::serde::Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
                where
                    S: $crate::__private::serde::Serializer,
                {
                    $crate::__private::serialize_keyed(self, serializer)
                }
            }

            impl<'de> $crate::__private::serde::Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
                where
                    D: $crate::__private::serde::Deserializer<'de>,
                {
                    $crate::__private::deserialize_keyed(deserializer)
                }
            }
        )+
    };
}
