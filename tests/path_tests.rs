use serde::{Deserialize, Serialize};
use serde_keyed::{
    decode_keyed, decode_keyed_with, encode_keyed, encode_keyed_with, from_str_with,
    impl_keyed_serde, to_string_with, Error, KeyMap, KeyOptions, Keyed, KeyedConfig, Result,
};

#[derive(Default, Clone, Debug, PartialEq)]
struct StandardExample {
    inner: Inner,
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Inner {
    greeting: String,
    details: Details,
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Details {
    description: String,
}

impl Keyed for StandardExample {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.inner, "inner")
    }
}

impl Keyed for Inner {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.greeting, "greeting")?;
        map.field(&mut self.details, "details")
    }
}

impl Keyed for Details {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.description, "description")
    }
}

impl_keyed_serde!(Inner, Details);

#[derive(Default, Clone, Debug, PartialEq)]
struct Flattened {
    greeting: String,
    description: String,
}

impl Keyed for Flattened {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.greeting, "inner.greeting")?;
        map.field(&mut self.description, "inner.details.description")
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
struct PlainDetails {
    description: String,
}

#[derive(Default, Clone, Debug, PartialEq)]
struct PlusExample {
    details: PlainDetails,
    dotted: i32,
}

impl Keyed for PlusExample {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        let plus = map.default_options().with_delimiter('+');
        map.field_with(&mut self.details, "inner+details", &plus)?;
        map.field_with(&mut self.dotted, "a.b", &plus)
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Counted {
    city: String,
    zip: String,
    name: String,
    opened: usize,
}

impl Keyed for Counted {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.city, "user.address.city")?;
        map.field(&mut self.zip, "user.address.zip")?;
        map.field(&mut self.name, "user.name")?;
        self.opened = map.materialized();
        Ok(())
    }
}

const STANDARD: &str = r#"{"inner":{"greeting":"hallo","details":{"description":"nice"}}}"#;

#[test]
fn test_nested_keyed_types() {
    let example: StandardExample = decode_keyed(STANDARD).unwrap();
    assert_eq!(example.inner.greeting, "hallo");
    assert_eq!(example.inner.details.description, "nice");
    assert_eq!(encode_keyed(&example).unwrap(), STANDARD);
}

#[test]
fn test_dotted_paths_match_nested_types() {
    let flat: Flattened = decode_keyed(STANDARD).unwrap();
    assert_eq!(flat.greeting, "hallo");
    assert_eq!(flat.description, "nice");
    assert_eq!(encode_keyed(&flat).unwrap(), STANDARD);
}

#[test]
fn test_custom_delimiter() {
    let json = r#"{"a.b":7,"inner":{"details":{"description":"plus"}}}"#;
    let example: PlusExample = decode_keyed(json).unwrap();
    assert_eq!(example.details.description, "plus");
    assert_eq!(example.dotted, 7);
    assert_eq!(encode_keyed(&example).unwrap(), json);
}

#[test]
fn test_config_delimiter_applies_to_all_fields() {
    #[derive(Default, Clone)]
    struct Slashed {
        city: String,
    }

    impl Keyed for Slashed {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.field(&mut self.city, "user/address/city")
        }
    }

    let config = KeyedConfig::new().with_key_options(KeyOptions::new().with_delimiter('/'));
    let json = r#"{"user":{"address":{"city":"Oslo"}}}"#;
    let slashed: Slashed = decode_keyed_with(json, &config).unwrap();
    assert_eq!(slashed.city, "Oslo");
    assert_eq!(encode_keyed_with(&slashed, &config).unwrap(), json);
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Shipment {
    parcel: Parcel,
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Parcel {
    items: Vec<i32>,
    name: String,
}

impl Keyed for Shipment {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.parcel, "data/inner")
    }
}

impl Keyed for Parcel {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.array(&mut self.items, "* items")?;
        map.field(&mut self.name, "meta/name")
    }
}

impl_keyed_serde!(Parcel);

fn slash_legacy() -> KeyedConfig {
    KeyedConfig::new().with_key_options(KeyOptions::legacy().with_delimiter('/'))
}

#[test]
fn test_config_reaches_nested_keyed_types() {
    let config = slash_legacy();
    let json = r#"{"data":{"inner":{"items":[1,"x",3],"meta":{"name":"n"}}}}"#;
    let shipment: Shipment = decode_keyed_with(json, &config).unwrap();
    assert_eq!(shipment.parcel.items, vec![1, 3]);
    assert_eq!(shipment.parcel.name, "n");

    assert_eq!(
        encode_keyed_with(&shipment, &config).unwrap(),
        r#"{"data":{"inner":{"items":[1,3],"meta":{"name":"n"}}}}"#
    );
}

#[test]
fn test_nested_error_path_uses_config_delimiter() {
    let json = r#"{"data":{"inner":{"items":[],"meta":{}}}}"#;
    let err = decode_keyed_with::<Shipment>(json, &slash_legacy()).unwrap_err();
    assert_eq!(err, Error::missing_key("data/inner/meta/name"));
}

#[test]
fn test_config_reaches_keyed_types_inside_serde_values() {
    let config = slash_legacy();
    let parcels: Vec<Parcel> =
        from_str_with(r#"[{"items":[2,null],"meta":{"name":"a"}}]"#, &config).unwrap();
    assert_eq!(parcels[0].items, vec![2]);
    assert_eq!(
        to_string_with(&parcels, &config).unwrap(),
        r#"[{"items":[2],"meta":{"name":"a"}}]"#
    );
}

#[test]
fn test_literal_keys_without_delimiter() {
    #[derive(Default, Clone)]
    struct Literal {
        value: String,
    }

    impl Keyed for Literal {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            let literal = map.default_options().without_delimiter();
            map.field_with(&mut self.value, "user.name", &literal)
        }
    }

    let literal: Literal = decode_keyed(r#"{"user.name":"Ann","user":{"name":"Bo"}}"#).unwrap();
    assert_eq!(literal.value, "Ann");
}

#[test]
fn test_leading_delimiter_is_ignored() {
    #[derive(Default, Clone)]
    struct Leading {
        name: String,
    }

    impl Keyed for Leading {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.field(&mut self.name, ".user.name")
        }
    }

    let leading: Leading = decode_keyed(r#"{"user":{"name":"Ann"}}"#).unwrap();
    assert_eq!(leading.name, "Ann");
    assert_eq!(encode_keyed(&leading).unwrap(), r#"{"user":{"name":"Ann"}}"#);
}

#[test]
fn test_missing_required_key_reports_full_path() {
    let err = decode_keyed::<StandardExample>(r#"{"inner":{"greeting":"hi","details":{}}}"#)
        .unwrap_err();
    assert_eq!(err, Error::missing_key("inner.details.description"));

    let err = decode_keyed::<Flattened>(r#"{"inner":{"greeting":"hi"}}"#).unwrap_err();
    assert_eq!(err, Error::missing_key("inner.details.description"));
}

#[test]
fn test_type_mismatch_reports_full_path() {
    let json = r#"{"inner":{"greeting":"hi","details":{"description":5}}}"#;
    let err = decode_keyed::<StandardExample>(json).unwrap_err();
    assert!(
        matches!(err, Error::TypeMismatch { ref path, .. } if path == "inner.details.description"),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn test_intermediate_scalar_is_type_mismatch() {
    let err = decode_keyed::<Flattened>(r#"{"inner":"hallo"}"#).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_containers_opened_once_per_prefix() {
    let json = r#"{"user":{"name":"Ann","address":{"city":"Oslo","zip":"0150"}}}"#;
    let counted: Counted = decode_keyed(json).unwrap();
    assert_eq!(counted.opened, 2);
}

#[test]
fn test_conflicting_writes_fail() {
    #[derive(Default, Clone)]
    struct Clash {
        user: String,
        name: String,
    }

    impl Keyed for Clash {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.field(&mut self.user, "user")?;
            map.field(&mut self.name, "user.name")
        }
    }

    let clash = Clash {
        user: "Ann".to_string(),
        name: "Bo".to_string(),
    };
    let err = encode_keyed(&clash).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { ref path, .. } if path == "user"));
}
