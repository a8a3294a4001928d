use serde::{Deserialize, Serialize};
use serde_keyed::{
    decode_keyed, decode_keyed_with, encode_keyed, impl_keyed_serde, Error, KeyMap, KeyOptions,
    Keyed, KeyedConfig, Result,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Element {
    element: i32,
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Elements {
    elements: Vec<Element>,
    optional: Option<Vec<Element>>,
}

impl Keyed for Elements {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        let legacy = KeyOptions::legacy();
        map.array_with(&mut self.elements, "* elements", &legacy)?;
        map.optional_array_with(&mut self.optional, "lists.* optional", &legacy)
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Strict {
    elements: Vec<Element>,
    tags: Option<Vec<String>>,
}

impl Keyed for Strict {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.array(&mut self.elements, "elements")?;
        map.optional_array(&mut self.tags, "tags")
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Reading {
    sensor: String,
    value: f64,
}

impl Keyed for Reading {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.sensor, "meta.sensor")?;
        map.field(&mut self.value, "value")
    }
}

impl_keyed_serde!(Reading);

#[derive(Default, Clone, Debug, PartialEq)]
struct Readings {
    readings: Vec<Reading>,
}

impl Keyed for Readings {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.array(&mut self.readings, "* readings")
    }
}

fn element(value: i32) -> Element {
    Element { element: value }
}

#[test]
fn test_tolerant_array_drops_failing_elements() {
    let json = r#"{"elements":[{"element":1},{},{"element":3},{"element":4}]}"#;
    let decoded: Elements = decode_keyed(json).unwrap();
    assert_eq!(decoded.elements, vec![element(1), element(3), element(4)]);
}

#[test]
fn test_tolerant_array_of_keyed_types() {
    let json = r#"{"readings":[
        {"meta":{"sensor":"a"},"value":1.5},
        {"meta":{},"value":2.0},
        {"meta":{"sensor":"c"},"value":"high"},
        {"meta":{"sensor":"d"},"value":4.0}
    ]}"#;
    let config = KeyedConfig::new().with_key_options(KeyOptions::legacy());
    let decoded: Readings = decode_keyed_with(json, &config).unwrap();
    let sensors: Vec<&str> = decoded.readings.iter().map(|r| r.sensor.as_str()).collect();
    assert_eq!(sensors, ["a", "d"]);
}

#[test]
fn test_tolerant_array_round_trip() {
    let value = Elements {
        elements: vec![element(1), element(2)],
        optional: Some(vec![element(3)]),
    };
    let json = encode_keyed(&value).unwrap();
    assert_eq!(
        json,
        r#"{"elements":[{"element":1},{"element":2}],"lists":{"optional":[{"element":3}]}}"#
    );
    assert_eq!(decode_keyed::<Elements>(&json).unwrap(), value);
}

#[test]
fn test_absent_tolerant_arrays() {
    let err = decode_keyed::<Elements>("{}").unwrap_err();
    assert_eq!(err, Error::missing_key("* elements"));

    let decoded: Elements = decode_keyed(r#"{"elements":[]}"#).unwrap();
    assert_eq!(decoded.optional, Some(vec![]));
}

#[test]
fn test_tolerant_array_must_be_an_array() {
    let err = decode_keyed::<Elements>(r#"{"elements":{"element":1}}"#).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_strict_array_fails_on_bad_element() {
    let json = r#"{"elements":[{"element":1},{}]}"#;
    let err = decode_keyed::<Strict>(json).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingRequiredKey { ref path } if path.starts_with("elements")
    ));
}

#[test]
fn test_optional_array_absent_or_null() {
    let decoded: Strict = decode_keyed(r#"{"elements":[],"tags":null}"#).unwrap();
    assert_eq!(decoded.tags, None);
    assert_eq!(encode_keyed(&decoded).unwrap(), r#"{"elements":[]}"#);

    let decoded: Strict = decode_keyed(r#"{"elements":[],"tags":["a"]}"#).unwrap();
    assert_eq!(decoded.tags, Some(vec!["a".to_string()]));
}

#[test]
fn test_prefix_is_literal_when_disabled() {
    #[derive(Default, Clone)]
    struct Literal {
        names: Vec<String>,
    }

    impl Keyed for Literal {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.array(&mut self.names, "* names")
        }
    }

    let literal: Literal = decode_keyed(r#"{"* names":["a","b"]}"#).unwrap();
    assert_eq!(literal.names, ["a", "b"]);
}

#[test]
fn test_custom_prefix() {
    #[derive(Default, Clone)]
    struct Custom {
        numbers: Vec<u8>,
    }

    impl Keyed for Custom {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            let options = map.default_options().with_optional_array_prefix("?");
            map.array_with(&mut self.numbers, "data.?numbers", &options)
        }
    }

    let custom: Custom = decode_keyed(r#"{"data":{"numbers":[1,-1,300,2]}}"#).unwrap();
    assert_eq!(custom.numbers, [1, 2]);
}

#[test]
fn test_prefix_errors() {
    #[derive(Default, Clone, Debug)]
    struct Empty {
        values: Vec<i32>,
    }

    impl Keyed for Empty {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.array_with(&mut self.values, "* ", &KeyOptions::legacy())
        }
    }

    let err = decode_keyed::<Empty>(r#"{"values":[]}"#).unwrap_err();
    assert!(matches!(err, Error::PathParseFailed { .. }));
}
