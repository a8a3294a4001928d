use serde::{Deserialize, Serialize};
use serde_keyed::{
    decode_keyed, encode_keyed, impl_keyed_serde, Error, Flatten, KeyMap, Keyed, Result,
};

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Place {
    name: String,
    location: Location,
}

impl Keyed for Place {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.name, "name")?;
        map.field(&mut self.location, "")
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
struct Contact {
    email: String,
    phone: Option<String>,
}

impl Keyed for Contact {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.email, "contact.email")?;
        map.optional(&mut self.phone, "contact.phone")
    }
}

impl_keyed_serde!(Contact);

#[derive(Default, Clone, Debug, PartialEq)]
struct Person {
    name: String,
    contact: Contact,
}

impl Keyed for Person {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.name, "name")?;
        map.field(&mut self.contact, " ")
    }
}

#[test]
fn test_flattened_fields_sit_beside_siblings() {
    // Flattened values are merged before the keyed fields are flushed.
    let json = r#"{"latitude":59.9,"longitude":10.7,"name":"Pier"}"#;
    let place: Place = decode_keyed(json).unwrap();
    assert_eq!(place.name, "Pier");
    assert_eq!(
        place.location,
        Location {
            latitude: 59.9,
            longitude: 10.7
        }
    );
    assert_eq!(encode_keyed(&place).unwrap(), json);
}

#[test]
fn test_flattened_keyed_type_keeps_its_paths() {
    let json = r#"{"contact":{"email":"ann@example.com"},"name":"Ann"}"#;
    let person: Person = decode_keyed(json).unwrap();
    assert_eq!(person.contact.email, "ann@example.com");
    assert_eq!(person.contact.phone, None);
    assert_eq!(encode_keyed(&person).unwrap(), json);
}

#[test]
fn test_flattened_field_missing_data() {
    let err = decode_keyed::<Place>(r#"{"name":"Pier","latitude":59.9}"#).unwrap_err();
    assert_eq!(err, Error::missing_key("longitude"));
}

#[test]
fn test_optional_flattened_field() {
    #[derive(Default, Clone, Debug, PartialEq)]
    struct Pin {
        location: Option<Location>,
    }

    impl Keyed for Pin {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.optional(&mut self.location, "")
        }
    }

    let pin: Pin = decode_keyed(r#"{"latitude":1.5}"#).unwrap();
    assert_eq!(pin.location, None);
    assert_eq!(encode_keyed(&pin).unwrap(), "{}");

    let pin: Pin = decode_keyed(r#"{"latitude":1.5,"longitude":2.5}"#).unwrap();
    assert_eq!(pin.location.as_ref().map(|l| l.longitude), Some(2.5));
}

#[test]
fn test_exact_flatten_marker() {
    #[derive(Default, Clone, Debug, PartialEq)]
    struct Marked {
        location: Location,
        empty: String,
    }

    impl Keyed for Marked {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            let marked = map
                .default_options()
                .with_flatten(Flatten::Exact("self".to_string()));
            map.field_with(&mut self.location, "self", &marked)?;
            map.field_with(&mut self.empty, "", &marked)
        }
    }

    let json = r#"{"latitude":1.0,"longitude":2.0,"":"blank key"}"#;
    let marked: Marked = decode_keyed(json).unwrap();
    assert_eq!(marked.location.latitude, 1.0);
    assert_eq!(marked.empty, "blank key");
}

#[test]
fn test_flattening_a_scalar_fails_on_encode() {
    #[derive(Default, Clone)]
    struct Bad {
        count: i32,
    }

    impl Keyed for Bad {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.field(&mut self.count, "")
        }
    }

    let err = encode_keyed(&Bad { count: 1 }).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_field_over_flattened_key_fails_on_encode() {
    #[derive(Default, Clone)]
    struct Shadowed {
        location: Location,
        latitude: f64,
    }

    impl Keyed for Shadowed {
        fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
            map.field(&mut self.location, "")?;
            map.field(&mut self.latitude, "latitude")
        }
    }

    let err = encode_keyed(&Shadowed::default()).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { ref path, .. } if path == "latitude"));
}
