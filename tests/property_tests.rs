//! Property-based tests for the keyed round-trip guarantees.

use proptest::prelude::*;
use serde_keyed::{decode_keyed, encode_keyed, encode_keyed_value, KeyMap, Keyed, Result};

#[derive(Default, Clone, Debug, PartialEq)]
struct Record {
    id: i64,
    name: String,
    score: f64,
    tags: Vec<String>,
    rank: Option<u32>,
    note: Option<String>,
}

impl Keyed for Record {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.id, "id")?;
        map.field(&mut self.name, "meta.name")?;
        map.field(&mut self.score, "meta.stats.score")?;
        map.array(&mut self.tags, "meta.tags")?;
        map.optional(&mut self.rank, "meta.stats.rank")?;
        map.optional(&mut self.note, "extra.note")
    }
}

/// Writes one value at a path chosen by the test.
#[derive(Default, Clone)]
struct AtPath {
    key: String,
    value: i64,
}

impl Keyed for AtPath {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        let key = self.key.clone();
        map.field(&mut self.value, &key)
    }
}

fn record() -> impl Strategy<Value = Record> {
    (
        any::<i64>(),
        ".*",
        (-1_000_000i32..1_000_000).prop_map(|n| f64::from(n) / 4.0),
        prop::collection::vec("[a-z]{0,6}", 0..4),
        prop::option::of(any::<u32>()),
        prop::option::of(".*"),
    )
        .prop_map(|(id, name, score, tags, rank, note)| Record {
            id,
            name,
            score,
            tags,
            rank,
            note,
        })
}

proptest! {
    #[test]
    fn prop_record_round_trip(record in record()) {
        let json = encode_keyed(&record).unwrap();
        let decoded: Record = decode_keyed(&json).unwrap();
        prop_assert_eq!(&decoded, &record);
        prop_assert_eq!(encode_keyed(&decoded).unwrap(), json);
    }

    #[test]
    fn prop_absent_optionals_leave_no_keys(id in any::<i64>()) {
        let record = Record { id, ..Record::default() };
        let json = encode_keyed(&record).unwrap();
        prop_assert!(!json.contains("extra"));
        prop_assert!(!json.contains("rank"));
    }

    #[test]
    fn prop_value_lands_at_its_path(
        segments in prop::collection::vec("[a-z]{1,8}", 1..5),
        value in any::<i64>(),
    ) {
        let at_path = AtPath { key: segments.join("."), value };
        let encoded = encode_keyed_value(&at_path).unwrap();
        prop_assert_eq!(encoded.lookup(&segments).and_then(|v| v.as_i64()), Some(value));
    }
}
