//! Property-based test generators using proptest.
//!
//! Range streams are produced sorted and internally non-overlapping, which is
//! what the merge and the loader expect from each input.

use proptest::prelude::*;
use serde_json::Value;
use whip_core::{Range, Record};

/// Label attached to a generated range: `(source, index within source)`.
pub type Label = (usize, usize);

/// Strategy for one sorted, non-overlapping stream of ranges.
///
/// Gaps and lengths are small so that several streams overlap often.
pub fn range_stream_strategy(max_ranges: usize) -> impl Strategy<Value = Vec<Range>> {
    prop::collection::vec((0u32..6, 0u32..6), 0..=max_ranges).prop_map(|steps| {
        let mut cursor = 0u32;
        steps
            .into_iter()
            .map(|(gap, len)| {
                let begin = cursor + gap;
                let end = begin + len;
                cursor = end + 1;
                Range::new(begin, end).expect("generated range is ordered")
            })
            .collect()
    })
}

/// Strategy for up to `max_sources` streams, each range labelled uniquely.
pub fn labelled_sources_strategy(
    max_sources: usize,
    max_ranges: usize,
) -> impl Strategy<Value = Vec<Vec<(Range, Label)>>> {
    prop::collection::vec(range_stream_strategy(max_ranges), 0..=max_sources).prop_map(
        |streams| {
            streams
                .into_iter()
                .enumerate()
                .map(|(source, ranges)| {
                    ranges
                        .into_iter()
                        .enumerate()
                        .map(|(index, range)| (range, (source, index)))
                        .collect()
                })
                .collect()
        },
    )
}

/// Strategy for JSON values of every kind, nested up to three levels.
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Strategy for records over a handful of keys with mixed and nested values.
///
/// The key set is small so that consecutive records share keys often.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::btree_map("[a-e]", json_value_strategy(), 0..5)
        .prop_map(|map| map.into_iter().collect::<Record>())
}

/// Strategy for a snapshot sequence of at least one record.
pub fn snapshot_sequence_strategy(max_len: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(record_strategy(), 1..=max_len.max(1))
}
