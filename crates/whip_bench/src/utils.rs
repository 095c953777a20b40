//! Benchmark utilities.

use rand::Rng;
use serde_json::json;
use whip_core::{Range, Record};

/// Generate `count` disjoint ranges of `width` addresses, spaced one apart.
pub fn disjoint_ranges(count: u32, width: u32) -> Vec<Range> {
    (0..count)
        .map(|i| {
            let begin = i * (width + 1);
            Range::new(begin, begin + width - 1).expect("width must be non-zero")
        })
        .collect()
}

/// Generate a geo-like record.
pub fn sample_record(i: u32) -> Record {
    let value = json!({
        "country": format!("C{}", i % 200),
        "city": format!("city-{i}"),
        "asn": i % 65_536,
        "coordinates": [f64::from(i % 180), f64::from(i % 90)],
    });
    match value {
        serde_json::Value::Object(map) => Record::from(map),
        _ => Record::new(),
    }
}

/// Generate `count` random addresses below `max`.
pub fn random_addresses(count: usize, max: u32) -> Vec<u32> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen_range(0..max)).collect()
}

/// Generate `sources` streams over the same ranges, each shifted by a few
/// addresses so that they overlap.
pub fn overlapping_sources(sources: u32, count: u32) -> Vec<Vec<(Range, u32)>> {
    (0..sources)
        .map(|s| {
            disjoint_ranges(count, 16)
                .into_iter()
                .map(|r| {
                    let shifted = Range::new(r.begin() + s, r.end() + s).expect("shift keeps order");
                    (shifted, s)
                })
                .collect()
        })
        .collect()
}
