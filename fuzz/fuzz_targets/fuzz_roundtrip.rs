//! Fuzz testing for pack/load round-trips.
//!
//! This fuzz target builds shards from arbitrary records and verifies
//! that packing and reloading them preserves every value exactly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use gazetteer::Cache;

#[derive(Debug, Arbitrary)]
struct RoundtripInput {
    records: Vec<(u64, Vec<u64>)>,
}

fuzz_target!(|input: RoundtripInput| {
    if input.records.is_empty() {
        return;
    }

    let cache = Cache::new("fuzz", 0);
    for (id, values) in &input.records {
        cache.set("term", 0, *id, values).unwrap();
    }

    let packed = cache.pack("term", 0).unwrap();

    let fresh = Cache::new("fuzz", 0);
    fresh.load(&packed, "term", 0).unwrap();

    for (id, _) in &input.records {
        let expected = cache.get("term", 0, *id).unwrap();
        let got = fresh.get("term", 0, *id).unwrap();
        assert_eq!(expected, got, "record {} diverged after roundtrip", id);
    }
});
