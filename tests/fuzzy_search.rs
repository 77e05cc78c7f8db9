//! # Fuzzy Engine Integration Tests
//!
//! Exercises the deletion-neighborhood engine over a realistic place-name
//! dictionary: typo recovery, ranking, distance caps, and both
//! verification metrics.

use gazetteer::{DistanceMetric, FuzzyEngine};

fn place_engine() -> FuzzyEngine {
    let mut engine = FuzzyEngine::new();
    for place in [
        "springfield",
        "spring valley",
        "san francisco",
        "san fernando",
        "santa fe",
        "boston",
        "houston",
        "austin",
        "aubin",
    ] {
        engine.add(place);
    }
    engine
}

#[test]
fn exact_queries_come_back_at_distance_zero() {
    let engine = place_engine();
    for query in ["boston", "santa fe", "san francisco"] {
        let hits = engine.search(query, 2, 5);
        assert_eq!(hits[0].word, query);
        assert_eq!(hits[0].distance, 0);
    }
}

#[test]
fn single_character_typos_are_recovered() {
    let engine = place_engine();

    let hits = engine.search("bostn", 2, 5);
    assert_eq!(hits[0].word, "boston");
    assert_eq!(hits[0].distance, 1);

    let hits = engine.search("springfeld", 2, 5);
    assert_eq!(hits[0].word, "springfield");
    assert_eq!(hits[0].distance, 1);
}

#[test]
fn results_rank_by_distance_then_word() {
    let engine = place_engine();
    let hits = engine.search("austin", 2, 10);

    assert_eq!(hits[0].word, "austin");
    assert_eq!(hits[0].distance, 0);
    // "aubin" is two edits away and must follow
    assert!(hits.iter().any(|h| h.word == "aubin" && h.distance == 2));
    for pair in hits.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[test]
fn unrelated_queries_match_nothing() {
    let engine = place_engine();
    assert!(engine.search("tokyo", 2, 5).is_empty());
    assert!(engine.search("", 2, 5).is_empty());
}

#[test]
fn requested_distance_narrows_results() {
    let engine = place_engine();
    assert!(engine.search("hstn", 1, 5).is_empty());
    assert_eq!(engine.search("huston", 1, 5)[0].word, "houston");
}

#[test]
fn limit_bounds_result_count() {
    let mut engine = FuzzyEngine::new();
    for suffix in ["a", "b", "c", "d", "e"] {
        engine.add(&format!("dale{}", suffix));
    }
    assert_eq!(engine.search("dale", 2, 3).len(), 3);
}

#[test]
fn damerau_metric_catches_swapped_letters() {
    let mut levenshtein = FuzzyEngine::with_metric(1, DistanceMetric::Levenshtein);
    let mut damerau = FuzzyEngine::with_metric(1, DistanceMetric::DamerauLevenshtein);
    levenshtein.add("reno");
    damerau.add("reno");

    // "rneo" is one transposition, two plain edits
    assert!(levenshtein.search("rneo", 1, 5).is_empty());
    let hits = damerau.search("rneo", 1, 5);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].distance, 1);
}

#[test]
fn large_dictionary_stays_consistent() {
    let mut engine = FuzzyEngine::new();
    for i in 0..500u32 {
        engine.add(&format!("place{:03}", i));
    }
    assert_eq!(engine.base_len(), 500);

    let hits = engine.search("place042", 1, 1000);
    assert!(hits.iter().any(|h| h.word == "place042" && h.distance == 0));
    // every reported hit honors the requested radius
    assert!(hits.iter().all(|h| h.distance <= 1));
}
