//! # Fuzzy Token Engine
//!
//! Approximate token lookup over a dictionary, built on deletion
//! neighborhoods: every indexed word contributes the hashes of all its
//! deletion neighbors to a residual index, and a query is answered by
//! intersecting its own neighborhood with that index, then verifying the
//! surviving candidates with an exact edit-distance metric.
//!
//! Compared with scanning the dictionary, the residual index turns an
//! O(dictionary) fuzzy probe into a handful of hash lookups; the price is
//! index size, which is why the indexing distance is bounded.
//!
//! ## Usage
//!
//! ```
//! use gazetteer::FuzzyEngine;
//!
//! let mut engine = FuzzyEngine::new();
//! engine.add("springfield");
//! engine.add("spring");
//!
//! let hits = engine.search("springfeld", 2, 10);
//! assert_eq!(hits[0].word, "springfield");
//! assert_eq!(hits[0].distance, 1);
//! ```
//!
//! ## Module Structure
//!
//! - `distance`: exact Levenshtein / Damerau-Levenshtein verification
//! - `neighborhood`: bounded worklist deletion-neighborhood generation

pub mod distance;
pub mod neighborhood;

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::config::{DEFAULT_FUZZY_DISTANCE, MAX_FUZZY_DISTANCE, MIN_NEIGHBORHOOD_LEN};

pub use distance::{damerau_levenshtein, levenshtein, DistanceMetric};
pub use neighborhood::deletion_neighborhood;

/// One fuzzy match: a dictionary word and its exact edit distance from
/// the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub word: String,
    pub distance: usize,
}

pub struct FuzzyEngine {
    max_distance: u32,
    metric: DistanceMetric,
    hasher: RandomState,
    words: Vec<String>,
    residual: HashMap<u64, SmallVec<[u32; 4]>>,
}

impl Default for FuzzyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyEngine {
    pub fn new() -> Self {
        Self::with_metric(DEFAULT_FUZZY_DISTANCE, DistanceMetric::default())
    }

    /// Engine indexing neighborhoods at `distance` deletions (capped at
    /// [`MAX_FUZZY_DISTANCE`]).
    pub fn with_distance(distance: u32) -> Self {
        Self::with_metric(distance, DistanceMetric::default())
    }

    pub fn with_metric(distance: u32, metric: DistanceMetric) -> Self {
        Self {
            max_distance: distance.min(MAX_FUZZY_DISTANCE),
            metric,
            hasher: RandomState::new(),
            words: Vec::new(),
            residual: HashMap::new(),
        }
    }

    /// Number of indexed dictionary words.
    pub fn base_len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of distinct neighbor hashes in the residual index.
    pub fn residual_len(&self) -> usize {
        self.residual.len()
    }

    /// Adds `word` to the dictionary and indexes its deletion
    /// neighborhood.
    ///
    /// Words of [`MIN_NEIGHBORHOOD_LEN`] characters or fewer are indexed
    /// verbatim only; their neighborhoods are too unselective to be worth
    /// the residual entries.
    pub fn add(&mut self, word: &str) {
        let index = self.words.len() as u32;
        self.words.push(word.to_string());

        if word.chars().count() > MIN_NEIGHBORHOOD_LEN {
            for neighbor in deletion_neighborhood(word, self.max_distance) {
                self.index_token(&neighbor, index);
            }
        } else {
            self.index_token(word, index);
        }
    }

    fn index_token(&mut self, token: &str, index: u32) {
        self.residual
            .entry(self.hash_token(token))
            .or_default()
            .push(index);
    }

    fn hash_token(&self, token: &str) -> u64 {
        let mut hasher = self.hasher.build_hasher();
        token.hash(&mut hasher);
        hasher.finish()
    }

    /// Dictionary words within `max_distance` edits of `query`, sorted by
    /// (distance, word), at most `limit` of them.
    ///
    /// The effective radius is the smaller of `max_distance` and the
    /// engine's indexing distance; candidates further out were never
    /// indexed and cannot be found.
    pub fn search(&self, query: &str, max_distance: u32, limit: usize) -> Vec<SearchHit> {
        let radius = max_distance.min(self.max_distance);

        let mut candidates: HashSet<u32> = HashSet::new();
        for neighbor in deletion_neighborhood(query, radius) {
            if let Some(indices) = self.residual.get(&self.hash_token(&neighbor)) {
                candidates.extend(indices.iter().copied());
            }
        }

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter_map(|index| self.words.get(index as usize))
            .filter_map(|word| {
                let distance = self.metric.distance(word, query);
                (distance as u64 <= radius as u64).then(|| SearchHit {
                    word: word.clone(),
                    distance,
                })
            })
            .collect();

        hits.sort_unstable_by(|a, b| a.distance.cmp(&b.distance).then(a.word.cmp(&b.word)));
        hits.dedup();
        hits.truncate(limit);
        hits
    }
}
