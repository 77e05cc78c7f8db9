//! # Shard Routing Helpers
//!
//! Pure helpers for mapping record ids onto shards and for batching
//! lookups so that each shard is fetched at most once. The id space is
//! partitioned modulo `16^level`: level 0 collapses everything into a
//! single shard, each additional level multiplies the shard count by 16.
//!
//! [`get_all`] is the batch entry point: callers hand it a loader closure
//! that can produce a packed shard buffer for a shard id (from disk, an
//! object store, wherever); the helper orders the ids so misses are
//! grouped, loads each missing shard once, and returns the deduplicated
//! union of all matching posting values.

use eyre::Result;

use crate::cache::Cache;

/// Shard id for `id` at the given shard level.
pub fn shard_for(level: u32, id: u64) -> u64 {
    if level == 0 {
        return 0;
    }
    if level >= 16 {
        // 16^16 exceeds the id space; every id is its own shard by then
        return id;
    }
    id % (1u64 << (4 * level))
}

/// Orders ids by (shard, id) so consecutive ids share a shard.
pub fn shard_sort(level: u32, ids: &mut [u64]) {
    ids.sort_unstable_by(|a, b| {
        shard_for(level, *a)
            .cmp(&shard_for(level, *b))
            .then(a.cmp(b))
    });
}

/// Sorts and deduplicates in place.
pub fn uniq(ids: &mut Vec<u64>) {
    ids.sort_unstable();
    ids.dedup();
}

/// Values tied for the highest occurrence count, ascending.
pub fn most_frequent(values: &mut Vec<u64>) -> Vec<u64> {
    if values.is_empty() {
        return Vec::new();
    }
    values.sort_unstable();

    let mut best = Vec::new();
    let mut max_run = 0usize;
    let mut start = 0usize;
    for i in 1..=values.len() {
        if i == values.len() || values[i] != values[start] {
            let run = i - start;
            if run > max_run {
                max_run = run;
                best.clear();
                best.push(values[start]);
            } else if run == max_run {
                best.push(values[start]);
            }
            start = i;
        }
    }
    best
}

/// Batch lookup across shards.
///
/// For every id, resolves its shard, pulls the shard through `loader` if
/// the cache does not hold it yet (each shard loaded at most once), and
/// collects the record's posting values (nested rows flattened). Returns
/// the sorted, deduplicated union. Ids with no record are skipped.
pub fn get_all<F>(cache: &Cache, mut loader: F, kind: &str, ids: &[u64]) -> Result<Vec<u64>>
where
    F: FnMut(u64) -> Result<Vec<u8>>,
{
    let level = cache.shard_level();
    let mut queue = ids.to_vec();
    shard_sort(level, &mut queue);

    let mut result = Vec::new();
    for id in queue {
        let shard = shard_for(level, id);
        if !cache.has(kind, shard) {
            let buffer = loader(shard)?;
            cache.load(&buffer, kind, shard)?;
        }
        if let Some(value) = cache.get(kind, shard, id)? {
            result.extend(value.into_flattened());
        }
    }
    uniq(&mut result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_for_level_zero_is_single_shard() {
        assert_eq!(shard_for(0, 0), 0);
        assert_eq!(shard_for(0, 123456), 0);
    }

    #[test]
    fn shard_for_partitions_modulo_16_pow_level() {
        assert_eq!(shard_for(1, 17), 1);
        assert_eq!(shard_for(1, 32), 0);
        assert_eq!(shard_for(2, 257), 1);
        assert_eq!(shard_for(2, 255), 255);
    }

    #[test]
    fn shard_sort_groups_by_shard_then_id() {
        let mut ids = vec![33, 2, 18, 16, 1];
        shard_sort(1, &mut ids);
        // shards: 33->1, 2->2, 18->2, 16->0, 1->1
        assert_eq!(ids, vec![16, 1, 33, 2, 18]);
    }

    #[test]
    fn uniq_sorts_and_dedups() {
        let mut ids = vec![3, 1, 3, 2, 1];
        uniq(&mut ids);
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn most_frequent_returns_all_ties() {
        let mut values = vec![5, 1, 5, 2, 2, 9];
        assert_eq!(most_frequent(&mut values), vec![2, 5]);

        let mut single = vec![4, 4, 1];
        assert_eq!(most_frequent(&mut single), vec![4]);

        let mut all_unique = vec![3, 1, 2];
        assert_eq!(most_frequent(&mut all_unique), vec![1, 2, 3]);

        let mut empty: Vec<u64> = Vec::new();
        assert_eq!(most_frequent(&mut empty), Vec::<u64>::new());
    }

    #[test]
    fn get_all_loads_each_shard_once() {
        let source = Cache::new("source", 1);
        source.set("term", 1, 1, &[10, 11]).unwrap();
        source.set("term", 1, 17, &[11, 12]).unwrap();
        source.set("term", 2, 2, &[20]).unwrap();

        let cache = Cache::new("dest", 1);
        let mut loads = Vec::new();
        let result = get_all(
            &cache,
            |shard| {
                loads.push(shard);
                source.pack("term", shard)
            },
            "term",
            &[17, 2, 1],
        )
        .unwrap();

        assert_eq!(result, vec![10, 11, 12, 20]);
        assert_eq!(loads, vec![1, 2]);
    }

    #[test]
    fn get_all_skips_missing_ids() {
        let source = Cache::new("source", 0);
        source.set("term", 0, 1, &[1]).unwrap();

        let cache = Cache::new("dest", 0);
        let result = get_all(
            &cache,
            |shard| source.pack("term", shard),
            "term",
            &[1, 99],
        )
        .unwrap();
        assert_eq!(result, vec![1]);
    }
}
