//! # Shard Cache
//!
//! This module implements the top-level shard index: a two-tier cache
//! mapping (kind, shard) keys to record stores, with tier-promotion and
//! eviction semantics tuned for geocoder posting data.
//!
//! ## Why Two Tiers?
//!
//! A geocoder routinely holds shards covering millions of postings but
//! queries only a handful of records per request. Decoding a whole shard
//! on load would burn O(shard) time and memory for data that is mostly
//! never read. Instead, [`Cache::load`] indexes raw byte spans (the lazy
//! tier) and [`Cache::get`] decodes a single record at the moment it is
//! queried. Writers that already hold decoded values ([`Cache::set`],
//! [`Cache::load_json`]) go straight to the materialized tier.
//!
//! ## Tier Rules
//!
//! At most one tier is *in effect* per key: the materialized tier when
//! present, else the lazy tier. The migration rules are deliberately
//! asymmetric:
//!
//! - `load` replaces the key's lazy entry wholesale and evicts its
//!   materialized entry, so a reload never exposes stale decoded data
//! - `set` creates or updates a materialized entry and leaves the lazy
//!   entry alone; the materialized tier shadows it from that point on
//! - callers that need a truly pristine key call `unload` first
//!
//! `list_shards`, `list_records`, `has`, `get`, and `pack` are all defined
//! in terms of the tier in effect; no operation concatenates tiers.
//!
//! ## Thread Safety
//!
//! `Cache` is `Send + Sync`. Both tier maps sit behind one
//! `parking_lot::RwLock`: readers (`has`/`get`/`list_*`/`pack`) share the
//! read lock, mutators (`set`/`load`/`load_json`/`unload`) take the write
//! lock. `load` parses the buffer *before* locking, so a malformed buffer
//! never blocks readers and never commits partial state.
//!
//! [`Cache::load_background`] offloads that parse to a worker thread: the
//! thread owns an `Arc` of the cache and a private copy of the buffer,
//! commits under the write lock on success, and reports the outcome
//! through a completion callback invoked exactly once.

use std::fmt;
use std::sync::Arc;
use std::thread;

use eyre::{bail, ensure, Result, WrapErr};
use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::config::MAX_MESSAGE_BYTES;
use crate::store::codec;
use crate::store::{LazyShard, MaterializedShard, RecordValue, ValueShape};

/// Composite key identifying one partition of the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardKey {
    pub kind: String,
    pub shard: u64,
}

impl ShardKey {
    pub fn new(kind: &str, shard: u64) -> Self {
        Self {
            kind: kind.to_string(),
            shard,
        }
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.shard)
    }
}

#[derive(Default)]
struct CacheInner {
    mem: HashMap<ShardKey, MaterializedShard>,
    lazy: HashMap<ShardKey, LazyShard>,
}

pub struct Cache {
    id: String,
    shard_level: u32,
    inner: RwLock<CacheInner>,
}

impl Cache {
    /// Creates an empty cache.
    ///
    /// `id` and `shard_level` are carried for the external partitioning
    /// layer; the cache itself never interprets them beyond handing
    /// `shard_level` to the routing helpers in [`crate::shard`].
    pub fn new(id: impl Into<String>, shard_level: u32) -> Self {
        Self {
            id: id.into(),
            shard_level,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shard_level(&self) -> u32 {
        self.shard_level
    }

    /// True if either tier holds an entry for (kind, shard).
    pub fn has(&self, kind: &str, shard: u64) -> bool {
        let key = ShardKey::new(kind, shard);
        let inner = self.inner.read();
        inner.mem.contains_key(&key) || inner.lazy.contains_key(&key)
    }

    /// Known shard ids for `kind`, ascending, each listed once regardless
    /// of which tier holds it.
    pub fn list_shards(&self, kind: &str) -> Vec<u64> {
        let inner = self.inner.read();
        let mut shards: Vec<u64> = inner
            .mem
            .keys()
            .chain(inner.lazy.keys())
            .filter(|key| key.kind == kind)
            .map(|key| key.shard)
            .collect();
        shards.sort_unstable();
        shards.dedup();
        shards
    }

    /// Record ids of the tier in effect for (kind, shard), ascending.
    /// Empty when the key is absent.
    pub fn list_records(&self, kind: &str, shard: u64) -> Vec<u64> {
        let key = ShardKey::new(kind, shard);
        let inner = self.inner.read();
        if let Some(store) = inner.mem.get(&key) {
            store.keys().copied().collect()
        } else if let Some(store) = inner.lazy.get(&key) {
            store.ids().collect()
        } else {
            Vec::new()
        }
    }

    /// Replaces one record's full value sequence in the materialized tier.
    ///
    /// Creates the shard store on first use. The lazy tier is untouched;
    /// the materialized entry shadows it from now on.
    pub fn set(&self, kind: &str, shard: u64, id: u64, values: &[u64]) -> Result<()> {
        ensure!(
            ValueShape::for_kind(kind) == ValueShape::Flat,
            "set: kind '{}' stores nested values, use set_nested",
            kind
        );
        self.insert_value(kind, shard, id, RecordValue::Flat(values.to_vec()));
        Ok(())
    }

    /// [`Cache::set`] for nested record kinds.
    pub fn set_nested(&self, kind: &str, shard: u64, id: u64, rows: Vec<Vec<u64>>) -> Result<()> {
        ensure!(
            ValueShape::for_kind(kind) == ValueShape::Nested,
            "set_nested: kind '{}' stores flat values, use set",
            kind
        );
        self.insert_value(kind, shard, id, RecordValue::Nested(rows));
        Ok(())
    }

    fn insert_value(&self, kind: &str, shard: u64, id: u64, value: RecordValue) {
        let key = ShardKey::new(kind, shard);
        let mut inner = self.inner.write();
        inner.mem.entry(key).or_default().insert(id, value);
    }

    /// One record's value, or `None` if the tier in effect has no such
    /// record. Lazy records are decoded on the fly, every call.
    pub fn get(&self, kind: &str, shard: u64, id: u64) -> Result<Option<RecordValue>> {
        let key = ShardKey::new(kind, shard);
        let inner = self.inner.read();
        if let Some(store) = inner.mem.get(&key) {
            return Ok(store.get(&id).cloned());
        }
        let Some(store) = inner.lazy.get(&key) else {
            return Ok(None);
        };
        let Some(item) = store.record_bytes(id)? else {
            return Ok(None);
        };
        trace!(key = %key, id, "decoding lazy record");
        codec::decode_item_values(item, ValueShape::for_kind(kind)).map(Some)
    }

    /// Indexes a packed shard buffer into the lazy tier.
    ///
    /// The buffer is parsed before any state changes; a malformed buffer
    /// leaves the key exactly as it was. On success the key's lazy entry
    /// is replaced wholesale and its materialized entry is evicted.
    pub fn load(&self, buffer: &[u8], kind: &str, shard: u64) -> Result<()> {
        let spans = codec::index_items(buffer)?;
        self.commit_lazy(
            ShardKey::new(kind, shard),
            LazyShard::new(Arc::from(buffer), spans),
        );
        Ok(())
    }

    /// Runs [`Cache::load`] on a worker thread.
    ///
    /// The thread keeps the cache alive through its own `Arc` and parses a
    /// privately owned buffer, so neither the cache nor the bytes can go
    /// away mid-decode. `on_done` is invoked exactly once, with `Ok(())`
    /// after the shard is committed or with the parse error (in which
    /// case nothing was committed). Started loads cannot be cancelled.
    pub fn load_background<F>(
        self: &Arc<Self>,
        buffer: Vec<u8>,
        kind: &str,
        shard: u64,
        on_done: F,
    ) -> thread::JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let cache = Arc::clone(self);
        let key = ShardKey::new(kind, shard);
        thread::spawn(move || {
            let outcome = codec::index_items(&buffer).map(|spans| {
                cache.commit_lazy(key, LazyShard::new(Arc::from(buffer), spans));
            });
            on_done(outcome);
        })
    }

    fn commit_lazy(&self, key: ShardKey, store: LazyShard) {
        let mut inner = self.inner.write();
        inner.mem.remove(&key);
        debug!(key = %key, records = store.len(), bytes = store.buffer_len(), "loaded shard");
        inner.lazy.insert(key, store);
    }

    /// Ingests a JSON shard into the materialized tier.
    ///
    /// The document must be an object mapping record ids to arrays of
    /// unsigned integers (flat kinds) or arrays of such arrays (nested
    /// kinds). Follows the same replacement rule as `load`: the key's
    /// materialized entry is replaced wholesale and its lazy entry is
    /// evicted.
    pub fn load_json(&self, json: &str, kind: &str, shard: u64) -> Result<()> {
        let shape = ValueShape::for_kind(kind);
        let doc: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).wrap_err("load_json: document must be an object")?;

        let mut store = MaterializedShard::new();
        for (raw_id, value) in &doc {
            let id: u64 = raw_id
                .parse()
                .wrap_err_with(|| format!("load_json: record id '{}' is not an integer", raw_id))?;
            store.insert(id, json_value(value, shape)?);
        }

        let key = ShardKey::new(kind, shard);
        let mut inner = self.inner.write();
        inner.lazy.remove(&key);
        debug!(key = %key, records = store.len(), "ingested json shard");
        inner.mem.insert(key, store);
        Ok(())
    }

    /// Removes (kind, shard) from both tiers; true if anything was there.
    pub fn unload(&self, kind: &str, shard: u64) -> bool {
        let key = ShardKey::new(kind, shard);
        let mut inner = self.inner.write();
        let removed_mem = inner.mem.remove(&key).is_some();
        let removed_lazy = inner.lazy.remove(&key).is_some();
        if removed_mem || removed_lazy {
            debug!(key = %key, "unloaded shard");
        }
        removed_mem || removed_lazy
    }

    /// Serializes the tier in effect for (kind, shard) back into the
    /// packed wire format, records in ascending id order.
    ///
    /// Fails when the key is absent from both tiers, when the shard has no
    /// records, or when the encoding exceeds the representable size.
    pub fn pack(&self, kind: &str, shard: u64) -> Result<Vec<u8>> {
        let key = ShardKey::new(kind, shard);
        let shape = ValueShape::for_kind(kind);
        let inner = self.inner.read();

        let mut out = Vec::new();
        if let Some(store) = inner.mem.get(&key) {
            for (id, value) in store {
                codec::encode_item(*id, value, &mut out);
            }
        } else if let Some(store) = inner.lazy.get(&key) {
            for id in store.ids() {
                let item = store.record_bytes(id)?.expect("id came from the span map"); // INVARIANT: ids() only yields indexed records
                let value = codec::decode_item_values(item, shape)?;
                codec::encode_item(id, &value, &mut out);
            }
        } else {
            bail!("pack: no records for shard {}", key);
        }

        ensure!(!out.is_empty(), "pack: refusing to pack empty shard {}", key);
        ensure!(
            out.len() <= MAX_MESSAGE_BYTES,
            "pack: serialized size {} exceeds representable range",
            out.len()
        );
        debug!(key = %key, bytes = out.len(), "packed shard");
        Ok(out)
    }
}

fn json_value(value: &serde_json::Value, shape: ValueShape) -> Result<RecordValue> {
    match shape {
        ValueShape::Flat => Ok(RecordValue::Flat(json_u64_array(value)?)),
        ValueShape::Nested => {
            let rows = value
                .as_array()
                .ok_or_else(|| eyre::eyre!("load_json: nested record must be an array of arrays"))?
                .iter()
                .map(json_u64_array)
                .collect::<Result<Vec<_>>>()?;
            Ok(RecordValue::Nested(rows))
        }
    }
}

fn json_u64_array(value: &serde_json::Value) -> Result<Vec<u64>> {
    value
        .as_array()
        .ok_or_else(|| eyre::eyre!("load_json: record value must be an array"))?
        .iter()
        .map(|v| {
            v.as_u64()
                .ok_or_else(|| eyre::eyre!("load_json: array element {} is not an unsigned integer", v))
        })
        .collect()
}
