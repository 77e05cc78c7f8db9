//! # Gazetteer - Geocoding Support Library
//!
//! Gazetteer provides the two storage-heavy building blocks of a geocoder:
//! a sharded, lazily-materializing cache for posting-list style integer
//! records, and a fuzzy full-text engine for approximate token lookup.
//! This Rust implementation prioritizes:
//!
//! - **Deferred decoding**: loaded shards keep records as raw byte spans
//!   and decode a record only when it is actually queried
//! - **Wire compatibility**: the codec is bit-exact with the existing
//!   length-delimited varint shard format, so previously packed shards
//!   load unchanged
//! - **Safe ownership**: a loaded shard owns one reference-counted copy of
//!   its wire buffer; no record ever borrows caller memory
//!
//! ## Quick Start
//!
//! ```
//! use gazetteer::Cache;
//!
//! let cache = Cache::new("us-places", 1);
//! cache.set("term", 0, 42, &[1, 2, 3])?;
//!
//! let packed = cache.pack("term", 0)?;
//!
//! let fresh = Cache::new("us-places", 1);
//! fresh.load(&packed, "term", 0)?;
//! assert_eq!(fresh.get("term", 0, 42)?.unwrap().as_flat(), Some(&[1, 2, 3][..]));
//! # Ok::<(), eyre::Report>(())
//! ```
//!
//! ## Architecture
//!
//! Gazetteer uses a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      Public API (Cache, Fuzzy)       │
//! ├───────────────────┬─────────────────┤
//! │   Shard Index     │  Fuzzy Engine    │
//! ├───────────────────┴─────────────────┤
//! │  Record Stores (materialized/lazy)   │
//! ├─────────────────────────────────────┤
//! │     Wire Codec (items, spans)        │
//! ├─────────────────────────────────────┤
//! │   Varint Encoding + Wire Cursor      │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Storage Tiers
//!
//! Each (kind, shard) key resolves to at most one tier in effect:
//!
//! - **Materialized**: record values fully decoded into memory; written by
//!   [`Cache::set`] and [`Cache::load_json`]
//! - **Lazy**: record values still in wire form, indexed by byte span;
//!   written by [`Cache::load`], decoded on demand by [`Cache::get`] and
//!   [`Cache::pack`]
//!
//! When both tiers hold the same key the materialized tier wins; `load`
//! evicts the key's materialized entry so stale tiered data is never
//! observable.
//!
//! ## Module Overview
//!
//! - [`cache`]: shard index with load / set / get / pack / unload
//! - [`store`]: record value variants and the two storage tiers
//! - [`encoding`]: varint codec and streaming wire cursor
//! - [`search`]: deletion-neighborhood fuzzy token engine
//! - [`shard`]: shard routing and batch-lookup helpers
//! - [`config`]: wire and tuning constants

pub mod cache;
pub mod config;
pub mod encoding;
pub mod search;
pub mod shard;
pub mod store;

pub use cache::{Cache, ShardKey};
pub use search::{DistanceMetric, FuzzyEngine, SearchHit};
pub use store::{RecordValue, ValueShape};
