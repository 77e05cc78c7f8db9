//! # Gazetteer Configuration Constants
//!
//! This module centralizes wire-format and tuning constants, grouping
//! interdependent values together and documenting their relationships.
//!
//! ## Dependency Graph
//!
//! ```text
//! MAX_VARINT_LEN (10)
//!       │
//!       └─> The wire cursor reads at most this many base-128 groups per
//!           varint (70-bit read window). 10 groups are required to carry
//!           a full u64; an 11th group means the stream is corrupt.
//!
//! ITEM_FIELD (1) / KEY_FIELD (1) / VAL_FIELD (2)
//!       │
//!       └─> Field numbers of the external shard schema. Changing any of
//!           these breaks compatibility with every previously packed shard.
//!
//! MAX_MESSAGE_BYTES (i32::MAX)
//!       │
//!       └─> The external schema stores serialized sizes in a signed
//!           32-bit field; pack refuses to produce anything larger.
//!
//! MAX_FUZZY_DISTANCE (4)
//!       │
//!       └─> DEFAULT_FUZZY_DISTANCE (must be <=)
//!           Deletion-neighborhood size is combinatorial in
//!           (word length choose distance); the cap keeps index build
//!           time bounded for long tokens.
//! ```
//!
//! ## Usage
//!
//! Import constants from this module rather than defining them locally:
//!
//! ```ignore
//! use crate::config::{MAX_VARINT_LEN, VAL_FIELD};
//! ```

/// Maximum number of base-128 groups in one encoded varint.
///
/// Ten 7-bit groups cover the full u64 range. Decoders stop after this
/// many groups and report the varint as malformed.
pub const MAX_VARINT_LEN: usize = 10;

/// Wire type 0: base-128 varint.
pub const WIRE_VARINT: u8 = 0;

/// Wire type 1: fixed 64-bit value (skipped, never produced).
pub const WIRE_FIXED64: u8 = 1;

/// Wire type 2: length-delimited payload.
pub const WIRE_LENGTH_DELIMITED: u8 = 2;

/// Wire type 5: fixed 32-bit value (skipped, never produced).
pub const WIRE_FIXED32: u8 = 5;

/// Top-level field number holding one length-delimited item per record.
pub const ITEM_FIELD: u64 = 1;

/// Item field number holding the record id as a varint.
pub const KEY_FIELD: u64 = 1;

/// Item field number holding one packed-varint value sequence.
///
/// Flat records serialize a single instance; nested records serialize one
/// instance per inner sequence.
pub const VAL_FIELD: u64 = 2;

/// Largest serialized shard message pack will produce.
pub const MAX_MESSAGE_BYTES: usize = i32::MAX as usize;

/// Record kinds whose values are sequences of sequences rather than flat
/// integer sequences.
pub const NESTED_VALUE_KINDS: &[&str] = &["grid"];

/// Edit distance used by `FuzzyEngine::new`.
pub const DEFAULT_FUZZY_DISTANCE: u32 = 2;

/// Hard cap on the edit distance accepted by the fuzzy engine.
pub const MAX_FUZZY_DISTANCE: u32 = 4;

/// Words at or below this many characters are indexed without a deletion
/// neighborhood; a neighborhood over a very short word matches nearly
/// everything.
pub const MIN_NEIGHBORHOOD_LEN: usize = 2;

const _: () = assert!(DEFAULT_FUZZY_DISTANCE <= MAX_FUZZY_DISTANCE);
