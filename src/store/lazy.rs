//! # LazyShard - Span-Indexed Wire Buffer
//!
//! A `LazyShard` is the parse-on-read tier of the cache: record ids mapped
//! to byte spans of still-encoded items inside one wire buffer. Loading a
//! shard only walks the item framing; the posting values behind each span
//! stay encoded until a record is actually queried.
//!
//! ## Ownership Contract
//!
//! The shard owns a private reference-counted copy of the whole wire
//! buffer (`Arc<[u8]>`). Spans are stored as offset+length pairs into that
//! buffer and are re-validated against the buffer bounds on every access,
//! so a record read can never touch freed or foreign memory regardless of
//! what the caller does with the original buffer.
//!
//! ## Read Cost
//!
//! `record_bytes` is a map lookup plus a bounds check; decoding the
//! returned span costs O(span length) and is repeated on every read. For
//! shards that are queried sparsely this is far cheaper than eagerly
//! materializing every record at load time.

use std::collections::BTreeMap;
use std::sync::Arc;

use eyre::{eyre, Result};

/// Byte range of one encoded item inside a shard buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpan {
    pub offset: u32,
    pub len: u32,
}

impl RecordSpan {
    pub fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }
}

#[derive(Debug, Clone)]
pub struct LazyShard {
    buf: Arc<[u8]>,
    spans: BTreeMap<u64, RecordSpan>,
}

impl LazyShard {
    pub fn new(buf: Arc<[u8]>, spans: BTreeMap<u64, RecordSpan>) -> Self {
        Self { buf, spans }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.spans.contains_key(&id)
    }

    /// Record ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.spans.keys().copied()
    }

    /// Size in bytes of the owned wire buffer.
    pub fn buffer_len(&self) -> usize {
        self.buf.len()
    }

    /// The still-encoded item bytes for `id`, or `None` if the shard has
    /// no such record.
    pub fn record_bytes(&self, id: u64) -> Result<Option<&[u8]>> {
        let Some(span) = self.spans.get(&id) else {
            return Ok(None);
        };
        let start = span.offset as usize;
        let end = start + span.len as usize;
        let bytes = self.buf.get(start..end).ok_or_else(|| {
            eyre!(
                "record span {}..{} exceeds shard buffer of {} bytes",
                start,
                end,
                self.buf.len()
            )
        })?;
        Ok(Some(bytes))
    }
}
