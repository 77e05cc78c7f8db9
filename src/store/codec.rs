//! # Shard Wire Codec
//!
//! Bidirectional transformation between the packed shard format and the
//! storage tiers. The format is a sequence of length-delimited items:
//!
//! ```text
//! message  := item*
//! item     := field 1, wire type 2, length-prefixed record
//! record   := key vals*
//! key      := field 1, varint record id
//! vals     := field 2, wire type 2, length-prefixed packed varints
//! ```
//!
//! A flat record carries one `vals` instance (none when the sequence is
//! empty); a nested record carries one `vals` instance per inner row.
//!
//! ## Lazy Load
//!
//! [`index_items`] walks only the framing: it validates tags, reads each
//! record id, and notes the byte span of the whole item. Posting values
//! are decoded later, per record, by [`decode_item_values`]. A malformed
//! buffer fails the whole index pass; nothing partial escapes.

use std::collections::BTreeMap;

use eyre::{bail, ensure, Result};

use crate::config::{
    ITEM_FIELD, KEY_FIELD, MAX_MESSAGE_BYTES, VAL_FIELD, WIRE_LENGTH_DELIMITED, WIRE_VARINT,
};
use crate::encoding::varint::{decode_varint, varint_len, write_varint};
use crate::encoding::WireCursor;
use crate::store::{RecordSpan, RecordValue, ValueShape};

const fn field_header(field: u64, wire_type: u8) -> u64 {
    (field << 3) | wire_type as u64
}

/// Indexes every item span in a packed shard buffer without decoding
/// posting values.
pub fn index_items(buf: &[u8]) -> Result<BTreeMap<u64, RecordSpan>> {
    ensure!(
        buf.len() <= MAX_MESSAGE_BYTES,
        "load: buffer of {} bytes exceeds representable range",
        buf.len()
    );
    let mut spans = BTreeMap::new();
    let mut cursor = WireCursor::new(buf);
    while cursor.next()? {
        ensure!(
            cursor.tag() == ITEM_FIELD,
            "load: unexpected top-level field tag {}",
            cursor.tag()
        );
        ensure!(
            cursor.wire_type() == WIRE_LENGTH_DELIMITED,
            "load: item field must be length-delimited, got wire type {}",
            cursor.wire_type()
        );
        let len = cursor.read_varint()? as usize;
        let offset = cursor.pos();
        let item = cursor.read_bytes(len)?;
        let id = item_record_id(item)?;
        spans.insert(id, RecordSpan::new(offset as u32, len as u32));
    }
    Ok(spans)
}

/// Reads the leading record id of one encoded item.
///
/// The key field must come first; an item without it cannot be indexed.
fn item_record_id(item: &[u8]) -> Result<u64> {
    let mut cursor = WireCursor::new(item);
    ensure!(cursor.next()?, "load: empty item record");
    ensure!(
        cursor.tag() == KEY_FIELD && cursor.wire_type() == WIRE_VARINT,
        "load: item record missing leading id field (found tag {})",
        cursor.tag()
    );
    cursor.read_varint()
}

/// Decodes the posting values of one encoded item into the shape stored
/// by its record kind.
pub fn decode_item_values(item: &[u8], shape: ValueShape) -> Result<RecordValue> {
    let mut flat = Vec::new();
    let mut nested = Vec::new();
    let mut cursor = WireCursor::new(item);
    while cursor.next()? {
        match cursor.tag() {
            tag if tag == KEY_FIELD => cursor.skip()?,
            tag if tag == VAL_FIELD => {
                let len = cursor.read_varint()? as usize;
                let payload = cursor.read_bytes(len)?;
                let values = decode_packed(payload)?;
                match shape {
                    ValueShape::Flat => flat.extend(values),
                    ValueShape::Nested => nested.push(values),
                }
            }
            other => bail!("get: unexpected field tag {} in item record", other),
        }
    }
    Ok(match shape {
        ValueShape::Flat => RecordValue::Flat(flat),
        ValueShape::Nested => RecordValue::Nested(nested),
    })
}

/// Decodes a packed-varint payload into its integer sequence.
fn decode_packed(payload: &[u8]) -> Result<Vec<u64>> {
    let mut values = Vec::new();
    let mut pos = 0;
    while pos < payload.len() {
        let (value, len) = decode_varint(&payload[pos..])?;
        values.push(value);
        pos += len;
    }
    Ok(values)
}

/// Appends one encoded item for (`id`, `value`) to `out`.
pub fn encode_item(id: u64, value: &RecordValue, out: &mut Vec<u8>) {
    let mut item = Vec::with_capacity(varint_len(id) + 2 + encoded_values_len(value));
    write_varint(&mut item, field_header(KEY_FIELD, WIRE_VARINT));
    write_varint(&mut item, id);
    match value {
        RecordValue::Flat(values) => {
            if !values.is_empty() {
                write_values_field(&mut item, values);
            }
        }
        RecordValue::Nested(rows) => {
            for row in rows {
                write_values_field(&mut item, row);
            }
        }
    }
    write_varint(out, field_header(ITEM_FIELD, WIRE_LENGTH_DELIMITED));
    write_varint(out, item.len() as u64);
    out.extend_from_slice(&item);
}

fn encoded_values_len(value: &RecordValue) -> usize {
    match value {
        RecordValue::Flat(values) => values.iter().map(|&v| varint_len(v)).sum(),
        RecordValue::Nested(rows) => rows
            .iter()
            .map(|row| row.iter().map(|&v| varint_len(v)).sum::<usize>() + 2)
            .sum(),
    }
}

fn write_values_field(out: &mut Vec<u8>, values: &[u64]) {
    let payload_len: usize = values.iter().map(|&v| varint_len(v)).sum();
    write_varint(out, field_header(VAL_FIELD, WIRE_LENGTH_DELIMITED));
    write_varint(out, payload_len as u64);
    for &value in values {
        write_varint(out, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_message(items: &[(u64, RecordValue)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (id, value) in items {
            encode_item(*id, value, &mut out);
        }
        out
    }

    #[test]
    fn encode_item_flat_wire_bytes() {
        let mut out = Vec::new();
        encode_item(42, &RecordValue::Flat(vec![1, 2, 3]), &mut out);
        // item header + len, key field, vals field with 3 packed varints
        assert_eq!(
            out,
            vec![0x0a, 0x07, 0x08, 0x2a, 0x12, 0x03, 0x01, 0x02, 0x03]
        );
    }

    #[test]
    fn encode_item_empty_flat_omits_vals_field() {
        let mut out = Vec::new();
        encode_item(9, &RecordValue::Flat(vec![]), &mut out);
        assert_eq!(out, vec![0x0a, 0x02, 0x08, 0x09]);
    }

    #[test]
    fn index_items_records_spans_without_decoding() {
        let buf = encode_message(&[
            (3, RecordValue::Flat(vec![7, 8])),
            (1, RecordValue::Flat(vec![9])),
        ]);
        let spans = index_items(&buf).unwrap();
        assert_eq!(spans.len(), 2);
        assert!(spans.contains_key(&1));
        assert!(spans.contains_key(&3));
    }

    #[test]
    fn index_items_rejects_unknown_top_level_tag() {
        // field 3, wire type 2
        let buf = vec![0x1a, 0x02, 0x08, 0x01];
        let result = index_items(&buf);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unexpected top-level field tag"));
    }

    #[test]
    fn index_items_rejects_item_without_leading_id() {
        // item whose first field is tag 2
        let buf = vec![0x0a, 0x03, 0x12, 0x01, 0x05];
        let result = index_items(&buf);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("missing leading id field"));
    }

    #[test]
    fn index_items_rejects_truncated_buffer() {
        let buf = encode_message(&[(5, RecordValue::Flat(vec![1, 2, 3, 4, 5]))]);
        for cut in 1..buf.len() {
            assert!(
                index_items(&buf[..cut]).is_err(),
                "truncation at byte {} must fail",
                cut
            );
        }
    }

    #[test]
    fn decode_item_values_flat_roundtrip() {
        let buf = encode_message(&[(42, RecordValue::Flat(vec![0, 300, u64::MAX]))]);
        let spans = index_items(&buf).unwrap();
        let span = spans[&42];
        let item = &buf[span.offset as usize..(span.offset + span.len) as usize];
        let value = decode_item_values(item, ValueShape::Flat).unwrap();
        assert_eq!(value, RecordValue::Flat(vec![0, 300, u64::MAX]));
    }

    #[test]
    fn decode_item_values_nested_keeps_rows() {
        let rows = vec![vec![1, 2], vec![], vec![3]];
        let buf = encode_message(&[(7, RecordValue::Nested(rows.clone()))]);
        let spans = index_items(&buf).unwrap();
        let span = spans[&7];
        let item = &buf[span.offset as usize..(span.offset + span.len) as usize];
        let value = decode_item_values(item, ValueShape::Nested).unwrap();
        assert_eq!(value, RecordValue::Nested(rows));
    }

    #[test]
    fn decode_item_values_flat_concatenates_repeated_vals_fields() {
        // two vals instances read back as one flat sequence
        let buf = encode_message(&[(7, RecordValue::Nested(vec![vec![1, 2], vec![3]]))]);
        let spans = index_items(&buf).unwrap();
        let span = spans[&7];
        let item = &buf[span.offset as usize..(span.offset + span.len) as usize];
        let value = decode_item_values(item, ValueShape::Flat).unwrap();
        assert_eq!(value, RecordValue::Flat(vec![1, 2, 3]));
    }

    #[test]
    fn decode_item_values_rejects_unknown_item_tag() {
        // key field followed by field 3
        let item = vec![0x08, 0x01, 0x18, 0x00];
        let result = decode_item_values(&item, ValueShape::Flat);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unexpected field tag 3"));
    }

    #[test]
    fn index_items_empty_buffer_is_empty_shard() {
        assert!(index_items(&[]).unwrap().is_empty());
    }
}
