//! # Wire Encoding
//!
//! Low-level encoding primitives shared by the shard codec:
//!
//! - `varint`: base-128 variable-length unsigned integers
//! - `cursor`: a bounds-checked streaming reader over tagged wire fields

pub mod cursor;
pub mod varint;

pub use cursor::WireCursor;
pub use varint::{decode_varint, encode_varint, varint_len, write_varint};
