//! # WireCursor - Streaming Wire Reader
//!
//! This module provides `WireCursor`, a minimal streaming reader over a
//! byte buffer in the tagged wire format used by packed shards. Every
//! field starts with a varint header whose upper bits are the field tag
//! and whose low three bits are the wire type.
//!
//! ## Usage
//!
//! ```
//! use gazetteer::encoding::WireCursor;
//!
//! let mut cursor = WireCursor::new(&[0x08, 0x2a]);
//! assert!(cursor.next()?);
//! assert_eq!(cursor.tag(), 1);
//! assert_eq!(cursor.read_varint()?, 42);
//! assert!(!cursor.next()?);
//! # Ok::<(), eyre::Report>(())
//! ```
//!
//! ## Bounds Discipline
//!
//! The cursor never reads outside its slice: every advance is checked
//! against the remaining length before any byte is touched, so a
//! truncated or hostile buffer surfaces as an error, never as a
//! wild read.

use eyre::{bail, ensure, Result};

use crate::config::{WIRE_FIXED32, WIRE_FIXED64, WIRE_LENGTH_DELIMITED, WIRE_VARINT};
use crate::encoding::varint::decode_varint;

#[derive(Debug)]
pub struct WireCursor<'a> {
    data: &'a [u8],
    pos: usize,
    tag: u64,
    wire_type: u8,
}

impl<'a> WireCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            tag: 0,
            wire_type: WIRE_VARINT,
        }
    }

    /// Advances to the next field header.
    ///
    /// Returns `Ok(false)` once the cursor has consumed the whole buffer.
    /// Fails if a header starts but the buffer ends inside it.
    pub fn next(&mut self) -> Result<bool> {
        if self.pos >= self.data.len() {
            return Ok(false);
        }
        let header = self.read_varint()?;
        self.tag = header >> 3;
        self.wire_type = (header & 0x7) as u8;
        Ok(true)
    }

    /// Field tag of the most recently read header.
    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Wire type of the most recently read header.
    pub fn wire_type(&self) -> u8 {
        self.wire_type
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, len) = decode_varint(&self.data[self.pos..])?;
        self.pos += len;
        Ok(value)
    }

    /// Skips the value of the current field based on its wire type.
    pub fn skip(&mut self) -> Result<()> {
        match self.wire_type {
            WIRE_VARINT => {
                self.read_varint()?;
                Ok(())
            }
            WIRE_FIXED64 => self.skip_bytes(8),
            WIRE_LENGTH_DELIMITED => {
                let len = self.read_varint()?;
                self.skip_bytes(len as usize)
            }
            WIRE_FIXED32 => self.skip_bytes(4),
            other => bail!("cannot skip unknown wire type {}", other),
        }
    }

    pub fn skip_bytes(&mut self, n: usize) -> Result<()> {
        ensure!(
            self.remaining() >= n,
            "unexpected end of buffer: need {} bytes, {} remain",
            n,
            self.remaining()
        );
        self.pos += n;
        Ok(())
    }

    /// Reads the next `n` bytes as a slice borrowed from the buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        ensure!(
            self.remaining() >= n,
            "unexpected end of buffer: need {} bytes, {} remain",
            n,
            self.remaining()
        );
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}
