//! Bit-level writer for encoding section data.

use crate::error::{SiError, SiResult, check_bits};

/// A writer that packs bit fields MSB-first into a growable byte buffer.
///
/// All multi-byte values are written big-endian. Values are range checked
/// against their declared width instead of being masked.
#[derive(Debug, Clone)]
pub struct ByteWriter {
    /// The output buffer.
    buffer: Vec<u8>,
    /// Current bit position within the current byte (0-7).
    bit_position: u8,
    /// Current byte being written.
    current_byte: u8,
}

impl ByteWriter {
    /// Creates a new `ByteWriter` with an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            bit_position: 0,
            current_byte: 0,
        }
    }

    /// Creates a new `ByteWriter` with a pre-allocated buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            bit_position: 0,
            current_byte: 0,
        }
    }

    /// Writes `value` using the specified number of bits.
    ///
    /// # Errors
    /// Returns [`SiError::InvalidValue`] if `bits` is 0 or greater than 64,
    /// and [`SiError::ValueTooLarge`] if `value` does not fit in `bits`.
    pub fn write_bits(&mut self, field: &'static str, value: u64, bits: u8) -> SiResult<()> {
        if bits == 0 || bits > 64 {
            return Err(SiError::invalid("bits", format!("bit count {bits} not in 1..=64")));
        }
        check_bits(field, value, bits)?;

        let mut remaining_bits = bits;
        while remaining_bits > 0 {
            let available = 8 - self.bit_position;
            let count = remaining_bits.min(available);
            let shift = remaining_bits - count;
            let chunk = ((value >> shift) & ((1u64 << count) - 1)) as u8;

            self.current_byte |= chunk << (available - count);
            self.bit_position += count;

            if self.bit_position == 8 {
                self.buffer.push(self.current_byte);
                self.current_byte = 0;
                self.bit_position = 0;
            }
            remaining_bits -= count;
        }

        Ok(())
    }

    /// Writes a single bit.
    pub fn write_flag(&mut self, flag: bool) -> SiResult<()> {
        self.write_bits("flag", u64::from(flag), 1)
    }

    /// Writes `bits` reserved bits, all set to one.
    pub fn write_reserved(&mut self, bits: u8) -> SiResult<()> {
        let ones = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        self.write_bits("reserved", ones, bits)
    }

    /// Writes an 8-bit value, most significant bit first.
    pub fn write_u8(&mut self, value: u8) -> SiResult<()> {
        self.write_bits("u8", u64::from(value), 8)
    }

    /// Writes a 16-bit value in big-endian order.
    pub fn write_u16(&mut self, value: u16) -> SiResult<()> {
        self.write_bits("u16", u64::from(value), 16)
    }

    /// Writes the low 24 bits of `value`; larger values are rejected.
    pub fn write_u24(&mut self, field: &'static str, value: u32) -> SiResult<()> {
        self.write_bits(field, u64::from(value), 24)
    }

    /// Writes a 32-bit value in big-endian order.
    pub fn write_u32(&mut self, value: u32) -> SiResult<()> {
        self.write_bits("u32", u64::from(value), 32)
    }

    /// Writes a complete byte array.
    ///
    /// Bytes are copied straight into the buffer when the writer is byte
    /// aligned and written bit by bit otherwise.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> SiResult<()> {
        if self.bit_position != 0 {
            for &byte in bytes {
                self.write_u8(byte)?;
            }
            return Ok(());
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Writes a length-prefixed byte string (8-bit length).
    pub fn write_string8(&mut self, field: &'static str, bytes: &[u8]) -> SiResult<()> {
        self.write_bits(field, bytes.len() as u64, 8)?;
        self.write_bytes(bytes)
    }

    /// Overwrites one already written byte.
    pub fn patch_u8(&mut self, offset: usize, value: u8) -> SiResult<()> {
        let len = self.buffer.len();
        let slot = self
            .buffer
            .get_mut(offset)
            .ok_or_else(|| SiError::invalid("offset", format!("{offset} beyond {len} bytes")))?;
        *slot = value;
        Ok(())
    }

    /// Overwrites the low 12 bits of the 16-bit field at `offset`, keeping
    /// the 4 high bits already written there.
    pub fn patch_length12(&mut self, offset: usize, length: usize) -> SiResult<()> {
        check_bits("length", length as u64, 12)?;
        let len = self.buffer.len();
        if offset + 2 > len {
            return Err(SiError::invalid("offset", format!("{offset} beyond {len} bytes")));
        }
        self.buffer[offset] = (self.buffer[offset] & 0xF0) | ((length >> 8) as u8 & 0x0F);
        self.buffer[offset + 1] = (length & 0xFF) as u8;
        Ok(())
    }

    /// Finishes writing and returns the complete buffer.
    ///
    /// A partially written last byte is padded with zeros.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_position > 0 {
            self.buffer.push(self.current_byte);
        }
        self.buffer
    }

    /// Returns the number of completed bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bits have been written yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.bit_position == 0
    }

    /// Returns the current bit position within the current byte.
    pub fn bit_position(&self) -> u8 {
        self.bit_position
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
