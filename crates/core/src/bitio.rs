//! Bit-level I/O shared by every codec.
//!
//! All codecs agree on one bit order: MSB-first within each byte, so bit
//! position 0 is the most significant bit of byte 0.
//!
//! # Padding Rules
//! - `BitWriter`: pads the final partial byte with trailing zeros and reports
//!   how many bits of padding it added
//! - `BitReader`: cannot tell padding from data; callers bound their reads
//!   with lengths they carry themselves
//!
//! # Example
//! ```
//! use codec_sim_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bit(true);
//! assert_eq!(writer.padding_bits(), 4);
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes, vec![0b1011_0000]);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1011);
//! ```

use crate::error::{BitIoError, Result};

/// Read bit `pos` (MSB-first) of `data`.
///
/// Returns `None` when `pos` is past the end of the buffer.
#[inline]
pub fn get_bit(data: &[u8], pos: usize) -> Option<bool> {
    data.get(pos / 8).map(|byte| (byte >> (7 - pos % 8)) & 1 == 1)
}

/// Flip bit `pos` (MSB-first) of `data`; out-of-range positions are ignored.
#[inline]
pub fn flip_bit(data: &mut [u8], pos: usize) {
    if let Some(byte) = data.get_mut(pos / 8) {
        *byte ^= 0x80 >> (pos % 8);
    }
}

/// Appends bits MSB-first into byte-aligned storage.
///
/// # Invariants
/// - `bytes.len() == bit_len.div_ceil(8)`
/// - unused low bits of the last byte are zero
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Append a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> offset;
        }
        self.bit_len += 1;
    }

    /// Append the low `count` bits of `value`, most significant first.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 == 1);
        }
        Ok(())
    }

    /// Append all 8 bits of `byte`.
    pub fn write_byte(&mut self, byte: u8) {
        if self.bit_len % 8 == 0 {
            self.bytes.push(byte);
            self.bit_len += 8;
        } else {
            for shift in (0..8).rev() {
                self.write_bit((byte >> shift) & 1 == 1);
            }
        }
    }

    /// Total number of bits written.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Number of zero bits `finish` will leave at the end of the last byte.
    pub fn padding_bits(&self) -> usize {
        (8 - self.bit_len % 8) % 8
    }

    /// Consume the writer, returning the zero-padded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads bits MSB-first from a borrowed buffer.
///
/// # Invariants
/// - `position` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Read one bit.
    ///
    /// # Errors
    /// `BitIoError::UnexpectedEof` when the buffer is exhausted.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        let bit = get_bit(self.data, self.position).ok_or(BitIoError::UnexpectedEof)?;
        self.position += 1;
        Ok(bit)
    }

    /// Read `count` bits (at most 64) into the low bits of the result.
    ///
    /// Nothing is consumed when fewer than `count` bits remain.
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }
        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Read the next 8 bits as a byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Bits left before the end of the buffer.
    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    /// Current bit position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once every bit has been consumed.
    pub fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }
}
