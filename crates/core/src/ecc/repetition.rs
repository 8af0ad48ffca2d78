//! Bit repetition code with majority-vote decoding.
//!
//! Every payload bit is sent `count` times in a row, so each payload byte
//! becomes exactly `count` bytes. A received group of `count` bits decodes to
//! 1 only when strictly more than half of its bits are 1; an even split
//! decodes to 0. Odd counts avoid ties.

use tracing::debug;

use crate::bitio::{BitReader, BitWriter};
use crate::ecc::ErrorCode;
use crate::error::{CodecError, Result};

const CODEC: &str = "repetition";

/// Largest accepted repetition count.
pub const MAX_REPETITIONS: usize = 1024;

/// Repetition code sending each bit `count` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repetition {
    count: usize,
}

impl Repetition {
    /// # Errors
    /// `CodecError::InvalidParameter` unless `1 <= count <= 1024`.
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 || count > MAX_REPETITIONS {
            return Err(CodecError::InvalidParameter {
                codec: CODEC,
                name: "repetition count",
                value: count,
            }
            .into());
        }
        Ok(Self { count })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Largest number of flipped copies per bit that still decodes correctly.
    pub fn correctable_flips(&self) -> usize {
        (self.count - 1) / 2
    }
}

impl ErrorCode for Repetition {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let encoded_bits = data
            .len()
            .checked_mul(8 * self.count)
            .ok_or(CodecError::PayloadTooLarge {
                codec: CODEC,
                length: data.len(),
                max: usize::MAX / (8 * self.count),
            })?;

        let mut reader = BitReader::new(data);
        let mut writer = BitWriter::with_capacity(encoded_bits);
        while !reader.is_empty() {
            let bit = reader.read_bit()?;
            for _ in 0..self.count {
                writer.write_bit(bit);
            }
        }
        let out = writer.finish();
        debug!(input = data.len(), output = out.len(), count = self.count, "repetition encode");
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() % self.count != 0 {
            return Err(CodecError::invalid_length(
                CODEC,
                data.len(),
                "not a multiple of the repetition count",
            )
            .into());
        }

        let payload_bits = data.len() / self.count * 8;
        let mut reader = BitReader::new(data);
        let mut writer = BitWriter::with_capacity(payload_bits);
        for _ in 0..payload_bits {
            let mut ones = 0;
            for _ in 0..self.count {
                ones += usize::from(reader.read_bit()?);
            }
            writer.write_bit(ones * 2 > self.count);
        }
        let out = writer.finish();
        debug!(input = data.len(), output = out.len(), count = self.count, "repetition decode");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::flip_bit;
    use crate::error::Error;

    #[test]
    fn test_encoding_layout() {
        let code = Repetition::new(3).unwrap();
        // 1010_0000 -> 111 000 111 000 000 000 000 000
        assert_eq!(
            code.encode(&[0b1010_0000]).unwrap(),
            vec![0b1110_0011, 0b1000_0000, 0b0000_0000]
        );
    }

    #[test]
    fn test_output_is_count_bytes_per_input_byte() {
        for count in 1..=9 {
            let code = Repetition::new(count).unwrap();
            assert_eq!(code.encode(b"abcd").unwrap().len(), 4 * count);
        }
    }

    #[test]
    fn test_two_of_five_flips_corrected() {
        let code = Repetition::new(5).unwrap();
        let mut encoded = code.encode(&[0b1000_0001]).unwrap();
        // first group (bit 1) and last group (bit 1)
        flip_bit(&mut encoded, 0);
        flip_bit(&mut encoded, 4);
        flip_bit(&mut encoded, 35);
        flip_bit(&mut encoded, 39);
        // a 0 bit with two copies flipped to 1
        flip_bit(&mut encoded, 10);
        flip_bit(&mut encoded, 12);
        assert_eq!(code.decode(&encoded).unwrap(), vec![0b1000_0001]);
    }

    #[test]
    fn test_three_of_five_flips_invert_the_bit() {
        let code = Repetition::new(5).unwrap();
        let mut encoded = code.encode(&[0b1000_0000]).unwrap();
        for pos in 0..3 {
            flip_bit(&mut encoded, pos);
        }
        for pos in 5..8 {
            flip_bit(&mut encoded, pos);
        }
        assert_eq!(code.decode(&encoded).unwrap(), vec![0b0100_0000]);
    }

    #[test]
    fn test_tie_decodes_to_zero() {
        let code = Repetition::new(4).unwrap();
        let mut encoded = code.encode(&[0xFF]).unwrap();
        flip_bit(&mut encoded, 0);
        flip_bit(&mut encoded, 1);
        assert_eq!(code.decode(&encoded).unwrap(), vec![0x7F]);
    }

    #[test]
    fn test_correctable_flips() {
        assert_eq!(Repetition::new(1).unwrap().correctable_flips(), 0);
        assert_eq!(Repetition::new(3).unwrap().correctable_flips(), 1);
        assert_eq!(Repetition::new(5).unwrap().correctable_flips(), 2);
        assert_eq!(Repetition::new(4).unwrap().correctable_flips(), 1);
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(
            Repetition::new(0),
            Err(Error::Codec(CodecError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn test_huge_count_rejected() {
        for count in [MAX_REPETITIONS + 1, MAX_REPETITIONS * 1000, usize::MAX / 4, usize::MAX] {
            assert!(
                matches!(
                    Repetition::new(count),
                    Err(Error::Codec(CodecError::InvalidParameter { .. }))
                ),
                "count {count}"
            );
        }
    }

    #[test]
    fn test_max_count_encodes() {
        let code = Repetition::new(MAX_REPETITIONS).unwrap();
        let encoded = code.encode(&[0xAB]).unwrap();
        assert_eq!(encoded.len(), MAX_REPETITIONS);
        assert_eq!(code.decode(&encoded).unwrap(), vec![0xAB]);
    }

    #[test]
    fn test_misaligned_input_rejected() {
        let code = Repetition::new(3).unwrap();
        assert!(matches!(
            code.decode(&[0, 0, 0, 0]),
            Err(Error::Codec(CodecError::InvalidInputLength { .. }))
        ));
    }

    #[test]
    fn test_empty() {
        let code = Repetition::new(3).unwrap();
        assert!(code.encode(&[]).unwrap().is_empty());
        assert!(code.decode(&[]).unwrap().is_empty());
    }
}
