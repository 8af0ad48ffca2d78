//! Single-parity-bit detection code.
//!
//! Each payload byte travels as a pair `[byte, parity]`, where the low bit of
//! `parity` is the XOR of the byte's 8 bits. The decoder can only tell that a
//! pair is inconsistent, not which bit flipped, so it never corrects. Instead
//! it counts failing pairs across the whole payload and rejects the entire
//! payload once the count reaches the threshold; below it the data is passed
//! through as received.
//!
//! Even numbers of flips inside a pair (two data bits, or a data bit together
//! with the parity bit) leave the parity consistent and go unnoticed.

use tracing::{debug, warn};

use crate::ecc::ErrorCode;
use crate::error::{CodecError, Result};

const CODEC: &str = "parity";

/// Failing pairs at which a payload is rejected.
pub const DEFAULT_FAILURE_THRESHOLD: usize = 10;

/// Parity of the 8 bits of `byte` (1 when an odd number are set).
#[inline]
fn parity_of(byte: u8) -> u8 {
    (byte.count_ones() & 1) as u8
}

/// Parity-check code with a whole-payload rejection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParityCheck {
    threshold: usize,
}

impl Default for ParityCheck {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl ParityCheck {
    /// Reject payloads once `threshold` pairs fail their check.
    ///
    /// # Errors
    /// `CodecError::InvalidParameter` when `threshold` is 0, which would
    /// reject even a clean payload.
    pub fn with_threshold(threshold: usize) -> Result<Self> {
        if threshold == 0 {
            return Err(CodecError::InvalidParameter {
                codec: CODEC,
                name: "failure threshold",
                value: threshold,
            }
            .into());
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of `[byte, parity]` pairs in `data` whose parity disagrees.
    ///
    /// # Errors
    /// `CodecError::InvalidInputLength` if `data` has odd length.
    pub fn count_failures(&self, data: &[u8]) -> Result<usize> {
        if data.len() % 2 != 0 {
            return Err(CodecError::invalid_length(CODEC, data.len(), "odd number of bytes").into());
        }
        Ok(data
            .chunks_exact(2)
            .filter(|pair| parity_of(pair[0]) != pair[1] & 1)
            .count())
    }
}

impl ErrorCode for ParityCheck {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 2);
        for &byte in data {
            out.push(byte);
            out.push(parity_of(byte));
        }
        debug!(input = data.len(), output = out.len(), "parity encode");
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let failures = self.count_failures(data)?;
        if failures >= self.threshold {
            warn!(failures, threshold = self.threshold, "parity check rejected payload");
            return Err(CodecError::TooManyParityFailures {
                failures,
                threshold: self.threshold,
            }
            .into());
        }
        let out: Vec<u8> = data.chunks_exact(2).map(|pair| pair[0]).collect();
        debug!(input = data.len(), output = out.len(), failures, "parity decode");
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
        let code = ParityCheck::default();
        assert_eq!(
            code.encode(&[0x00, 0x01, 0x03, 0xFF, 0x80]).unwrap(),
            vec![0x00, 0, 0x01, 1, 0x03, 0, 0xFF, 0, 0x80, 1]
        );
    }

    #[test]
    fn test_clean_round_trip() {
        let code = ParityCheck::default();
        let data: Vec<u8> = (0..=255).collect();
        let encoded = code.encode(&data).unwrap();
        assert_eq!(code.count_failures(&encoded).unwrap(), 0);
        assert_eq!(code.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_single_data_bit_flip_detected() {
        let code = ParityCheck::default();
        for bit in 0..8 {
            let mut encoded = code.encode(b"xy").unwrap();
            flip_bit(&mut encoded, 16 + bit);
            assert_eq!(code.count_failures(&encoded).unwrap(), 1, "bit {bit}");
        }
    }

    #[test]
    fn test_data_and_parity_flip_goes_unnoticed() {
        let code = ParityCheck::default();
        let mut encoded = code.encode(b"q").unwrap();
        flip_bit(&mut encoded, 3); // data bit
        flip_bit(&mut encoded, 15); // low bit of the parity byte
        assert_eq!(code.count_failures(&encoded).unwrap(), 0);
        // Detection only: the corrupted byte is returned as received.
        assert_eq!(code.decode(&encoded).unwrap(), vec![b'q' ^ 0x10]);
    }

    #[test]
    fn test_failures_below_threshold_pass_through() {
        let code = ParityCheck::default();
        let data = vec![0u8; 20];
        let mut encoded = code.encode(&data).unwrap();
        for pair in 0..9 {
            flip_bit(&mut encoded, pair * 16);
        }
        let decoded = code.decode(&encoded).unwrap();
        assert_eq!(decoded.len(), 20);
        assert_eq!(decoded.iter().filter(|&&b| b == 0x80).count(), 9);
    }

    #[test]
    fn test_threshold_rejects_whole_payload() {
        let code = ParityCheck::default();
        let data = vec![0u8; 20];
        let mut encoded = code.encode(&data).unwrap();
        for pair in 0..10 {
            flip_bit(&mut encoded, pair * 16);
        }
        assert!(matches!(
            code.decode(&encoded),
            Err(Error::Codec(CodecError::TooManyParityFailures {
                failures: 10,
                threshold: 10
            }))
        ));
    }

    #[test]
    fn test_custom_threshold() {
        let code = ParityCheck::with_threshold(1).unwrap();
        let mut encoded = code.encode(b"ab").unwrap();
        flip_bit(&mut encoded, 0);
        assert!(code.decode(&encoded).is_err());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        assert!(matches!(
            ParityCheck::with_threshold(0),
            Err(Error::Codec(CodecError::InvalidParameter { value: 0, .. }))
        ));
        let clean = ParityCheck::with_threshold(1).unwrap().encode(b"ok").unwrap();
        assert_eq!(ParityCheck::with_threshold(1).unwrap().decode(&clean).unwrap(), b"ok");
    }

    #[test]
    fn test_odd_length_rejected() {
        let code = ParityCheck::default();
        assert!(matches!(
            code.decode(&[1, 1, 1]),
            Err(Error::Codec(CodecError::InvalidInputLength { .. }))
        ));
    }

    #[test]
    fn test_empty() {
        let code = ParityCheck::default();
        assert!(code.encode(&[]).unwrap().is_empty());
        assert!(code.decode(&[]).unwrap().is_empty());
    }
}
