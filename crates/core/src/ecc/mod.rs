//! Error-detecting and error-correcting channel codes.
//!
//! | code        | rate        | guarantees                                    |
//! |-------------|-------------|-----------------------------------------------|
//! | Hamming     | n / (n + r) | corrects 1 flipped bit per codeword           |
//! | ParityCheck | 1 / 2       | detects odd flips per byte, rejects payload   |
//! | Repetition  | 1 / count   | majority vote per bit                         |
//!
//! None of them detect every multi-bit error. A Hamming codeword with two or
//! more flips, or a repetition group with half or more of its copies flipped,
//! decodes "successfully" to the wrong data.

pub mod hamming;
pub mod parity;
pub mod repetition;

pub use hamming::{Hamming, ParityMatrix};
pub use parity::{ParityCheck, DEFAULT_FAILURE_THRESHOLD};
pub use repetition::{Repetition, MAX_REPETITIONS};

use crate::error::Result;

/// Capability shared by all channel codes.
pub trait ErrorCode {
    /// Add redundancy to `data`.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Check or correct a received buffer and strip the redundancy.
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Closed set of channel codes, selectable from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingScheme {
    Hamming(Hamming),
    ParityCheck(ParityCheck),
    Repetition(Repetition),
}

impl EncodingScheme {
    /// Short lowercase name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            EncodingScheme::Hamming(_) => "hamming",
            EncodingScheme::ParityCheck(_) => "parity",
            EncodingScheme::Repetition(_) => "repetition",
        }
    }

    /// Encoded bits per payload bit, ignoring padding and headers.
    pub fn expansion(&self) -> f64 {
        match self {
            EncodingScheme::Hamming(code) => code.block_len() as f64 / code.codeword_len() as f64,
            EncodingScheme::ParityCheck(_) => 2.0,
            EncodingScheme::Repetition(code) => code.count() as f64,
        }
    }
}

impl ErrorCode for EncodingScheme {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            EncodingScheme::Hamming(code) => code.encode(data),
            EncodingScheme::ParityCheck(code) => code.encode(data),
            EncodingScheme::Repetition(code) => code.encode(data),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            EncodingScheme::Hamming(code) => code.decode(data),
            EncodingScheme::ParityCheck(code) => code.decode(data),
            EncodingScheme::Repetition(code) => code.decode(data),
        }
    }
}

impl From<Hamming> for EncodingScheme {
    fn from(code: Hamming) -> Self {
        EncodingScheme::Hamming(code)
    }
}

impl From<ParityCheck> for EncodingScheme {
    fn from(code: ParityCheck) -> Self {
        EncodingScheme::ParityCheck(code)
    }
}

impl From<Repetition> for EncodingScheme {
    fn from(code: Repetition) -> Self {
        EncodingScheme::Repetition(code)
    }
}
