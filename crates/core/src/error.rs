//! Error types for the codec library.
//!
//! Every codec validates its input before indexing into it and reports
//! malformed buffers as structured errors rather than panicking.

use thiserror::Error;

/// Top-level error type for all operations in the library.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: reading/writing bits from/to byte buffers
/// - Huffman: compressed stream structure
/// - Codec: block alignment, parameters, parity rejection
/// - Noise: injector parameters
/// - Framing: envelope serialization/parsing
/// - CRC: envelope corruption detected
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Huffman stream is malformed
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Compression or error-correcting code rejected its input
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Channel noise injector misconfigured
    #[error("noise error: {0}")]
    Noise(#[from] NoiseError),

    /// Envelope error (e.g., invalid header, length mismatch)
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// CRC validation failed, indicating data corruption
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Huffman stream errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// Header byte does not encode a padding count in 0..=7
    #[error("invalid padding header {0:#04x}")]
    InvalidPadding(u8),

    /// Serialized tree describes more nodes than 256 leaves allow
    #[error("serialized tree exceeds {max} nodes")]
    TreeTooLarge { max: usize },

    /// Stream ended inside the tree description or inside a code
    #[error("truncated huffman stream at bit position {position}")]
    TruncatedStream { position: usize },
}

/// Errors shared by the compressors and error-correcting codes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Buffer length is not aligned to the codec's block structure
    #[error("{codec}: invalid input length {length} ({reason})")]
    InvalidInputLength {
        codec: &'static str,
        length: usize,
        reason: &'static str,
    },

    /// Construction parameter out of range
    #[error("{codec}: invalid {name} {value}")]
    InvalidParameter {
        codec: &'static str,
        name: &'static str,
        value: usize,
    },

    /// Payload too large to describe in the codec's length prefix
    #[error("{codec}: payload of {length} bytes exceeds {max}")]
    PayloadTooLarge {
        codec: &'static str,
        length: usize,
        max: usize,
    },

    /// Parity check failed on too many byte pairs; the payload is unusable
    #[error("parity check failed on {failures} byte pairs (threshold {threshold})")]
    TooManyParityFailures { failures: usize, threshold: usize },
}

/// Channel noise errors.
#[derive(Debug, Error)]
pub enum NoiseError {
    /// Noise level is not a finite percentage in [0, 100]
    #[error("noise level {0} is not a percentage in [0, 100]")]
    InvalidLevel(f64),
}

/// Envelope framing errors.
#[derive(Debug, Error)]
pub enum FramingError {
    /// Invalid magic number in header
    #[error("invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Frame is too short to contain a valid header
    #[error("frame too short: need at least {required} bytes, got {actual}")]
    FrameTooShort { required: usize, actual: usize },

    /// Frame length disagrees with the header
    #[error("frame length mismatch: header says {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Field does not fit its length prefix
    #[error("{field} of {length} bytes exceeds {max}")]
    FieldTooLong {
        field: &'static str,
        length: usize,
        max: usize,
    },

    /// Payload tag is not valid UTF-8
    #[error("payload tag is not valid UTF-8")]
    InvalidTag,
}

impl CodecError {
    pub(crate) fn invalid_length(codec: &'static str, length: usize, reason: &'static str) -> Self {
        CodecError::InvalidInputLength {
            codec,
            length,
            reason,
        }
    }
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
