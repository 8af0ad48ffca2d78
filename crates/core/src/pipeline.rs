//! Compress-then-protect pipeline and single-shot channel transmission.
//!
//! ```text
//! payload -> [compress] -> [encode] -> wire -> noise -> [decode] -> [decompress]
//! ```
//!
//! Either stage may be absent. Compression runs before the channel code so
//! the redundancy the code adds is never squeezed back out.

use std::fmt;

use tracing::debug;

use crate::compress::{CompressionScheme, Compressor};
use crate::ecc::{EncodingScheme, ErrorCode};
use crate::error::Result;
use crate::metrics::bit_errors;
use crate::noise::ChannelNoise;

/// Which stages a pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub compression: Option<CompressionScheme>,
    pub encoding: Option<EncodingScheme>,
}

impl PipelineConfig {
    pub fn new(compression: Option<CompressionScheme>, encoding: Option<EncodingScheme>) -> Self {
        Self {
            compression,
            encoding,
        }
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compression = self.compression.as_ref().map_or("none", |c| c.name());
        let encoding = self.encoding.as_ref().map_or("none", |e| e.name());
        write!(f, "{compression}+{encoding}")
    }
}

/// How a received payload compares with what was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Decoded and identical to the original
    Intact,

    /// Decoded without error but differs from the original
    Corrupted { bit_errors: usize },

    /// The decoder refused the buffer
    Rejected,
}

/// Result of pushing one payload through the channel.
#[derive(Debug)]
pub struct Transmission {
    /// Size of the encoded buffer that crossed the channel
    pub wire_bytes: usize,

    /// Bits the channel flipped
    pub bits_flipped: usize,

    /// What came out of the receiving side
    pub decoded: Result<Vec<u8>>,
}

impl Transmission {
    /// Classify the transmission against the payload that was sent.
    pub fn outcome(&self, original: &[u8]) -> Outcome {
        match &self.decoded {
            Ok(received) if received.as_slice() == original => Outcome::Intact,
            Ok(received) => Outcome::Corrupted {
                bit_errors: bit_errors(original, received),
            },
            Err(_) => Outcome::Rejected,
        }
    }
}

/// A configured compress/encode chain.
#[derive(Debug, Clone, Default)]
pub struct CodecPipeline {
    config: PipelineConfig,
}

impl CodecPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compress then encode `payload` for the channel.
    pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let compressed = match &self.config.compression {
            Some(scheme) => scheme.compress(payload)?,
            None => payload.to_vec(),
        };
        let wire = match &self.config.encoding {
            Some(scheme) => scheme.encode(&compressed)?,
            None => compressed.clone(),
        };
        debug!(
            pipeline = %self.config,
            payload = payload.len(),
            compressed = compressed.len(),
            wire = wire.len(),
            "pipeline encode"
        );
        Ok(wire)
    }

    /// Decode then decompress a received buffer.
    pub fn decode(&self, wire: &[u8]) -> Result<Vec<u8>> {
        let compressed = match &self.config.encoding {
            Some(scheme) => scheme.decode(wire)?,
            None => wire.to_vec(),
        };
        match &self.config.compression {
            Some(scheme) => scheme.decompress(&compressed),
            None => Ok(compressed),
        }
    }

    /// Encode `payload`, corrupt `level` percent of the wire bits, and decode.
    ///
    /// # Errors
    /// Fails only if encoding fails or `level` is invalid. Receive-side
    /// failures are reported in [`Transmission::decoded`].
    pub fn transmit(
        &self,
        payload: &[u8],
        noise: &mut ChannelNoise,
        level: f64,
    ) -> Result<Transmission> {
        let mut wire = self.encode(payload)?;
        let bits_flipped = noise.inject_in_place(&mut wire, level)?;
        let decoded = self.decode(&wire);
        if let Err(err) = &decoded {
            debug!(pipeline = %self.config, bits_flipped, error = %err, "receive failed");
        }
        Ok(Transmission {
            wire_bytes: wire.len(),
            bits_flipped,
            decoded,
        })
    }
}
