//! codec-sim-core: compressors, channel codes and a noisy-channel simulator
//!
//! This library provides the building blocks for studying how data survives
//! an unreliable link:
//! - Shrinks payloads with Huffman coding or run-length encoding
//! - Protects them with Hamming, parity-check or repetition codes
//! - Corrupts them with a seeded bit-flip injector
//! - Frames, transmits and scores the result
//!
//! # Architecture
//!
//! - `bitio`: MSB-first bit reading/writing
//! - `compress`: `Compressor` trait, Huffman and run-length codecs
//! - `ecc`: `ErrorCode` trait, Hamming, parity-check and repetition codes
//! - `noise`: channel noise injector with seeded randomness
//! - `framing`: tagged message envelope with CRC
//! - `pipeline`: compress -> encode -> noise -> decode -> decompress
//! - `metrics`: outcome counters and reporting
//!
//! # Design Principles
//!
//! - **No panics**: malformed input yields structured errors
//! - **Bounded memory**: decoders never allocate from untrusted sizes alone
//! - **Deterministic**: seeded randomness makes runs reproducible
//!
//! # Example
//!
//! ```
//! use codec_sim_core::compress::CompressionScheme;
//! use codec_sim_core::ecc::Hamming;
//! use codec_sim_core::noise::ChannelNoise;
//! use codec_sim_core::pipeline::{CodecPipeline, Outcome, PipelineConfig};
//!
//! let pipeline = CodecPipeline::new(PipelineConfig::new(
//!     Some(CompressionScheme::Huffman),
//!     Some(Hamming::new(8)?.into()),
//! ));
//! let mut noise = ChannelNoise::new(7);
//! let sent = pipeline.transmit(b"hello, noisy world", &mut noise, 0.0)?;
//! assert_eq!(sent.outcome(b"hello, noisy world"), Outcome::Intact);
//! # Ok::<(), codec_sim_core::Error>(())
//! ```

pub mod bitio;
pub mod compress;
pub mod ecc;
pub mod error;
pub mod framing;
pub mod metrics;
pub mod noise;
pub mod pipeline;

// Re-export commonly used types
pub use compress::{CompressionScheme, Compressor};
pub use ecc::{EncodingScheme, ErrorCode};
pub use error::{Error, Result};
pub use noise::ChannelNoise;
