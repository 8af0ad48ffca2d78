//! Lossless compressors.
//!
//! Both variants are stateless: `decompress(compress(d)) == d` for every byte
//! sequence, and each compressed stream is self-describing (no side channel
//! for tables or lengths).

pub mod huffman;
pub mod rle;

pub use huffman::{Huffman, HuffmanTree};
pub use rle::{RunDescriptor, RunLength};

use crate::error::Result;

/// Capability shared by all compressors.
pub trait Compressor {
    /// Compress `data` into a self-describing stream.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Restore the bytes passed to `compress`.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Closed set of compressors, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionScheme {
    Huffman,
    RunLength,
}

impl CompressionScheme {
    /// Short lowercase name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            CompressionScheme::Huffman => "huffman",
            CompressionScheme::RunLength => "rle",
        }
    }
}

impl Compressor for CompressionScheme {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionScheme::Huffman => Huffman.compress(data),
            CompressionScheme::RunLength => RunLength.compress(data),
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionScheme::Huffman => Huffman.decompress(data),
            CompressionScheme::RunLength => RunLength.decompress(data),
        }
    }
}
