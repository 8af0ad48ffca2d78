//! Run-length compressor with literal runs.
//!
//! The stream is a sequence of descriptors, each led by a count byte whose
//! sign (as `i8`) tags the kind of run:
//!
//! ```text
//! literal run:  n (1..=127)          then n bytes copied verbatim
//! repeat run:   count + 128 (<= 0)   then one byte, repeated count times
//! ```
//!
//! Runs of identical bytes are capped at 127 and split beyond that. Adjacent
//! runs of length 1 are merged into literal runs so that scattered singletons
//! don't cost two bytes each.

use tracing::debug;

use crate::compress::Compressor;
use crate::error::{CodecError, Result};

/// Longest run a single descriptor can describe.
pub const MAX_RUN: usize = 127;

const CODEC: &str = "rle";

/// One decoded unit of the compressed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunDescriptor {
    /// `count` copies of `value`
    Repeat { value: u8, count: u8 },
    /// bytes copied verbatim
    Literal(Vec<u8>),
}

impl RunDescriptor {
    /// Append this descriptor's wire form to `out`.
    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            RunDescriptor::Repeat { value, count } => {
                out.push(count.wrapping_add(128));
                out.push(*value);
            }
            RunDescriptor::Literal(bytes) => {
                out.push(bytes.len() as u8);
                out.extend_from_slice(bytes);
            }
        }
    }

    /// Number of payload bytes this descriptor expands to.
    pub fn expanded_len(&self) -> usize {
        match self {
            RunDescriptor::Repeat { count, .. } => *count as usize,
            RunDescriptor::Literal(bytes) => bytes.len(),
        }
    }
}

/// Split `data` into descriptors.
///
/// First pass: lengths of equal-byte runs (capped at 127).
/// Second pass: consecutive length-1 runs become literal runs (capped at 127).
pub fn plan_runs(data: &[u8]) -> Vec<RunDescriptor> {
    let mut runs: Vec<(u8, usize)> = Vec::new();
    for &byte in data {
        match runs.last_mut() {
            Some((value, len)) if *value == byte && *len < MAX_RUN => *len += 1,
            _ => runs.push((byte, 1)),
        }
    }

    let mut descriptors = Vec::new();
    let mut literal: Vec<u8> = Vec::new();
    for (value, len) in runs {
        if len == 1 {
            literal.push(value);
            if literal.len() == MAX_RUN {
                descriptors.push(RunDescriptor::Literal(std::mem::take(&mut literal)));
            }
            continue;
        }
        if !literal.is_empty() {
            descriptors.push(RunDescriptor::Literal(std::mem::take(&mut literal)));
        }
        descriptors.push(RunDescriptor::Repeat {
            value,
            count: len as u8,
        });
    }
    if !literal.is_empty() {
        descriptors.push(RunDescriptor::Literal(literal));
    }
    descriptors
}

/// Parse a compressed stream back into descriptors.
///
/// # Errors
/// `CodecError::InvalidInputLength` if a descriptor runs past the buffer.
pub fn parse_runs(data: &[u8]) -> Result<Vec<RunDescriptor>> {
    let mut descriptors = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let count = data[pos] as i8;
        pos += 1;
        if count > 0 {
            let end = pos + count as usize;
            let bytes = data
                .get(pos..end)
                .ok_or_else(|| CodecError::invalid_length(CODEC, data.len(), "literal run truncated"))?;
            descriptors.push(RunDescriptor::Literal(bytes.to_vec()));
            pos = end;
        } else {
            let value = *data
                .get(pos)
                .ok_or_else(|| CodecError::invalid_length(CODEC, data.len(), "repeat run truncated"))?;
            let repeat = (i16::from(count) + 128) as u8;
            descriptors.push(RunDescriptor::Repeat {
                value,
                count: repeat,
            });
            pos += 1;
        }
    }
    Ok(descriptors)
}

/// Run-length compressor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLength;

impl Compressor for RunLength {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let descriptors = plan_runs(data);
        let mut out = Vec::with_capacity(data.len() / 2 + descriptors.len());
        for descriptor in &descriptors {
            descriptor.write_to(&mut out);
        }
        debug!(
            input = data.len(),
            output = out.len(),
            runs = descriptors.len(),
            "rle compress"
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let descriptors = parse_runs(data)?;
        let total = descriptors.iter().map(RunDescriptor::expanded_len).sum();
        let mut out = Vec::with_capacity(total);
        for descriptor in descriptors {
            match descriptor {
                RunDescriptor::Repeat { value, count } => {
                    out.extend(std::iter::repeat(value).take(count as usize))
                }
                RunDescriptor::Literal(bytes) => out.extend_from_slice(&bytes),
            }
        }
        debug!(input = data.len(), output = out.len(), "rle decompress");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_two_repeat_runs() {
        let packed = RunLength.compress(b"aaabbb").unwrap();
        assert_eq!(packed, vec![0x83, b'a', 0x83, b'b']);
        assert_eq!(
            parse_runs(&packed).unwrap(),
            vec![
                RunDescriptor::Repeat { value: b'a', count: 3 },
                RunDescriptor::Repeat { value: b'b', count: 3 },
            ]
        );
        assert_eq!(RunLength.decompress(&packed).unwrap(), b"aaabbb");
    }

    #[test]
    fn test_empty() {
        assert!(RunLength.compress(b"").unwrap().is_empty());
        assert!(RunLength.decompress(b"").unwrap().is_empty());
    }

    #[test]
    fn test_singletons_merge_into_literal() {
        let packed = RunLength.compress(b"abcdd").unwrap();
        assert_eq!(packed, vec![3, b'a', b'b', b'c', 0x82, b'd']);
        assert_eq!(RunLength.decompress(&packed).unwrap(), b"abcdd");
    }

    #[test]
    fn test_long_run_splits_at_127() {
        let data = vec![7u8; 300];
        let packed = RunLength.compress(&data).unwrap();
        // 127 + 127 + 46
        assert_eq!(packed, vec![0xFF, 7, 0xFF, 7, 46 + 128, 7]);
        assert_eq!(RunLength.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_run_of_128_leaves_singleton_literal() {
        let data = vec![1u8; 128];
        let packed = RunLength.compress(&data).unwrap();
        assert_eq!(packed, vec![0xFF, 1, 1, 1]);
        assert_eq!(RunLength.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_long_literal_splits_at_127() {
        let data: Vec<u8> = (0..200u32).map(|i| (i % 251) as u8).collect();
        let descriptors = plan_runs(&data);
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].expanded_len(), 127);
        assert_eq!(descriptors[1].expanded_len(), 73);
        let packed = RunLength.compress(&data).unwrap();
        assert_eq!(packed.len(), 202);
        assert_eq!(RunLength.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_truncated_literal() {
        let result = RunLength.decompress(&[5, b'a', b'b']);
        assert!(matches!(
            result,
            Err(Error::Codec(CodecError::InvalidInputLength { .. }))
        ));
    }

    #[test]
    fn test_truncated_repeat() {
        let result = RunLength.decompress(&[0x83]);
        assert!(matches!(
            result,
            Err(Error::Codec(CodecError::InvalidInputLength { .. }))
        ));
    }

    #[test]
    fn test_zero_count_byte_repeats_128_times() {
        let out = RunLength.decompress(&[0x00, b'z']).unwrap();
        assert_eq!(out, vec![b'z'; 128]);
    }
}
