//! Systematic Hamming code with single-error correction per codeword.
//!
//! The payload's bits are cut into codewords of `n` data bits. Each codeword
//! becomes a block of `n + r` bits, where `r` is the smallest integer with
//! `2^r >= n + r + 1`. Parity bits sit at the 1-indexed power-of-two
//! positions of the block, data bits fill the remaining positions in order.
//!
//! # Block Layout (n = 4, r = 3)
//!
//! ```text
//! position:  1   2   3   4   5   6   7
//! content:   p0  p1  d0  p2  d1  d2  d3
//! ```
//!
//! # Stream Format
//!
//! The encoder protects `len (u32 big-endian) || payload`, zero-padded to a
//! whole number of codewords. Blocks are packed back to back, MSB-first, and
//! the final byte is zero-padded. Carrying the length inside the protected
//! stream is what lets the decoder drop the padding: the padded bit count
//! alone cannot tell a 1-byte payload from a 2-byte one ending in `0x00`
//! when `n = 16`, and short blocks let byte padding form whole phantom blocks.
//!
//! # Limitations
//!
//! Two or more flipped bits in the same block produce a non-zero syndrome
//! that points at the wrong position; the decoder then "corrects" a third bit
//! and returns wrong data without reporting an error.

use tracing::{debug, trace, warn};

use crate::bitio::{BitReader, BitWriter};
use crate::ecc::ErrorCode;
use crate::error::{CodecError, Result};

const CODEC: &str = "hamming";

/// Largest supported number of data bits per codeword.
pub const MAX_CODEWORD_LEN: usize = 4096;

/// Size of the big-endian length prefix protected along with the payload.
const LENGTH_PREFIX: usize = 4;

/// Number of parity bits needed for `codeword_len` data bits.
///
/// Smallest `r` with `2^r >= codeword_len + r + 1`, so every position of
/// the block plus "no error" has its own syndrome value.
pub fn parity_bits_for(codeword_len: usize) -> usize {
    let mut r = 0;
    while (1usize << r) < codeword_len + r + 1 {
        r += 1;
    }
    r
}

/// Parity-check matrix `H` of a Hamming code.
///
/// Row `k` is the parity equation with weight `2^k`; column `i` (1-indexed)
/// is the binary representation of `i`. Multiplying a received block by `H`
/// mod 2 yields the syndrome, whose integer value is the 1-indexed position
/// of a single flipped bit (0 when the block is consistent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl ParityMatrix {
    /// Build the `rows x cols` matrix whose column `i` encodes `i + 1`.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = vec![false; rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                cells[row * cols + col] = ((col + 1) >> row) & 1 == 1;
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Entry at `row`, `col` (both 0-indexed).
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col]
    }

    /// Syndrome of `block` read as a binary integer (bit `k` = row `k`).
    ///
    /// `block` must hold exactly `cols` bits.
    pub fn syndrome(&self, block: &[bool]) -> usize {
        debug_assert_eq!(block.len(), self.cols);
        let mut syndrome = 0;
        for row in 0..self.rows {
            let equation = &self.cells[row * self.cols..(row + 1) * self.cols];
            let odd = equation
                .iter()
                .zip(block)
                .filter(|&(&h, &bit)| h && bit)
                .count()
                % 2
                == 1;
            if odd {
                syndrome |= 1 << row;
            }
        }
        syndrome
    }
}

/// Hamming code over codewords of a fixed number of data bits.
///
/// The matrix is built once in `new` and only read afterwards, so a
/// `Hamming` can be cloned or shared across threads freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hamming {
    codeword_len: usize,
    parity_bits: usize,
    matrix: ParityMatrix,
}

impl Hamming {
    /// Create a code with `codeword_len` data bits per block.
    ///
    /// # Errors
    /// `CodecError::InvalidParameter` unless `1 <= codeword_len <= 4096`.
    pub fn new(codeword_len: usize) -> Result<Self> {
        if codeword_len == 0 || codeword_len > MAX_CODEWORD_LEN {
            return Err(CodecError::InvalidParameter {
                codec: CODEC,
                name: "codeword length",
                value: codeword_len,
            }
            .into());
        }
        let parity_bits = parity_bits_for(codeword_len);
        Ok(Self {
            codeword_len,
            parity_bits,
            matrix: ParityMatrix::new(parity_bits, codeword_len + parity_bits),
        })
    }

    /// Data bits per codeword (`n`).
    pub fn codeword_len(&self) -> usize {
        self.codeword_len
    }

    /// Parity bits per codeword (`r`).
    pub fn parity_bits(&self) -> usize {
        self.parity_bits
    }

    /// Encoded bits per codeword (`n + r`).
    pub fn block_len(&self) -> usize {
        self.codeword_len + self.parity_bits
    }

    pub fn matrix(&self) -> &ParityMatrix {
        &self.matrix
    }

    /// Encode the bits of `bytes` with no length prefix.
    fn encode_blocks(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let block_len = self.block_len();
        let blocks = (bytes.len() * 8).div_ceil(self.codeword_len);

        let mut reader = BitReader::new(bytes);
        let mut writer = BitWriter::with_capacity(blocks * block_len);
        let mut block = vec![false; block_len];

        for _ in 0..blocks {
            for (index, slot) in block.iter_mut().enumerate() {
                let position = index + 1;
                *slot = if position.is_power_of_two() || reader.is_empty() {
                    false
                } else {
                    reader.read_bit()?
                };
            }

            let syndrome = self.matrix.syndrome(&block);
            for k in 0..self.parity_bits {
                block[(1 << k) - 1] = (syndrome >> k) & 1 == 1;
            }

            for &bit in &block {
                writer.write_bit(bit);
            }
        }

        Ok(writer.finish())
    }
}

impl ErrorCode for Hamming {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let len = u32::try_from(data.len()).map_err(|_| CodecError::PayloadTooLarge {
            codec: CODEC,
            length: data.len(),
            max: u32::MAX as usize,
        })?;

        let mut framed = Vec::with_capacity(LENGTH_PREFIX + data.len());
        framed.extend_from_slice(&len.to_be_bytes());
        framed.extend_from_slice(data);

        let out = self.encode_blocks(&framed)?;
        debug!(
            input = data.len(),
            output = out.len(),
            n = self.codeword_len,
            r = self.parity_bits,
            "hamming encode"
        );
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let block_len = self.block_len();
        let total_bits = data.len() * 8;
        let blocks = total_bits / block_len;
        if total_bits % block_len >= 8 {
            return Err(CodecError::invalid_length(CODEC, data.len(), "trailing partial block").into());
        }

        let mut reader = BitReader::new(data);
        let mut writer = BitWriter::with_capacity(blocks * self.codeword_len);
        let mut block = vec![false; block_len];
        let mut corrected = 0usize;

        for index in 0..blocks {
            for slot in block.iter_mut() {
                *slot = reader.read_bit()?;
            }

            let syndrome = self.matrix.syndrome(&block);
            if syndrome != 0 {
                if syndrome <= block_len {
                    block[syndrome - 1] ^= true;
                    corrected += 1;
                    trace!(block = index, position = syndrome, "hamming corrected bit");
                } else {
                    warn!(block = index, syndrome, "hamming syndrome outside block");
                }
            }

            for (position, &bit) in (1usize..).zip(block.iter()) {
                if !position.is_power_of_two() {
                    writer.write_bit(bit);
                }
            }
        }

        let whole_bytes = writer.bit_len() / 8;
        let mut decoded = writer.finish();
        decoded.truncate(whole_bytes);

        let Some((prefix, payload)) = decoded.split_first_chunk::<LENGTH_PREFIX>() else {
            return Err(CodecError::invalid_length(CODEC, data.len(), "missing length prefix").into());
        };
        let len = u32::from_be_bytes(*prefix) as usize;
        let Some(payload) = payload.get(..len) else {
            return Err(
                CodecError::invalid_length(CODEC, data.len(), "length prefix exceeds decoded data").into(),
            );
        };

        debug!(
            input = data.len(),
            output = payload.len(),
            blocks,
            corrected,
            "hamming decode"
        );
        Ok(payload.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::flip_bit;
    use crate::error::Error;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(37).wrapping_add(11)).collect()
    }

    #[test]
    fn test_parity_bit_counts() {
        assert_eq!(parity_bits_for(1), 2);
        assert_eq!(parity_bits_for(4), 3);
        assert_eq!(parity_bits_for(11), 4);
        assert_eq!(parity_bits_for(26), 5);
        assert_eq!(parity_bits_for(27), 6);
        assert_eq!(parity_bits_for(57), 6);
    }

    #[test]
    fn test_matrix_columns_are_positions() {
        let code = Hamming::new(4).unwrap();
        let matrix = code.matrix();
        assert_eq!((matrix.rows(), matrix.cols()), (3, 7));
        for col in 0..matrix.cols() {
            let value: usize = (0..matrix.rows())
                .map(|row| usize::from(matrix.get(row, col)) << row)
                .sum();
            assert_eq!(value, col + 1);
        }
    }

    #[test]
    fn test_invalid_codeword_len() {
        assert!(matches!(
            Hamming::new(0),
            Err(Error::Codec(CodecError::InvalidParameter { .. }))
        ));
        assert!(Hamming::new(MAX_CODEWORD_LEN).is_ok());
        for len in [MAX_CODEWORD_LEN + 1, 5000] {
            assert!(matches!(
                Hamming::new(len),
                Err(Error::Codec(CodecError::InvalidParameter { value, .. })) if value == len
            ));
        }
    }

    #[test]
    fn test_hamming_7_4_block() {
        // Data 1011 -> p0 p1 1 p2 0 1 1 with p0 = d0^d1^d3, p1 = d0^d2^d3, p2 = d1^d2^d3
        let code = Hamming::new(4).unwrap();
        let encoded = code.encode_blocks(&[0b1011_0000]).unwrap();
        // first block: 0 1 1 0 0 1 1
        assert_eq!(encoded[0] >> 1, 0b0110011);
    }

    #[test]
    fn test_every_block_is_a_codeword() {
        let code = Hamming::new(11).unwrap();
        let encoded = code.encode(&sample(9)).unwrap();
        let mut reader = BitReader::new(&encoded);
        let blocks = encoded.len() * 8 / code.block_len();
        for _ in 0..blocks {
            let block: Vec<bool> = (0..code.block_len()).map(|_| reader.read_bit().unwrap()).collect();
            assert_eq!(code.matrix().syndrome(&block), 0);
        }
    }

    #[test]
    fn test_round_trip_all_residues() {
        for n in 1..=24 {
            let code = Hamming::new(n).unwrap();
            for len in 0..=40 {
                let data = sample(len);
                let encoded = code.encode(&data).unwrap();
                assert_eq!(code.decode(&encoded).unwrap(), data, "n={n} len={len}");
            }
        }
    }

    #[test]
    fn test_padding_alone_is_ambiguous() {
        // Without the length prefix these two payloads encode identically.
        let code = Hamming::new(16).unwrap();
        assert_eq!(
            code.encode_blocks(&[0xAB]).unwrap(),
            code.encode_blocks(&[0xAB, 0x00]).unwrap()
        );
        assert_eq!(code.decode(&code.encode(&[0xAB]).unwrap()).unwrap(), vec![0xAB]);
        assert_eq!(
            code.decode(&code.encode(&[0xAB, 0x00]).unwrap()).unwrap(),
            vec![0xAB, 0x00]
        );
    }

    #[test]
    fn test_corrects_one_flip_per_block() {
        for n in [1, 4, 8, 11, 16] {
            let code = Hamming::new(n).unwrap();
            let data = sample(23);
            let mut encoded = code.encode(&data).unwrap();
            let block_len = code.block_len();
            let blocks = encoded.len() * 8 / block_len;
            for b in 0..blocks {
                flip_bit(&mut encoded, b * block_len + (b * 3) % block_len);
            }
            assert_eq!(code.decode(&encoded).unwrap(), data, "n={n}");
        }
    }

    #[test]
    fn test_two_flips_in_one_block_miscorrect_silently() {
        let code = Hamming::new(4).unwrap();
        let data = sample(8);
        let mut encoded = code.encode(&data).unwrap();
        // Block 10 lies past the 32-bit length prefix (8 blocks).
        // Flipping positions 3 and 5 gives syndrome 6, which flips position 6.
        let base = 10 * code.block_len();
        flip_bit(&mut encoded, base + 2);
        flip_bit(&mut encoded, base + 4);
        let decoded = code.decode(&encoded).unwrap();
        assert_eq!(decoded.len(), data.len());
        assert_ne!(decoded, data);
    }

    #[test]
    fn test_empty() {
        let code = Hamming::new(7).unwrap();
        assert!(code.encode(&[]).unwrap().is_empty());
        assert!(code.decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_trailing_partial_block_rejected() {
        let code = Hamming::new(26).unwrap();
        let mut encoded = code.encode(&sample(10)).unwrap();
        encoded.push(0);
        encoded.push(0);
        assert!(matches!(
            code.decode(&encoded),
            Err(Error::Codec(CodecError::InvalidInputLength { .. }))
        ));
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let code = Hamming::new(4).unwrap();
        let encoded = code.encode(&sample(30)).unwrap();
        let result = code.decode(&encoded[..encoded.len() / 2]);
        assert!(matches!(
            result,
            Err(Error::Codec(CodecError::InvalidInputLength { .. }))
        ));
    }
}
