//! Huffman compressor with an in-band tree.
//!
//! The tree is rebuilt for every call from the input's byte histogram and
//! travels inside the compressed stream, so decoding depends only on the
//! serialized structure and never on how ties were broken while building it.
//!
//! # Stream Format
//!
//! ```text
//! +---------------------+
//! | header (1 byte)     |  128 + number of zero padding bits in the last byte
//! +---------------------+
//! | tree (pre-order)    |  internal node: 1
//! |                     |  leaf:          0, then the byte value (8 bits)
//! +---------------------+
//! | codes               |  root-to-leaf path of every input byte
//! |                     |  (left = 0, right = 1)
//! +---------------------+
//! | padding             |  0..=7 zero bits to the byte boundary
//! +---------------------+
//! ```
//!
//! An empty input compresses to the header alone (`[0x80]`).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::bitio::{BitReader, BitWriter};
use crate::compress::Compressor;
use crate::error::{Error, HuffmanError, Result};

/// Bias added to the padding count in the header byte.
const PADDING_BIAS: u8 = 128;

/// Upper bound on nodes in a tree over 256 byte values (256 leaves + 255 internal).
const MAX_NODES: usize = 511;

/// A node of the arena-backed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

/// Prefix-code tree over byte values.
///
/// # Invariants
/// - every internal node has exactly two children
/// - the root is internal (at least two leaves)
/// - nodes are addressed by index into `nodes`
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build a tree by repeatedly merging the two lightest nodes.
    ///
    /// Returns `None` if every frequency is zero. A histogram with a single
    /// symbol gets a zero-frequency sibling so every leaf has a non-empty code.
    pub fn from_frequencies(freqs: &[u64; 256]) -> Option<Self> {
        let mut nodes = Vec::with_capacity(MAX_NODES);
        // (frequency, node index); indices grow in insertion order, which
        // fixes tie-breaking for this implementation.
        let mut heap = BinaryHeap::new();

        for (symbol, &freq) in freqs.iter().enumerate() {
            if freq > 0 {
                heap.push(Reverse((freq, nodes.len())));
                nodes.push(Node::Leaf(symbol as u8));
            }
        }

        match nodes.as_slice() {
            [] => return None,
            [Node::Leaf(only)] => {
                let synthetic = only.wrapping_add(1);
                heap.push(Reverse((0, nodes.len())));
                nodes.push(Node::Leaf(synthetic));
            }
            _ => {}
        }

        while heap.len() > 1 {
            let (Some(Reverse((f1, left))), Some(Reverse((f2, right)))) =
                (heap.pop(), heap.pop())
            else {
                break;
            };
            let index = nodes.len();
            nodes.push(Node::Internal { left, right });
            heap.push(Reverse((f1 + f2, index)));
        }

        let Reverse((_, root)) = heap.pop()?;
        Some(Self { nodes, root })
    }

    /// Build a tree from the histogram of `data`.
    pub fn from_data(data: &[u8]) -> Option<Self> {
        let mut freqs = [0u64; 256];
        for &byte in data {
            freqs[byte as usize] += 1;
        }
        Self::from_frequencies(&freqs)
    }

    /// Root-to-leaf path of every byte value (empty for bytes not in the tree).
    pub fn codes(&self) -> Vec<Vec<bool>> {
        let mut codes = vec![Vec::new(); 256];
        let mut stack = vec![(self.root, Vec::new())];
        while let Some((index, path)) = stack.pop() {
            match self.nodes[index] {
                Node::Leaf(symbol) => codes[symbol as usize] = path,
                Node::Internal { left, right } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((right, right_path));
                    stack.push((left, left_path));
                }
            }
        }
        codes
    }

    /// Number of leaves (distinct byte values, synthetic sibling included).
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf(_)))
            .count()
    }

    /// Write the pre-order structural description.
    pub fn serialize(&self, writer: &mut BitWriter) {
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            match self.nodes[index] {
                Node::Leaf(symbol) => {
                    writer.write_bit(false);
                    writer.write_byte(symbol);
                }
                Node::Internal { left, right } => {
                    writer.write_bit(true);
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }

    /// Rebuild a tree from its pre-order description.
    ///
    /// # Errors
    /// - `HuffmanError::TruncatedStream` if the description is cut short
    /// - `HuffmanError::TreeTooLarge` if it describes more than 511 nodes
    /// - `HuffmanError::TruncatedStream` if it is a lone leaf, which has no codes
    pub fn deserialize(reader: &mut BitReader<'_>) -> Result<Self> {
        let mut nodes: Vec<Node> = Vec::new();
        // Child slots still waiting for a node: (parent, is_right).
        let mut pending: Vec<(usize, bool)> = Vec::new();

        loop {
            if nodes.len() >= MAX_NODES {
                return Err(HuffmanError::TreeTooLarge { max: MAX_NODES }.into());
            }
            let position = reader.position();
            let truncated = |_| Error::from(HuffmanError::TruncatedStream { position });

            let index = nodes.len();
            let internal = reader.read_bit().map_err(truncated)?;
            if internal {
                // 0 is the root, which is never a child; used as "unset".
                nodes.push(Node::Internal { left: 0, right: 0 });
            } else {
                nodes.push(Node::Leaf(reader.read_byte().map_err(truncated)?));
            }

            if let Some((parent, is_right)) = pending.pop() {
                if let Node::Internal { left, right } = &mut nodes[parent] {
                    if is_right {
                        *right = index;
                    } else {
                        *left = index;
                    }
                }
            }

            if internal {
                pending.push((index, true));
                pending.push((index, false));
            }
            if pending.is_empty() {
                break;
            }
        }

        if nodes.len() < 3 {
            return Err(HuffmanError::TruncatedStream {
                position: reader.position(),
            }
            .into());
        }

        Ok(Self { nodes, root: 0 })
    }

    /// Follow bits from the root to a leaf, never reading at or past `end`.
    fn decode_symbol(&self, reader: &mut BitReader<'_>, end: usize) -> Result<u8> {
        let mut index = self.root;
        loop {
            match self.nodes[index] {
                Node::Leaf(symbol) => return Ok(symbol),
                Node::Internal { left, right } => {
                    let position = reader.position();
                    if position >= end {
                        return Err(HuffmanError::TruncatedStream { position }.into());
                    }
                    index = if reader.read_bit()? { right } else { left };
                }
            }
        }
    }
}

/// Huffman entropy coder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Huffman;

impl Compressor for Huffman {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(8 + data.len() * 8);
        // Header placeholder, patched once the padding is known.
        writer.write_byte(PADDING_BIAS);

        let Some(tree) = HuffmanTree::from_data(data) else {
            return Ok(writer.finish());
        };
        tree.serialize(&mut writer);

        let codes = tree.codes();
        for &byte in data {
            for &bit in &codes[byte as usize] {
                writer.write_bit(bit);
            }
        }

        let padding = writer.padding_bits() as u8;
        let mut out = writer.finish();
        out[0] = PADDING_BIAS + padding;

        debug!(
            input = data.len(),
            output = out.len(),
            leaves = tree.leaf_count(),
            "huffman compress"
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let Some(&header) = data.first() else {
            return Ok(Vec::new());
        };
        let padding = header.wrapping_sub(PADDING_BIAS);
        if padding > 7 {
            return Err(HuffmanError::InvalidPadding(header).into());
        }

        let end = data.len() * 8 - padding as usize;
        let mut reader = BitReader::new(data);
        reader.read_byte()?;
        if end < reader.position() {
            return Err(HuffmanError::TruncatedStream {
                position: reader.position(),
            }
            .into());
        }
        if end == reader.position() {
            return Ok(Vec::new());
        }

        let tree = HuffmanTree::deserialize(&mut reader)?;
        if reader.position() > end {
            return Err(HuffmanError::TruncatedStream {
                position: reader.position(),
            }
            .into());
        }

        let mut out = Vec::new();
        while reader.position() < end {
            out.push(tree.decode_symbol(&mut reader, end)?);
        }

        debug!(input = data.len(), output = out.len(), "huffman decompress");
        Ok(out)
    }
}
