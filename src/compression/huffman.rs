//! Huffman coding over byte frequencies.
//!
//! The tree is never stored; the decoder rebuilds it from the frequency table kept
//! in the block metadata. Construction is therefore fully deterministic: among nodes
//! of equal frequency, leaves pop in ascending byte order and merged nodes pop after
//! every leaf, in the order they were created.

use bitvec::prelude::*;
use log::debug;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::compression::{BlockMetadata, CompressedBlock, Compression, FrequencyTable, Result};
use crate::error::Error;

/// A Huffman code, most significant bit first.
pub type Code = BitVec<u8, Msb0>;

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A leaf node contains a byte value and its frequency.
    Leaf { byte: u8, freq: u64 },
    /// An internal node with combined frequency. `right` is only empty for the
    /// root of a single-symbol tree.
    Internal {
        freq: u64,
        left: Box<HuffmanNode>,
        right: Option<Box<HuffmanNode>>,
    },
}

impl HuffmanNode {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { freq, .. } => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }

    /// The only symbol of a single-symbol tree.
    pub fn single_symbol(&self) -> Option<u8> {
        match self {
            HuffmanNode::Leaf { byte, .. } => Some(*byte),
            HuffmanNode::Internal {
                left, right: None, ..
            } => match left.as_ref() {
                HuffmanNode::Leaf { byte, .. } => Some(*byte),
                HuffmanNode::Internal { .. } => None,
            },
            HuffmanNode::Internal { .. } => None,
        }
    }
}

/// Heap entry; the node with the smallest (frequency, rank) has highest priority.
#[derive(Debug)]
struct NodeWrapper {
    rank: usize,
    node: Box<HuffmanNode>,
}

impl Ord for NodeWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: lower frequency, then lower rank, should come first.
        other
            .node
            .freq()
            .cmp(&self.node.freq())
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

impl PartialOrd for NodeWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeWrapper {}

/// Build the Huffman tree given a frequency table.
///
/// Returns `None` if the table has no non-zero entry. A single symbol yields an
/// internal root whose only child is that symbol's leaf.
pub fn build_huffman_tree(freq_table: &FrequencyTable) -> Option<HuffmanNode> {
    let mut heap: BinaryHeap<NodeWrapper> = freq_table
        .iter()
        .filter(|&(_, freq)| freq > 0)
        .map(|(byte, freq)| NodeWrapper {
            rank: byte as usize,
            node: Box::new(HuffmanNode::Leaf { byte, freq }),
        })
        .collect();

    if heap.len() == 1 {
        let only = heap.pop()?.node;
        return Some(HuffmanNode::Internal {
            freq: only.freq(),
            left: only,
            right: None,
        });
    }

    let mut next_rank = 256;
    while heap.len() > 1 {
        let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
            break;
        };
        let internal = HuffmanNode::Internal {
            freq: left.node.freq().saturating_add(right.node.freq()),
            left: left.node,
            right: Some(right.node),
        };
        heap.push(NodeWrapper {
            rank: next_rank,
            node: Box::new(internal),
        });
        next_rank += 1;
    }
    heap.pop().map(|wrapper| *wrapper.node)
}

/// Mapping from byte value to its Huffman code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    /// Walk the tree, appending 0 for every left edge and 1 for every right edge.
    ///
    /// A leaf reached without any edge is assigned the code `0`.
    pub fn from_tree(root: &HuffmanNode) -> Self {
        let mut codes = BTreeMap::new();
        collect_codes(root, Code::new(), &mut codes);
        CodeTable { codes }
    }

    pub fn get(&self, byte: u8) -> Option<&Code> {
        self.codes.get(&byte)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes.iter().map(|(&byte, code)| (byte, code))
    }

    /// True when no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        self.codes.iter().all(|(a, code_a)| {
            self.codes
                .iter()
                .all(|(b, code_b)| a == b || !code_b.starts_with(code_a.as_bitslice()))
        })
    }
}

fn collect_codes(node: &HuffmanNode, prefix: Code, codes: &mut BTreeMap<u8, Code>) {
    match node {
        HuffmanNode::Leaf { byte, .. } => {
            let code = if prefix.is_empty() {
                bitvec![u8, Msb0; 0]
            } else {
                prefix
            };
            codes.insert(*byte, code);
        }
        HuffmanNode::Internal { left, right, .. } => {
            let mut left_prefix = prefix.clone();
            left_prefix.push(false);
            collect_codes(left, left_prefix, codes);
            if let Some(right) = right {
                let mut right_prefix = prefix;
                right_prefix.push(true);
                collect_codes(right, right_prefix, codes);
            }
        }
    }
}

/// Encode the input using the provided code table.
///
/// Returns the packed bytes and the padding count: the number of zero bits added
/// to reach a byte boundary, or 8 when the codes already ended on one.
pub fn encode(input: &[u8], code_table: &CodeTable) -> Result<(Vec<u8>, u8)> {
    let mut bits = Code::with_capacity(input.len() * 2);
    for &byte in input {
        let code = code_table.get(byte).ok_or_else(|| {
            Error::InvalidConfig(format!("code table has no entry for byte {byte:#04x}"))
        })?;
        bits.extend_from_bitslice(code);
    }

    let padding = match bits.len() % 8 {
        0 => 8,
        rem => 8 - rem,
    };
    if padding != 8 {
        bits.resize(bits.len() + padding, false);
    }
    Ok((bits.into_vec(), padding as u8))
}

/// Decode packed bits by walking the tree from the root.
///
/// Fails when the padding is inconsistent with the payload, when a bit leads
/// nowhere, or when the stream ends in the middle of a code.
pub fn decode(payload: &[u8], padding: u8, tree: &HuffmanNode) -> Result<Vec<u8>> {
    let bits = payload.view_bits::<Msb0>();
    if padding > 8 {
        return Err(Error::corrupt_payload(format!(
            "padding {padding} exceeds one byte"
        )));
    }
    let pad = if padding == 8 { 0 } else { padding as usize };
    if pad > bits.len() {
        return Err(Error::corrupt_payload(format!(
            "padding {pad} exceeds the {} payload bits",
            bits.len()
        )));
    }
    let bits = &bits[..bits.len() - pad];

    let mut result = Vec::new();
    let mut current = tree;
    for (position, bit) in bits.iter().by_vals().enumerate() {
        let HuffmanNode::Internal { left, right, .. } = current else {
            return Err(Error::corrupt_payload("tree root is a bare leaf"));
        };
        current = if bit {
            right.as_deref().ok_or_else(|| {
                Error::corrupt_payload(format!("no code continues with 1 at bit {position}"))
            })?
        } else {
            left.as_ref()
        };
        if let HuffmanNode::Leaf { byte, .. } = current {
            result.push(*byte);
            current = tree;
        }
    }

    if !std::ptr::eq(current, tree) {
        return Err(Error::corrupt_payload("bit stream ends in the middle of a code"));
    }
    Ok(result)
}

/// Huffman codec. Stateless: every call builds its own table, tree and codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Huffman;

impl Compression for Huffman {
    fn compress(&self, data: &[u8]) -> Result<CompressedBlock> {
        if data.is_empty() {
            return Ok(CompressedBlock::empty());
        }

        let freq_table = FrequencyTable::from_bytes(data);
        let tree = build_huffman_tree(&freq_table)
            .ok_or_else(|| Error::corrupt_payload("no symbols counted in non-empty input"))?;
        let code_table = CodeTable::from_tree(&tree);
        let (payload, padding) = encode(data, &code_table)?;
        debug!(
            "huffman: {} bytes, {} symbols -> {} bytes (padding {})",
            data.len(),
            code_table.len(),
            payload.len(),
            padding
        );

        Ok(CompressedBlock::new(
            payload,
            BlockMetadata {
                freq_table: Some(freq_table),
                padding: Some(padding),
                original_length: data.len(),
            },
        ))
    }

    fn decompress(&self, payload: &[u8], metadata: &BlockMetadata) -> Result<Vec<u8>> {
        let freq_table = match &metadata.freq_table {
            Some(table) if !table.is_empty() => table,
            _ if payload.is_empty() => return Ok(Vec::new()),
            _ => {
                return Err(Error::corrupt_envelope(
                    "huffman payload without a frequency table",
                ))
            }
        };
        // The table counts the original buffer, so its total is that buffer's length.
        match freq_table.total() {
            Some(total) if total == metadata.original_length as u64 => {}
            Some(total) => {
                return Err(Error::corrupt_envelope(format!(
                    "frequency table counts {total} bytes but {} are declared",
                    metadata.original_length
                )))
            }
            None => return Err(Error::corrupt_envelope("frequency table counts overflow")),
        }
        let tree = build_huffman_tree(freq_table)
            .ok_or_else(|| Error::corrupt_envelope("frequency table has no non-zero count"))?;

        if let Some(byte) = tree.single_symbol() {
            // One bit per symbol; anything longer than the payload cannot be genuine.
            let available = payload.len() * 8;
            if metadata.original_length > available {
                return Err(Error::corrupt_payload(format!(
                    "{} symbols declared but only {available} bits present",
                    metadata.original_length
                )));
            }
            return Ok(vec![byte; metadata.original_length]);
        }

        let padding = metadata
            .padding
            .ok_or_else(|| Error::corrupt_envelope("huffman metadata is missing padding"))?;
        decode(payload, padding, &tree)
    }
}
