//! Compression algorithms implementation.
//!
//! This module provides the reversible byte codecs:
//! - Huffman coding (entropy coding over byte frequencies)
//! - LZ77 (sliding-window back-references)
//! - Run-length encoding with an escape marker
//! - Deflate, the general-purpose fallback
//!
//! Every codec consumes a whole byte buffer and produces a [`CompressedBlock`]:
//! the payload bytes plus the [`BlockMetadata`] its decoder needs. Codec values
//! only carry immutable parameters, so one instance can serve concurrent callers.
//!
//! # Examples
//!
//! ```rust
//! use bytecodec::compression::{Compression, Rle};
//!
//! let rle = Rle;
//! let block = rle.compress(b"AAAABBBBCCCC").unwrap();
//! assert_eq!(block.payload.len(), 9);
//! let restored = rle.decompress(&block.payload, &block.metadata).unwrap();
//! assert_eq!(restored, b"AAAABBBBCCCC");
//! ```

use crate::error::Error;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for compression algorithms
pub trait Compression: Send + Sync {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<CompressedBlock>;

    /// Decompress a payload produced by `compress`, using its metadata
    fn decompress(&self, payload: &[u8], metadata: &BlockMetadata) -> Result<Vec<u8>>;
}

pub mod block;
pub mod deflate;
pub mod frequency;
pub mod huffman;
pub mod lz77;
pub mod rle;

pub use block::{BlockMetadata, CompressedBlock};
pub use deflate::Deflate;
pub use frequency::FrequencyTable;
pub use huffman::{build_huffman_tree, CodeTable, Huffman, HuffmanNode};
pub use lz77::{Lz77, Token};
pub use rle::{Rle, Run};
