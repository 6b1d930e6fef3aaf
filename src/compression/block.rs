//! The unit every codec produces: payload bytes plus decoder metadata.

use serde::{Deserialize, Serialize};

use crate::compression::FrequencyTable;

/// Per-algorithm metadata needed to reverse a compression.
///
/// Huffman fills in `freq_table` and `padding`; the other codecs only record
/// `original_length`. Absent fields are omitted from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq_table: Option<FrequencyTable>,
    /// Zero bits appended to reach a byte boundary; 8 means none were added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<u8>,
    pub original_length: usize,
}

impl BlockMetadata {
    /// Metadata for codecs that only track the input length.
    pub fn with_length(original_length: usize) -> Self {
        BlockMetadata {
            original_length,
            ..Default::default()
        }
    }
}

/// Compressed payload together with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressedBlock {
    pub payload: Vec<u8>,
    pub metadata: BlockMetadata,
}

impl CompressedBlock {
    /// The block every codec returns for empty input.
    pub fn empty() -> Self {
        CompressedBlock::default()
    }

    pub fn new(payload: Vec<u8>, metadata: BlockMetadata) -> Self {
        CompressedBlock { payload, metadata }
    }

    pub fn original_length(&self) -> usize {
        self.metadata.original_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_only_metadata_json() {
        let meta = BlockMetadata::with_length(12);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"original_length":12}"#);
    }

    #[test]
    fn test_missing_length_rejected() {
        let parsed: Result<BlockMetadata, _> = serde_json::from_str(r#"{"padding":3}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_empty_block() {
        let block = CompressedBlock::empty();
        assert!(block.payload.is_empty());
        assert_eq!(block.original_length(), 0);
        assert!(block.metadata.freq_table.is_none());
    }
}
