//! Self-describing compressed package.
//!
//! An [`Envelope`] carries everything a decoder needs: the algorithm identifier,
//! the codec metadata and the payload. It serializes to compact JSON with the
//! payload in standard base64, so it survives any text transport.
//!
//! ```
//! use bytecodec::algorithm::Algorithm;
//! use bytecodec::compression::{Compression, Rle};
//! use bytecodec::envelope::Envelope;
//!
//! let block = Rle.compress(b"AAAABBBB").unwrap();
//! let envelope = Envelope::new(Algorithm::Rle, block, "stripes.bmp", 8);
//! let json = envelope.to_json().unwrap();
//! assert_eq!(Envelope::from_json(&json).unwrap(), envelope);
//! assert_eq!(envelope.compressed_filename(), "stripes_rle.compressed");
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::algorithm::Algorithm;
use crate::compression::{BlockMetadata, CompressedBlock};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(with = "base64_bytes")]
    compressed_data: Vec<u8>,
    metadata: BlockMetadata,
    algorithm: Algorithm,
    original_filename: String,
    original_size: usize,
}

impl Envelope {
    pub fn new(
        algorithm: Algorithm,
        block: CompressedBlock,
        original_filename: impl Into<String>,
        original_size: usize,
    ) -> Self {
        Envelope {
            compressed_data: block.payload,
            metadata: block.metadata,
            algorithm,
            original_filename: original_filename.into(),
            original_size,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn payload(&self) -> &[u8] {
        &self.compressed_data
    }

    pub fn metadata(&self) -> &BlockMetadata {
        &self.metadata
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn original_size(&self) -> usize {
        self.original_size
    }

    /// Name for the packaged file: `{stem}_{algorithm}.compressed`.
    pub fn compressed_filename(&self) -> String {
        let stem = Path::new(&self.original_filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        format!("{}_{}.compressed", stem, self.algorithm)
    }

    /// Compact JSON text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::corrupt_envelope(e.to_string()))
    }

    /// UTF-8 bytes of the compact JSON text.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::corrupt_envelope(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::corrupt_envelope(e.to_string()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::corrupt_envelope(e.to_string()))
    }

    /// Split back into the codec block.
    pub fn into_block(self) -> (Algorithm, CompressedBlock) {
        (
            self.algorithm,
            CompressedBlock::new(self.compressed_data, self.metadata),
        )
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        BASE64.decode(text.as_bytes()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{Compression, Huffman, Lz77};

    fn sample() -> Envelope {
        let data = b"every byte: \x00\x01\xfe\xff and more text";
        let block = Huffman.compress(data).unwrap();
        Envelope::new(Algorithm::Huffman, block, "notes.txt", data.len())
    }

    #[test]
    fn test_json_round_trip() {
        let envelope = sample();
        let json = envelope.to_json().unwrap();
        assert!(json.is_ascii());
        assert_eq!(Envelope::from_json(&json).unwrap(), envelope);

        let bytes = envelope.to_bytes().unwrap();
        assert_eq!(Envelope::from_slice(&bytes).unwrap(), envelope);
    }

    #[test]
    fn test_json_fields() {
        let block = Lz77::default().compress(b"abc").unwrap();
        let envelope = Envelope::new(Algorithm::Lz77, block, "a.bin", 3);
        let value: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(value["algorithm"], "lz77");
        assert_eq!(value["original_filename"], "a.bin");
        assert_eq!(value["original_size"], 3);
        assert_eq!(value["metadata"]["original_length"], 3);
        assert_eq!(value["compressed_data"], "AAAAYQAAAGIAAABj");
    }

    #[test]
    fn test_accessors_and_split() {
        let envelope = sample();
        assert_eq!(envelope.algorithm(), Algorithm::Huffman);
        assert_eq!(envelope.original_filename(), "notes.txt");
        assert!(envelope.metadata().freq_table.is_some());
        let payload = envelope.payload().to_vec();
        let (algorithm, block) = envelope.into_block();
        assert_eq!(algorithm, Algorithm::Huffman);
        assert_eq!(block.payload, payload);
    }

    #[test]
    fn test_compressed_filename() {
        let envelope = sample();
        assert_eq!(envelope.compressed_filename(), "notes_huffman.compressed");
        let block = CompressedBlock::empty();
        let archive = Envelope::new(Algorithm::Deflate, block, "backup.tar.gz", 0);
        assert_eq!(archive.compressed_filename(), "backup.tar_deflate.compressed");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Envelope::from_json("{not json"),
            Err(Error::CorruptEnvelope(_))
        ));
        assert!(matches!(
            Envelope::from_slice(&[0xff, 0xfe]),
            Err(Error::CorruptEnvelope(_))
        ));
    }

    #[test]
    fn test_unknown_algorithm_inside_envelope() {
        let json = r#"{"compressed_data":"","metadata":{"original_length":0},"algorithm":"bzip2","original_filename":"x","original_size":0}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(Error::CorruptEnvelope(_))
        ));
    }

    #[test]
    fn test_bad_base64() {
        let json = r#"{"compressed_data":"!!!","metadata":{"original_length":0},"algorithm":"rle","original_filename":"x","original_size":0}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(Error::CorruptEnvelope(_))
        ));
    }

    #[test]
    fn test_missing_metadata_field() {
        let json = r#"{"compressed_data":"","metadata":{},"algorithm":"rle","original_filename":"x","original_size":0}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(Error::CorruptEnvelope(_))
        ));
    }
}
