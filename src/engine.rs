//! Dispatch between callers and codecs.
//!
//! The engine resolves a [`Selection`] to a concrete [`Algorithm`], runs that codec
//! and wraps the result in an [`Envelope`]. The reverse path unpacks an envelope
//! and checks the decoded length against the declared original size.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::algorithm::{Algorithm, Selection};
use crate::compression::lz77::{DEFAULT_LOOKAHEAD, DEFAULT_WINDOW_SIZE};
use crate::compression::{
    deflate, BlockMetadata, CompressedBlock, Compression, Deflate, Huffman, Lz77, Rle,
};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::selector;

/// Tunable codec parameters. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lz77_window_size: usize,
    pub lz77_lookahead: usize,
    pub deflate_level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            lz77_window_size: DEFAULT_WINDOW_SIZE,
            lz77_lookahead: DEFAULT_LOOKAHEAD,
            deflate_level: deflate::DEFAULT_LEVEL,
        }
    }
}

/// Outcome of a compression request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    pub envelope: Envelope,
    /// Payload bytes, before envelope encoding.
    pub compressed_size: usize,
    /// Percentage of the original size saved, two decimals; negative when the
    /// payload grew, zero for empty input.
    pub compression_ratio: f64,
    pub elapsed: Duration,
}

/// Outcome of a decompression request.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompressionReport {
    pub data: Vec<u8>,
    pub elapsed: Duration,
}

/// Holds one configured instance of every codec. Shareable across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressionEngine {
    huffman: Huffman,
    lz77: Lz77,
    rle: Rle,
    deflate: Deflate,
}

impl CompressionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &EngineConfig) -> Result<Self> {
        Ok(CompressionEngine {
            huffman: Huffman,
            lz77: Lz77::new(config.lz77_window_size, config.lz77_lookahead)?,
            rle: Rle,
            deflate: Deflate::new(config.deflate_level)?,
        })
    }

    /// Concrete algorithm for a request; automatic selection inspects the data.
    pub fn resolve(&self, data: &[u8], filename: &str, selection: Selection) -> Algorithm {
        match selection {
            Selection::Explicit(algorithm) => algorithm,
            Selection::Auto => selector::select(data, filename).algorithm,
        }
    }

    fn codec(&self, algorithm: Algorithm) -> &dyn Compression {
        match algorithm {
            Algorithm::Huffman => &self.huffman,
            Algorithm::Lz77 => &self.lz77,
            Algorithm::Rle => &self.rle,
            Algorithm::Deflate => &self.deflate,
        }
    }

    pub fn compress_block(&self, algorithm: Algorithm, data: &[u8]) -> Result<CompressedBlock> {
        self.codec(algorithm).compress(data)
    }

    pub fn decompress_block(
        &self,
        algorithm: Algorithm,
        payload: &[u8],
        metadata: &BlockMetadata,
    ) -> Result<Vec<u8>> {
        self.codec(algorithm).decompress(payload, metadata)
    }

    /// Compress `data` and package it.
    ///
    /// # Example
    ///
    /// ```
    /// use bytecodec::algorithm::{Algorithm, Selection};
    /// use bytecodec::engine::CompressionEngine;
    ///
    /// let engine = CompressionEngine::new();
    /// let report = engine
    ///     .compress(b"hello hello hello", "greeting.txt", Selection::Auto)
    ///     .unwrap();
    /// assert_eq!(report.envelope.algorithm(), Algorithm::Huffman);
    ///
    /// let restored = engine.decompress(&report.envelope).unwrap();
    /// assert_eq!(restored.data, b"hello hello hello");
    /// ```
    pub fn compress(
        &self,
        data: &[u8],
        filename: &str,
        selection: Selection,
    ) -> Result<CompressionReport> {
        let start = Instant::now();
        let algorithm = self.resolve(data, filename, selection);
        let block = self.compress_block(algorithm, data)?;
        let elapsed = start.elapsed();

        let compressed_size = block.payload.len();
        let compression_ratio = compression_ratio(data.len(), compressed_size);
        debug!(
            "compressed {:?} with {} ({}): {} -> {} bytes in {:?}",
            filename,
            algorithm,
            selection,
            data.len(),
            compressed_size,
            elapsed
        );

        Ok(CompressionReport {
            envelope: Envelope::new(algorithm, block, filename, data.len()),
            compressed_size,
            compression_ratio,
            elapsed,
        })
    }

    /// Like [`compress`](Self::compress) with the algorithm given by name,
    /// e.g. `"auto"`, `"lz77"` or `"deflate-fallback"`.
    pub fn compress_named(
        &self,
        data: &[u8],
        filename: &str,
        algorithm: &str,
    ) -> Result<CompressionReport> {
        let selection: Selection = algorithm.parse()?;
        self.compress(data, filename, selection)
    }

    /// Recover the original bytes from an envelope.
    ///
    /// Fails with [`Error::DecodeMismatch`] when the codec output differs in
    /// length from the envelope's declared original size.
    pub fn decompress(&self, envelope: &Envelope) -> Result<DecompressionReport> {
        let metadata = envelope.metadata();
        if metadata.original_length != envelope.original_size() {
            return Err(Error::corrupt_envelope(format!(
                "metadata length {} disagrees with original size {}",
                metadata.original_length,
                envelope.original_size()
            )));
        }

        let start = Instant::now();
        let data = self.decompress_block(envelope.algorithm(), envelope.payload(), metadata)?;
        let elapsed = start.elapsed();

        if data.len() != envelope.original_size() {
            warn!(
                "{} decode of {:?} produced {} bytes, expected {}",
                envelope.algorithm(),
                envelope.original_filename(),
                data.len(),
                envelope.original_size()
            );
            return Err(Error::DecodeMismatch {
                expected: envelope.original_size(),
                actual: data.len(),
            });
        }
        debug!(
            "decompressed {:?} with {}: {} bytes in {:?}",
            envelope.original_filename(),
            envelope.algorithm(),
            data.len(),
            elapsed
        );

        Ok(DecompressionReport { data, elapsed })
    }

    /// Parse a serialized envelope and decompress it.
    pub fn decompress_json(&self, text: &str) -> Result<DecompressionReport> {
        self.decompress(&Envelope::from_json(text)?)
    }

    /// Compress many named buffers in parallel with the same selection.
    ///
    /// Results keep the order of `files`.
    #[cfg(feature = "parallel")]
    pub fn compress_all(
        &self,
        files: &[(String, Vec<u8>)],
        selection: Selection,
    ) -> Vec<Result<CompressionReport>> {
        use rayon::prelude::*;

        files
            .par_iter()
            .map(|(filename, data)| self.compress(data, filename, selection))
            .collect()
    }
}

fn compression_ratio(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let saved = (original as f64 - compressed as f64) / original as f64 * 100.0;
    (saved * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_input() -> Vec<u8> {
        let mut data = b"header,value\n".repeat(20);
        data.extend_from_slice(&[255; 40]);
        data.extend((0..=255u8).rev());
        data
    }

    #[test]
    fn test_every_algorithm_round_trips() {
        let engine = CompressionEngine::new();
        let data = mixed_input();
        for algorithm in Algorithm::ALL {
            let report = engine.compress(&data, "mixed.dat", algorithm.into()).unwrap();
            assert_eq!(report.envelope.algorithm(), algorithm);
            assert_eq!(report.envelope.original_size(), data.len());
            let restored = engine.decompress(&report.envelope).unwrap();
            assert_eq!(restored.data, data, "round trip failed for {algorithm}");
        }
    }

    #[test]
    fn test_empty_input_every_algorithm() {
        let engine = CompressionEngine::new();
        for algorithm in Algorithm::ALL {
            let report = engine.compress(b"", "empty", algorithm.into()).unwrap();
            assert!(report.envelope.payload().is_empty());
            assert_eq!(report.envelope.metadata().original_length, 0);
            assert_eq!(report.compression_ratio, 0.0);
            assert!(engine.decompress(&report.envelope).unwrap().data.is_empty());
        }
    }

    #[test]
    fn test_auto_selection() {
        let engine = CompressionEngine::new();
        let report = engine
            .compress(&[0u8, 1, 2, 3], "pixels.bmp", Selection::Auto)
            .unwrap();
        assert_eq!(report.envelope.algorithm(), Algorithm::Rle);
        assert_eq!(
            engine.resolve(b"plain text", "x.unknown", Selection::Auto),
            Algorithm::Huffman
        );
        assert_eq!(
            engine.resolve(b"plain text", "x.txt", Selection::Explicit(Algorithm::Lz77)),
            Algorithm::Lz77
        );
    }

    #[test]
    fn test_compress_named() {
        let engine = CompressionEngine::new();
        let report = engine
            .compress_named(b"AAAABBBBCCCC", "runs.bin", "rle")
            .unwrap();
        assert_eq!(report.compressed_size, 9);
        assert_eq!(report.compression_ratio, 25.0);
        assert!(matches!(
            engine.compress_named(b"abc", "a.txt", "brotli"),
            Err(Error::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_json_transport() {
        let engine = CompressionEngine::new();
        let data = mixed_input();
        let report = engine.compress(&data, "mixed.csv", Selection::Auto).unwrap();
        let json = report.envelope.to_json().unwrap();
        assert_eq!(engine.decompress_json(&json).unwrap().data, data);
        assert!(matches!(
            engine.decompress_json("[]"),
            Err(Error::CorruptEnvelope(_))
        ));
    }

    #[test]
    fn test_length_mismatch_reported() {
        let engine = CompressionEngine::new();
        let report = engine
            .compress(b"AAAABBBB", "x.bmp", Algorithm::Rle.into())
            .unwrap();
        let (_, mut block) = report.envelope.into_block();
        block.payload.push(b'!');
        let tampered = Envelope::new(Algorithm::Rle, block, "x.bmp", 8);
        assert_eq!(
            engine.decompress(&tampered),
            Err(Error::DecodeMismatch {
                expected: 8,
                actual: 9
            })
        );
    }

    #[test]
    fn test_inconsistent_declared_sizes() {
        let engine = CompressionEngine::new();
        let block = engine.compress_block(Algorithm::Rle, b"abc").unwrap();
        let envelope = Envelope::new(Algorithm::Rle, block, "x", 4);
        assert!(matches!(
            engine.decompress(&envelope),
            Err(Error::CorruptEnvelope(_))
        ));
    }

    #[test]
    fn test_config() {
        let config: EngineConfig = serde_json::from_str(r#"{"lz77_window_size":256}"#).unwrap();
        assert_eq!(config.lz77_window_size, 256);
        assert_eq!(config.lz77_lookahead, DEFAULT_LOOKAHEAD);
        assert_eq!(config.deflate_level, 9);

        let engine = CompressionEngine::with_config(&config).unwrap();
        let data = b"window window window window".to_vec();
        let report = engine.compress(&data, "w", Algorithm::Lz77.into()).unwrap();
        assert_eq!(engine.decompress(&report.envelope).unwrap().data, data);

        let bad = EngineConfig {
            deflate_level: 12,
            ..EngineConfig::default()
        };
        assert!(matches!(
            CompressionEngine::with_config(&bad),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_ratio_rounding() {
        assert_eq!(compression_ratio(3, 2), 33.33);
        assert_eq!(compression_ratio(4, 6), -50.0);
        assert_eq!(compression_ratio(0, 0), 0.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_compress_all_keeps_order() {
        let engine = CompressionEngine::new();
        let files: Vec<(String, Vec<u8>)> = (0..16)
            .map(|i| {
                let data = format!("contents of file {i}").repeat(i + 1);
                (format!("file{i}.txt"), data.into_bytes())
            })
            .collect();
        let reports = engine.compress_all(&files, Selection::Auto);
        assert_eq!(reports.len(), files.len());
        for ((name, data), report) in files.iter().zip(reports) {
            let report = report.unwrap();
            assert_eq!(report.envelope.original_filename(), name);
            assert_eq!(engine.decompress(&report.envelope).unwrap().data, *data);
        }
    }
}
