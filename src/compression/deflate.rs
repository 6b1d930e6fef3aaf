//! Deflate (gzip container) via flate2, the general-purpose fallback.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;
use std::io::{Read, Write};

use crate::compression::{BlockMetadata, CompressedBlock, Compression, Result};
use crate::error::Error;

/// Strongest setting; inputs are whole buffers, so speed matters less than size.
pub const DEFAULT_LEVEL: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deflate {
    level: u32,
}

impl Deflate {
    /// Creates a Deflate codec with a compression level between 0 and 9.
    pub fn new(level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidConfig(format!(
                "deflate level must be within 0..=9, got {level}"
            )));
        }
        Ok(Deflate { level })
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for Deflate {
    fn default() -> Self {
        Deflate {
            level: DEFAULT_LEVEL,
        }
    }
}

impl Compression for Deflate {
    fn compress(&self, data: &[u8]) -> Result<CompressedBlock> {
        if data.is_empty() {
            return Ok(CompressedBlock::empty());
        }
        let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::new(self.level));
        enc.write_all(data)
            .map_err(|e| Error::corrupt_payload(format!("deflate encoder failed: {e}")))?;
        let payload = enc
            .finish()
            .map_err(|e| Error::corrupt_payload(format!("deflate encoder failed: {e}")))?;
        debug!(
            "deflate(level {}): {} bytes -> {} bytes",
            self.level,
            data.len(),
            payload.len()
        );
        Ok(CompressedBlock::new(
            payload,
            BlockMetadata::with_length(data.len()),
        ))
    }

    fn decompress(&self, payload: &[u8], metadata: &BlockMetadata) -> Result<Vec<u8>> {
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        // One byte past the declared length is enough to tell the stream is too long.
        let limit = (metadata.original_length as u64).saturating_add(1);
        let mut dec = GzDecoder::new(payload).take(limit);
        let mut decompressed = Vec::new();
        dec.read_to_end(&mut decompressed)
            .map_err(|e| Error::corrupt_payload(format!("deflate stream invalid: {e}")))?;
        if decompressed.len() > metadata.original_length {
            return Err(Error::corrupt_payload(format!(
                "deflate stream inflates past the declared {} bytes",
                metadata.original_length
            )));
        }
        Ok(decompressed)
    }
}
