//! Run-length encoding with an escape marker.
//!
//! Byte 255 introduces a three-byte run record `(255, count, value)`. Runs of four
//! or more identical bytes use that record; shorter runs are stored as plain
//! literals, except that a literal 255 is always written as the record `(255, 1, 255)`.

use log::debug;

use crate::compression::{BlockMetadata, CompressedBlock, Compression, Result};
use crate::error::Error;

/// Byte value that starts a run record.
pub const MARKER: u8 = 255;
/// Shortest run worth a record.
pub const MIN_RUN: usize = 4;
/// Longest run a single record can hold.
pub const MAX_RUN: usize = u8::MAX as usize;

/// One element of an RLE stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run {
    /// A byte stored as-is. Never the marker.
    Literal(u8),
    /// `count` copies of `value`, written as `(MARKER, count, value)`.
    Repeat { count: u8, value: u8 },
}

impl Run {
    /// Number of original bytes this run stands for.
    pub fn len(&self) -> usize {
        match self {
            Run::Literal(_) => 1,
            Run::Repeat { count, .. } => *count as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_to(self, out: &mut Vec<u8>) {
        match self {
            Run::Literal(byte) => out.push(byte),
            Run::Repeat { count, value } => out.extend_from_slice(&[MARKER, count, value]),
        }
    }
}

/// Split the input into runs.
///
/// # Example
///
/// ```
/// use bytecodec::compression::rle::{runs, Run};
///
/// let parsed = runs(b"AAAAB");
/// assert_eq!(parsed, vec![Run::Repeat { count: 4, value: b'A' }, Run::Literal(b'B')]);
/// ```
pub fn runs(input: &[u8]) -> Vec<Run> {
    let mut result = Vec::new();
    let mut i = 0;
    while i < input.len() {
        let value = input[i];
        let count = input[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == value)
            .count();

        if count >= MIN_RUN {
            result.push(Run::Repeat {
                count: count as u8,
                value,
            });
        } else if value == MARKER {
            result.extend((0..count).map(|_| Run::Repeat {
                count: 1,
                value: MARKER,
            }));
        } else {
            result.extend((0..count).map(|_| Run::Literal(value)));
        }
        i += count;
    }
    result
}

/// Encode the input as an RLE byte stream.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for run in runs(input) {
        run.write_to(&mut out);
    }
    out
}

/// Decode an RLE byte stream.
///
/// A marker followed by fewer than two bytes, or a record with a zero count,
/// is reported as a corrupt payload.
pub fn decode(payload: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(payload.len());
    let mut i = 0;
    while i < payload.len() {
        if payload[i] != MARKER {
            out.push(payload[i]);
            i += 1;
            continue;
        }

        let [count, value] = match payload.get(i + 1..i + 3) {
            Some(&[count, value]) => [count, value],
            _ => {
                return Err(Error::corrupt_payload(format!(
                    "run marker at byte {i} is truncated"
                )))
            }
        };
        if count == 0 {
            return Err(Error::corrupt_payload(format!(
                "run record at byte {i} has a zero count"
            )));
        }
        out.resize(out.len() + count as usize, value);
        i += 3;
    }
    Ok(out)
}

/// Run-length codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rle;

impl Compression for Rle {
    fn compress(&self, data: &[u8]) -> Result<CompressedBlock> {
        if data.is_empty() {
            return Ok(CompressedBlock::empty());
        }
        let payload = encode(data);
        debug!("rle: {} bytes -> {} bytes", data.len(), payload.len());
        Ok(CompressedBlock::new(
            payload,
            BlockMetadata::with_length(data.len()),
        ))
    }

    fn decompress(&self, payload: &[u8], _metadata: &BlockMetadata) -> Result<Vec<u8>> {
        decode(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_runs() {
        let input = b"AAAABBBBCCCC";
        let block = Rle.compress(input).unwrap();
        assert_eq!(block.payload, vec![255, 4, b'A', 255, 4, b'B', 255, 4, b'C']);
        assert_eq!(block.metadata.original_length, 12);
        assert_eq!(Rle.decompress(&block.payload, &block.metadata).unwrap(), input);
    }

    #[test]
    fn test_short_runs_stay_literal() {
        assert_eq!(encode(b"AAABBC"), b"AAABBC");
        assert_eq!(decode(b"AAABBC").unwrap(), b"AAABBC");
    }

    #[test]
    fn test_marker_is_escaped() {
        assert_eq!(encode(&[255]), vec![255, 1, 255]);
        assert_eq!(encode(&[1, 255, 255, 2]), vec![1, 255, 1, 255, 255, 1, 255, 2]);
        assert_eq!(encode(&[255; 5]), vec![255, 5, 255]);
        let input = [0, 255, 7, 255, 255, 255, 9];
        assert_eq!(decode(&encode(&input)).unwrap(), input);
    }

    #[test]
    fn test_long_run_is_one_record() {
        for len in [4usize, 100, 255] {
            let input = vec![9u8; len];
            assert_eq!(encode(&input), vec![255, len as u8, 9]);
        }
    }

    #[test]
    fn test_run_over_255_splits() {
        let input = vec![b'x'; 600];
        let encoded = encode(&input);
        assert_eq!(encoded, vec![255, 255, b'x', 255, 255, b'x', 255, 90, b'x']);
        assert_eq!(decode(&encoded).unwrap(), input);

        // 256 leaves a single straggler, stored as a literal.
        let encoded = encode(&vec![b'y'; 256]);
        assert_eq!(encoded, vec![255, 255, b'y', b'y']);
    }

    #[test]
    fn test_runs_lengths_cover_input() {
        let input = b"aaaaabbbcddddddd\xff\xff";
        let parsed = runs(input);
        assert_eq!(parsed.iter().map(Run::len).sum::<usize>(), input.len());
        assert!(parsed.iter().all(|run| !run.is_empty()));
    }

    #[test]
    fn test_single_byte() {
        let block = Rle.compress(b"q").unwrap();
        assert_eq!(block.payload, b"q");
        assert_eq!(Rle.decompress(&block.payload, &block.metadata).unwrap(), b"q");
    }

    #[test]
    fn test_empty_input() {
        let block = Rle.compress(b"").unwrap();
        assert!(block.payload.is_empty());
        assert_eq!(block.metadata.original_length, 0);
        assert!(Rle.decompress(&[], &block.metadata).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_marker() {
        assert!(matches!(decode(&[1, 2, 255]), Err(Error::CorruptPayload(_))));
        assert!(matches!(decode(&[1, 255, 4]), Err(Error::CorruptPayload(_))));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(decode(&[255, 0, 1]), Err(Error::CorruptPayload(_))));
    }
}
