use log::debug;

use crate::compression::{BlockMetadata, CompressedBlock, Compression, Result};
use crate::error::Error;

/// Default number of already-seen bytes searched for a match.
pub const DEFAULT_WINDOW_SIZE: usize = 4096;
/// Default longest match considered.
pub const DEFAULT_LOOKAHEAD: usize = 18;
/// Offsets are stored in two bytes.
pub const MAX_WINDOW_SIZE: usize = u16::MAX as usize;
/// Lengths are stored in one byte.
pub const MAX_LOOKAHEAD: usize = u8::MAX as usize;
/// Shorter matches cost more than the literals they replace.
pub const MIN_MATCH: usize = 3;
/// Serialized size of one token.
pub const RECORD_SIZE: usize = 4;

/// An LZ77 token.
///
/// When a match is found, the token is:
///   (offset, length, literal)
///
/// If no match is found, then offset and length are zero, and `literal` is the byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub offset: u16,
    pub length: u8,
    pub literal: u8,
}

impl Token {
    /// A token carrying one byte and no copy.
    pub fn literal(byte: u8) -> Self {
        Token {
            offset: 0,
            length: 0,
            literal: byte,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.offset == 0 && self.length == 0
    }

    /// Offset high byte, offset low byte, length, literal.
    pub fn to_bytes(self) -> [u8; RECORD_SIZE] {
        let [hi, lo] = self.offset.to_be_bytes();
        [hi, lo, self.length, self.literal]
    }

    pub fn from_bytes(record: [u8; RECORD_SIZE]) -> Self {
        Token {
            offset: u16::from_be_bytes([record[0], record[1]]),
            length: record[2],
            literal: record[3],
        }
    }
}

/// Compress the input data using the LZ77 algorithm.
///
/// # Parameters
///
/// - `input`: the data to compress as a byte slice.
/// - `window_size`: the maximum number of previous bytes to search for a match.
/// - `lookahead_buffer_size`: the maximum match length to consider.
///
/// Both limits are clamped to what a token can represent. A match may run past
/// the current position, so a run of one repeated byte becomes a single copy.
///
/// # Example
///
/// ```
/// use bytecodec::compression::lz77::compress;
///
/// let data = b"abracadabra abracadabra";
/// let tokens = compress(data, 16, 8);
/// assert!(tokens.len() < data.len());
/// ```
pub fn compress(input: &[u8], window_size: usize, lookahead_buffer_size: usize) -> Vec<Token> {
    let window_size = window_size.min(MAX_WINDOW_SIZE);
    let lookahead_buffer_size = lookahead_buffer_size.min(MAX_LOOKAHEAD);

    let mut tokens = Vec::new();
    let end = input.len();
    let mut i = 0;
    while i < end {
        let max_length = lookahead_buffer_size.min(end - i);
        let search_start = i.saturating_sub(window_size);
        let mut best_length = 0;
        let mut best_offset = 0;
        // Nearest candidates first, so equally long matches keep the smallest offset.
        for j in (search_start..i).rev() {
            let length = input[j..]
                .iter()
                .zip(&input[i..i + max_length])
                .take_while(|(a, b)| a == b)
                .count();
            if length > best_length {
                best_length = length;
                best_offset = i - j;
                if length == max_length {
                    break;
                }
            }
        }

        if best_length >= MIN_MATCH {
            // A match reaching the end of input carries a zero sentinel literal.
            let (literal, advance) = match input.get(i + best_length) {
                Some(&next) => (next, best_length + 1),
                None => (0, best_length),
            };
            tokens.push(Token {
                offset: best_offset as u16,
                length: best_length as u8,
                literal,
            });
            i += advance;
        } else {
            tokens.push(Token::literal(input[i]));
            i += 1;
        }
    }
    tokens
}

/// Decompress a sequence of LZ77 tokens into the original data.
///
/// Copies run byte by byte, so an offset shorter than the length repeats the
/// bytes it has just produced. The literal of the final token is dropped when it
/// is the end-of-input sentinel, which is the case exactly when the copy already
/// brought the output to `original_length`.
///
/// # Example
///
/// ```
/// use bytecodec::compression::lz77::{compress, decompress};
///
/// let data = b"abracadabra abracadabra";
/// let tokens = compress(data, 16, 8);
/// let decompressed = decompress(&tokens, data.len()).unwrap();
/// assert_eq!(decompressed, data);
/// ```
pub fn decompress(tokens: &[Token], original_length: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(original_length.min(tokens.len() * (MAX_LOOKAHEAD + 1)));
    let last = tokens.len().saturating_sub(1);
    for (index, token) in tokens.iter().enumerate() {
        if token.is_literal() {
            output.push(token.literal);
            continue;
        }

        let offset = token.offset as usize;
        if offset == 0 {
            return Err(Error::corrupt_payload(format!(
                "record {index} copies {} bytes from offset 0",
                token.length
            )));
        }
        if offset > output.len() {
            return Err(Error::corrupt_payload(format!(
                "record {index} reaches {offset} bytes back with only {} decoded",
                output.len()
            )));
        }
        let start = output.len() - offset;
        for k in 0..token.length as usize {
            let byte = output[start + k];
            output.push(byte);
        }

        let sentinel = index == last && token.literal == 0 && output.len() == original_length;
        if !sentinel {
            output.push(token.literal);
        }
    }
    Ok(output)
}

/// Serialize tokens as fixed 4-byte records.
pub fn to_records(tokens: &[Token]) -> Vec<u8> {
    tokens.iter().flat_map(|token| token.to_bytes()).collect()
}

/// Parse fixed 4-byte records back into tokens.
pub fn from_records(payload: &[u8]) -> Result<Vec<Token>> {
    if payload.len() % RECORD_SIZE != 0 {
        return Err(Error::corrupt_payload(format!(
            "lz77 payload of {} bytes is not a whole number of {RECORD_SIZE}-byte records",
            payload.len()
        )));
    }
    Ok(payload
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| Token::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// LZ77 codec configured with its window and lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77 {
    window_size: usize,
    lookahead: usize,
}

impl Lz77 {
    /// Creates a new LZ77 configuration.
    ///
    /// # Arguments
    ///
    /// * `window_size` - Bytes of history searched, 1 to 65535
    /// * `lookahead` - Longest match, 3 to 255
    pub fn new(window_size: usize, lookahead: usize) -> Result<Self> {
        if window_size == 0 || window_size > MAX_WINDOW_SIZE {
            return Err(Error::InvalidConfig(format!(
                "lz77 window size must be within 1..={MAX_WINDOW_SIZE}, got {window_size}"
            )));
        }
        if !(MIN_MATCH..=MAX_LOOKAHEAD).contains(&lookahead) {
            return Err(Error::InvalidConfig(format!(
                "lz77 lookahead must be within {MIN_MATCH}..={MAX_LOOKAHEAD}, got {lookahead}"
            )));
        }
        Ok(Lz77 {
            window_size,
            lookahead,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }
}

impl Default for Lz77 {
    fn default() -> Self {
        Lz77 {
            window_size: DEFAULT_WINDOW_SIZE,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

impl Compression for Lz77 {
    fn compress(&self, data: &[u8]) -> Result<CompressedBlock> {
        if data.is_empty() {
            return Ok(CompressedBlock::empty());
        }
        let tokens = compress(data, self.window_size, self.lookahead);
        let payload = to_records(&tokens);
        debug!(
            "lz77: {} bytes -> {} tokens ({} bytes)",
            data.len(),
            tokens.len(),
            payload.len()
        );
        Ok(CompressedBlock::new(
            payload,
            BlockMetadata::with_length(data.len()),
        ))
    }

    fn decompress(&self, payload: &[u8], metadata: &BlockMetadata) -> Result<Vec<u8>> {
        let tokens = from_records(payload)?;
        decompress(&tokens, metadata.original_length)
    }
}
