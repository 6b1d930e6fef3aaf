//! Automatic codec selection from content signature and filename extension.
//!
//! Decision order:
//! 1. text extensions or text-like content choose Huffman;
//! 2. uncompressed bitmap extensions choose RLE;
//! 3. binary and executable extensions choose LZ77;
//! 4. everything else falls back to Deflate.

use log::{debug, trace};
use std::path::Path;

use crate::algorithm::Algorithm;

const TEXT_EXTENSIONS: &[&str] = &["txt", "csv", "json", "xml", "html"];
const BITMAP_EXTENSIONS: &[&str] = &["bmp", "pbm", "pgm", "ppm"];
const BINARY_EXTENSIONS: &[&str] = &["bin", "exe"];

/// Bytes inspected by the text heuristic.
const TEXT_SAMPLE: usize = 8192;

/// Content kind recognised from the leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Pdf,
    Zip,
    Gzip,
    Elf,
    PortableExecutable,
    Text,
    Unknown,
}

impl Signature {
    pub fn mime(self) -> &'static str {
        match self {
            Signature::Png => "image/png",
            Signature::Jpeg => "image/jpeg",
            Signature::Gif => "image/gif",
            Signature::Bmp => "image/bmp",
            Signature::Pdf => "application/pdf",
            Signature::Zip => "application/zip",
            Signature::Gzip => "application/gzip",
            Signature::Elf => "application/x-executable",
            Signature::PortableExecutable => "application/vnd.microsoft.portable-executable",
            Signature::Text => "text/plain",
            Signature::Unknown => "application/octet-stream",
        }
    }

    pub fn is_text(self) -> bool {
        self == Signature::Text
    }
}

/// (signature, magic bytes, minimum plausible file size)
const MAGIC: &[(Signature, &[u8], usize)] = &[
    (Signature::Png, b"\x89PNG\r\n\x1a\n", 8),
    (Signature::Jpeg, b"\xff\xd8\xff", 3),
    (Signature::Gif, b"GIF87a", 6),
    (Signature::Gif, b"GIF89a", 6),
    (Signature::Pdf, b"%PDF-", 5),
    (Signature::Zip, b"PK\x03\x04", 4),
    (Signature::Gzip, b"\x1f\x8b", 2),
    (Signature::Elf, b"\x7fELF", 4),
    // Short magics need a full header behind them to avoid matching plain text.
    (Signature::Bmp, b"BM", 26),
    (Signature::PortableExecutable, b"MZ", 64),
];

/// Identify the content from its leading bytes.
pub fn detect_signature(data: &[u8]) -> Signature {
    let signature = MAGIC
        .iter()
        .find(|(_, magic, min_len)| data.len() >= *min_len && data.starts_with(magic))
        .map(|(signature, _, _)| *signature)
        .unwrap_or_else(|| {
            if looks_like_text(data) {
                Signature::Text
            } else {
                Signature::Unknown
            }
        });
    trace!(
        "signature {:?} from leading bytes {}",
        signature,
        hex::encode(&data[..data.len().min(8)])
    );
    signature
}

/// Non-empty, NUL-free UTF-8 within the sample window.
fn looks_like_text(data: &[u8]) -> bool {
    let sample = &data[..data.len().min(TEXT_SAMPLE)];
    if sample.is_empty() || sample.contains(&0) {
        return false;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // A code point cut by the sample boundary is still text.
        Err(e) => sample.len() == TEXT_SAMPLE && e.error_len().is_none(),
    }
}

/// Lowercase extension of `filename`, without the dot.
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Outcome of automatic selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub algorithm: Algorithm,
    pub signature: Signature,
    pub extension: Option<String>,
}

/// Pick a codec for `data` named `filename`.
///
/// # Example
///
/// ```
/// use bytecodec::algorithm::Algorithm;
/// use bytecodec::selector::select;
///
/// assert_eq!(select(b"a,b,c\n1,2,3\n", "table.csv").algorithm, Algorithm::Huffman);
/// assert_eq!(select(&[0u8; 64], "image.bmp").algorithm, Algorithm::Rle);
/// ```
pub fn select(data: &[u8], filename: &str) -> Detection {
    let signature = detect_signature(data);
    let extension = extension(filename);
    let has_ext = |list: &[&str]| {
        extension
            .as_deref()
            .is_some_and(|ext| list.contains(&ext))
    };

    let algorithm = if has_ext(TEXT_EXTENSIONS) || signature.is_text() {
        Algorithm::Huffman
    } else if has_ext(BITMAP_EXTENSIONS) {
        Algorithm::Rle
    } else if has_ext(BINARY_EXTENSIONS) {
        Algorithm::Lz77
    } else {
        Algorithm::Deflate
    };
    debug!(
        "auto-selected {} for {:?} ({}, extension {:?})",
        algorithm,
        filename,
        signature.mime(),
        extension
    );

    Detection {
        algorithm,
        signature,
        extension,
    }
}
