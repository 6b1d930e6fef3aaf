//! The closed set of codecs and the caller-facing algorithm selection.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::{Error, Result};

/// A concrete codec. Its lowercase name is the identifier stored in envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Huffman,
    Lz77,
    Rle,
    #[serde(alias = "deflate-fallback")]
    Deflate,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Huffman,
        Algorithm::Lz77,
        Algorithm::Rle,
        Algorithm::Deflate,
    ];

    /// Identifier used on the wire.
    pub fn id(self) -> &'static str {
        match self {
            Algorithm::Huffman => "huffman",
            Algorithm::Lz77 => "lz77",
            Algorithm::Rle => "rle",
            Algorithm::Deflate => "deflate",
        }
    }

    /// Human-readable description for algorithm pickers.
    pub fn info(self) -> AlgorithmInfo {
        match self {
            Algorithm::Huffman => AlgorithmInfo {
                id: self.id(),
                name: "Huffman Coding",
                description: "Variable-length prefix codes built from byte frequencies",
                best_for: "Text, CSV, JSON and markup with a skewed character distribution",
            },
            Algorithm::Lz77 => AlgorithmInfo {
                id: self.id(),
                name: "LZ77",
                description: "Back-references into a sliding window of recent bytes",
                best_for: "Binaries, executables and other repetitive content",
            },
            Algorithm::Rle => AlgorithmInfo {
                id: self.id(),
                name: "Run-Length Encoding",
                description: "Runs of identical bytes stored as a count and a value",
                best_for: "Uncompressed bitmaps with large solid areas",
            },
            Algorithm::Deflate => AlgorithmInfo {
                id: self.id(),
                name: "Deflate (gzip)",
                description: "LZ77 matching followed by Huffman coding",
                best_for: "General-purpose compression",
            },
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "huffman" => Ok(Algorithm::Huffman),
            "lz77" => Ok(Algorithm::Lz77),
            "rle" => Ok(Algorithm::Rle),
            "deflate" | "deflate-fallback" => Ok(Algorithm::Deflate),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// What the caller asked for: a specific codec, or automatic selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    #[default]
    Auto,
    Explicit(Algorithm),
}

impl Selection {
    /// Every choice a caller can make, automatic selection first.
    pub fn catalog() -> Vec<AlgorithmInfo> {
        std::iter::once(AlgorithmInfo {
            id: "auto",
            name: "Auto Detect",
            description: "Chooses a codec from the file signature and extension",
            best_for: "All file types",
        })
        .chain(Algorithm::ALL.iter().map(|algorithm| algorithm.info()))
        .collect()
    }
}

impl From<Algorithm> for Selection {
    fn from(algorithm: Algorithm) -> Self {
        Selection::Explicit(algorithm)
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Auto => f.write_str("auto"),
            Selection::Explicit(algorithm) => Display::fmt(algorithm, f),
        }
    }
}

impl FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Selection::Auto);
        }
        s.parse::<Algorithm>().map(Selection::Explicit)
    }
}

/// Catalog entry describing one selectable algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub best_for: &'static str,
}
