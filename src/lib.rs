pub mod algorithm;
pub mod compression;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod selector;

pub use algorithm::{Algorithm, AlgorithmInfo, Selection};
pub use engine::{CompressionEngine, CompressionReport, DecompressionReport, EngineConfig};
pub use envelope::Envelope;
pub use error::{Error, Result};
