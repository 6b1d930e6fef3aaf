use thiserror::Error;

/// Errors produced while selecting, running or unpacking a codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested algorithm identifier is not one of the supported codecs.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The envelope or its metadata is malformed or missing a required field.
    #[error("corrupt envelope: {0}")]
    CorruptEnvelope(String),

    /// The compressed payload ends mid-record or contains an impossible record.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// Decoded output length disagrees with the declared original length.
    #[error("decoded {actual} bytes but envelope declares {expected}")]
    DecodeMismatch { expected: usize, actual: usize },

    /// Codec parameters outside their representable range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn corrupt_payload<S: Into<String>>(msg: S) -> Self {
        Error::CorruptPayload(msg.into())
    }

    pub fn corrupt_envelope<S: Into<String>>(msg: S) -> Self {
        Error::CorruptEnvelope(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::UnknownAlgorithm("zip".to_string());
        assert_eq!(err.to_string(), "unknown algorithm: zip");

        let err = Error::DecodeMismatch {
            expected: 10,
            actual: 7,
        };
        assert_eq!(err.to_string(), "decoded 7 bytes but envelope declares 10");
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            Error::corrupt_payload("truncated"),
            Error::CorruptPayload(msg) if msg == "truncated"
        ));
        assert!(matches!(
            Error::corrupt_envelope("missing padding"),
            Error::CorruptEnvelope(_)
        ));
    }
}
