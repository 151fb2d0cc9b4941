//! Error types shared by every stage of a conversion
//!
//! A conversion has no partial-success mode: the first error raised while
//! decoding, normalizing or encoding aborts the call and is the only thing
//! returned to the caller.

use std::fmt::Display;
use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors produced while converting a document between formats.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The requested format name is not registered.
    #[error("unknown format '{0}'")]
    UnknownFormat(String),
    /// A mapping key could not be coerced into a string.
    #[error("type mismatch: expected map key string, number, bool or null; got {found}")]
    KeyTypeMismatch {
        /// Kind of the offending key (e.g. "mapping", "sequence").
        found: &'static str,
    },
    /// The underlying format library rejected the input or failed to render a value.
    #[error("{format}: {message}")]
    CodecFailure {
        /// Name of the format whose codec failed.
        format: String,
        /// Message reported by the codec.
        message: String,
    },
    /// The XML token stream is not properly nested.
    #[error("xml structure error: {0}")]
    StructuralDecode(String),
    /// The format exists but lacks the requested capability.
    #[error("{0}")]
    NotSupported(String),
    /// Reading the input or writing the output failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    /// Wrap a codec error, keeping its message verbatim.
    pub fn codec(format: &str, err: impl Display) -> Self {
        FormatError::CodecFailure {
            format: format.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_keeps_message_verbatim() {
        let err = FormatError::codec("json", "expected value at line 1 column 1");
        assert_eq!(err.to_string(), "json: expected value at line 1 column 1");
    }

    #[test]
    fn test_key_type_mismatch_names_kind() {
        let err = FormatError::KeyTypeMismatch { found: "mapping" };
        assert!(err.to_string().ends_with("got mapping"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: FormatError = io.into();
        assert!(matches!(err, FormatError::Io(_)));
    }
}
