//! Error types for envelope decoding.

use thiserror::Error;

/// Errors that can occur when decoding or encoding an envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The body is not a JSON object, or a parameter has the wrong shape.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// The body is a JSON object without a `Method` field.
    #[error("envelope has no Method field")]
    MissingMethod,

    /// The `Method` field names an operation this side does not handle.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// The envelope could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ProtocolError {
    /// Returns true for well-formed envelopes that name an unhandled method.
    pub fn is_unknown_method(&self) -> bool {
        matches!(self, ProtocolError::UnknownMethod(_))
    }
}
