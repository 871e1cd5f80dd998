//! Method-tagged envelope decoding and encoding.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::ProtocolError;

/// Name of the discriminator field present in every envelope.
pub const METHOD_FIELD: &str = "Method";

/// A JSON object tagged by its `Method` field.
pub trait Envelope: Serialize + DeserializeOwned {
    /// Every method name this envelope type can carry.
    const METHODS: &'static [&'static str];

    /// The method name of this value.
    fn method(&self) -> &'static str;

    /// Decodes a request body.
    ///
    /// Distinguishes three failure modes: the body is not an object or has
    /// mistyped parameters ([`ProtocolError::Malformed`]), it lacks the
    /// discriminator ([`ProtocolError::MissingMethod`]), or the discriminator
    /// is not one of [`Self::METHODS`] ([`ProtocolError::UnknownMethod`]).
    fn decode(body: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        if !value.is_object() {
            return Err(ProtocolError::Malformed(
                "body is not a JSON object".to_string(),
            ));
        }

        let method = match value.get(METHOD_FIELD) {
            Some(Value::String(method)) => method.clone(),
            Some(other) => {
                return Err(ProtocolError::Malformed(format!(
                    "{METHOD_FIELD} must be a string, got {other}"
                )))
            }
            None => return Err(ProtocolError::MissingMethod),
        };

        if !Self::METHODS.contains(&method.as_str()) {
            return Err(ProtocolError::UnknownMethod(method));
        }

        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Encodes this value as a request body.
    fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }
}
