//! Protocol error types.

use thiserror::Error;

/// Errors decoding or encoding directory messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Reply did not match the expected schema
    #[error("malformed directory response: {0}")]
    Malformed(String),

    /// Message could not be serialized
    #[error("encode failed: {0}")]
    Encode(String),
}

impl ProtocolError {
    pub(crate) fn malformed(err: &serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
