//! Codec error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("could not encode JSON: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] JsonError),
}

impl CodecError {
    /// `true` when the failure came from malformed input bytes.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Json(JsonError::Decode(_)))
    }
}
