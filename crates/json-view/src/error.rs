//! View error type.
//!
//! Only codec failures and nested-model shape mismatches surface as errors.
//! Scalar coercion failures and list shape mismatches resolve to the raw
//! value instead.

use std::sync::Arc;

use json_view_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("field `{view}.{field}` expects an object under key `{wire_key}`, found {found}")]
    ShapeMismatch {
        view: &'static str,
        field: &'static str,
        wire_key: Arc<str>,
        found: &'static str,
    },
    #[error("expected a top-level {expected}, found {found}")]
    Document {
        expected: &'static str,
        found: &'static str,
    },
    #[error("bulk item {index} is not an object (found {found})")]
    BulkItem { index: usize, found: &'static str },
}

impl ViewError {
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Codec(err) if err.is_decode())
    }
}
