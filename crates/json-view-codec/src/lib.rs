//! Encode/decode boundary for `json-view`.
//!
//! Views never parse bytes themselves; they hand buffers to a
//! [`DocumentCodec`] and work on the decoded [`serde_json::Value`] tree.

mod error;
mod json;
mod types;

pub use error::{CodecError, JsonError};
pub use json::JsonCodec;
pub use types::DocumentCodec;
