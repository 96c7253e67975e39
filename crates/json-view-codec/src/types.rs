//! Common codec trait.

use serde_json::{Map, Value};

use crate::CodecError;

/// A byte-level codec for JSON-compatible document trees.
///
/// Objects decode to maps, arrays to lists, and scalars to
/// null/bool/number/string.
pub trait DocumentCodec {
    fn id(&self) -> &'static str;
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    /// Encodes a top-level object without wrapping it in a [`Value`].
    ///
    /// The default implementation clones the map; codecs that can serialize
    /// a borrowed map directly should override it.
    fn encode_object(&self, map: &Map<String, Value>) -> Result<Vec<u8>, CodecError> {
        self.encode(&Value::Object(map.clone()))
    }
}

impl<C: DocumentCodec + ?Sized> DocumentCodec for &C {
    fn id(&self) -> &'static str {
        (**self).id()
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        (**self).decode(bytes)
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        (**self).encode(value)
    }

    fn encode_object(&self, map: &Map<String, Value>) -> Result<Vec<u8>, CodecError> {
        (**self).encode_object(map)
    }
}
