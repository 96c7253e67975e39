//! JSON codec backed by `serde_json`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{CodecError, DocumentCodec, JsonError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    /// Emit indented output instead of the compact form.
    pub pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let out = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        Ok(out.map_err(JsonError::Encode)?)
    }
}

impl DocumentCodec for JsonCodec {
    fn id(&self) -> &'static str {
        "json"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        Ok(serde_json::from_slice(bytes).map_err(JsonError::Decode)?)
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        self.write(value)
    }

    fn encode_object(&self, map: &Map<String, Value>) -> Result<Vec<u8>, CodecError> {
        self.write(map)
    }
}
