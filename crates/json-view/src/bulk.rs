//! Bulk construction of views from decoded arrays.
//!
//! Bulk paths wrap each object directly: no [`View::on_construct`] hook, no
//! per-item validation beyond the object check.

use json_view_codec::{DocumentCodec, JsonCodec};
use serde_json::{Map, Value};

use crate::coerce::kind_name;
use crate::view::View;
use crate::ViewError;

/// Wraps every map in a view with an empty cache.
#[tracing::instrument(level = "debug", skip_all, fields(view = V::schema().name(), count = items.len()))]
pub fn construct<V: View>(items: Vec<Map<String, Value>>) -> Vec<V> {
    items.into_iter().map(V::wrap).collect()
}

/// Like [`construct`] for already decoded values; every item must be an
/// object.
#[tracing::instrument(level = "debug", skip_all, fields(view = V::schema().name(), count = items.len()))]
pub fn from_values<V: View>(items: Vec<Value>) -> Result<Vec<V>, ViewError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(raw) => Ok(V::wrap(raw)),
            other => Err(ViewError::BulkItem {
                index,
                found: kind_name(&other),
            }),
        })
        .collect()
}

/// Decodes buffers with a codec and builds views from the result.
#[derive(Debug, Clone, Default)]
pub struct BulkLoader<C = JsonCodec> {
    codec: C,
}

impl BulkLoader<JsonCodec> {
    pub fn json() -> Self {
        Self::new(JsonCodec::new())
    }
}

impl<C: DocumentCodec> BulkLoader<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn construct<V: View>(&self, items: Vec<Map<String, Value>>) -> Vec<V> {
        construct(items)
    }

    pub fn from_values<V: View>(&self, items: Vec<Value>) -> Result<Vec<V>, ViewError> {
        from_values(items)
    }

    /// Decodes an array of objects.
    pub fn load<V: View>(&self, bytes: &[u8]) -> Result<Vec<V>, ViewError> {
        match self.codec.decode(bytes)? {
            Value::Array(items) => from_values(items),
            other => Err(ViewError::Document {
                expected: "array",
                found: kind_name(&other),
            }),
        }
    }

    /// Decodes one object; equivalent to a one-element [`load`](Self::load).
    pub fn load_single<V: View>(&self, bytes: &[u8]) -> Result<V, ViewError> {
        match self.codec.decode(bytes)? {
            Value::Object(raw) => Ok(V::wrap(raw)),
            other => Err(ViewError::Document {
                expected: "object",
                found: kind_name(&other),
            }),
        }
    }
}
