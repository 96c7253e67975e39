//! Per-instance raw document and materialization cache.
//!
//! Composite fields (nested views, lazy lists) are moved out of the raw
//! document when they are materialized, leaving an empty object/array of
//! the same shape behind. From then on the cache owns that subtree and
//! export writes it back under the field's wire key. Scalars stay in the
//! raw document and the cache holds the coerced copy.

use std::fmt;

use indexmap::IndexMap;
use json_view_codec::DocumentCodec;
use serde_json::{Map, Value};

use super::{AnyView, View};
use crate::coerce::{kind_name, Scalar};
use crate::list::{AnyList, LazyList};
use crate::schema::{FieldDescriptor, FieldKind, ViewSchema};
use crate::view::ListValue;
use crate::ViewError;

/// A materialized field.
#[derive(Debug)]
pub(crate) enum Cached {
    Value(Value),
    View(Box<dyn AnyView>),
    List(Box<dyn AnyList>),
}

impl Cached {
    pub(crate) fn value_mut(&mut self) -> Option<&mut Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::View(_) | Self::List(_) => None,
        }
    }

    pub(crate) fn view_mut<V: View>(&mut self) -> Option<&mut V> {
        match self {
            Self::View(view) => view.as_any_mut().downcast_mut::<V>(),
            Self::Value(_) | Self::List(_) => None,
        }
    }

    pub(crate) fn list_mut<V: View>(&mut self) -> Option<ListValue<'_, V>> {
        match self {
            Self::List(list) => list
                .as_any_mut()
                .downcast_mut::<LazyList<V>>()
                .map(ListValue::Lazy),
            Self::Value(value) => Some(ListValue::Raw(value)),
            Self::View(_) => None,
        }
    }

    /// What the raw document holds under the wire key while this entry is
    /// cached.
    fn stored_form(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::View(_) => Value::Object(Map::new()),
            Self::List(_) => Value::Array(Vec::new()),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::View(view) => Value::Object(view.export()),
            Self::List(list) => Value::Array(list.export()),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::View(view) => Value::Object(view.into_export()),
            Self::List(list) => Value::Array(list.into_export()),
        }
    }
}

impl Clone for Cached {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::View(view) => Self::View(view.clone_box()),
            Self::List(list) => Self::List(list.clone_box()),
        }
    }
}

/// Result of an untyped [`View::get`](super::View::get).
#[derive(Debug)]
pub enum Dynamic<'a> {
    Value(&'a mut Value),
    View(&'a mut (dyn AnyView + 'static)),
    List(&'a mut (dyn AnyList + 'static)),
}

impl<'a> Dynamic<'a> {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::View(_) | Self::List(_) => None,
        }
    }

    pub fn into_view<V: View>(self) -> Option<&'a mut V> {
        match self {
            Self::View(view) => view.downcast_mut::<V>(),
            Self::Value(_) | Self::List(_) => None,
        }
    }

    pub fn into_list<V: View>(self) -> Option<&'a mut LazyList<V>> {
        match self {
            Self::List(list) => list.as_any_mut().downcast_mut::<LazyList<V>>(),
            Self::Value(_) | Self::View(_) => None,
        }
    }

    /// Exported form of the value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => (**value).clone(),
            Self::View(view) => Value::Object(view.export()),
            Self::List(list) => Value::Array(list.export()),
        }
    }
}

impl<'a> From<&'a mut Cached> for Dynamic<'a> {
    fn from(cached: &'a mut Cached) -> Self {
        match cached {
            Cached::Value(value) => Self::Value(value),
            Cached::View(view) => Self::View(&mut **view),
            Cached::List(list) => Self::List(&mut **list),
        }
    }
}

/// Raw document plus materialization cache of one view instance.
#[derive(Clone)]
pub struct ViewCore {
    schema: &'static ViewSchema,
    raw: Map<String, Value>,
    cache: IndexMap<&'static str, Cached>,
}

impl fmt::Debug for ViewCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCore")
            .field("view", &self.schema.name())
            .field("raw", &self.raw)
            .field("cached", &self.cache.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn shape_mismatch(view: &'static str, field: &'static FieldDescriptor, found: &Value) -> ViewError {
    ViewError::ShapeMismatch {
        view,
        field: field.name(),
        wire_key: field.wire_key_arc(),
        found: kind_name(found),
    }
}

/// Moves the object under `field`'s wire key out of `raw`.
fn take_object(
    view: &'static str,
    raw: &mut Map<String, Value>,
    field: &'static FieldDescriptor,
) -> Result<Option<Map<String, Value>>, ViewError> {
    match raw.get_mut(field.wire_key()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(std::mem::take(map))),
        Some(other) => Err(shape_mismatch(view, field, other)),
    }
}

/// Moves the array under `field`'s wire key out of `raw`; any other
/// non-null value is returned as an `Err` copy to be cached verbatim.
fn take_list(
    raw: &mut Map<String, Value>,
    field: &FieldDescriptor,
) -> Option<Result<Vec<Value>, Value>> {
    match raw.get_mut(field.wire_key()) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(Ok(std::mem::take(items))),
        Some(other) => Some(Err(other.clone())),
    }
}

impl ViewCore {
    pub fn new(schema: &'static ViewSchema, raw: Map<String, Value>) -> Self {
        Self {
            schema,
            raw,
            cache: IndexMap::new(),
        }
    }

    pub fn schema(&self) -> &'static ViewSchema {
        self.schema
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.raw
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub(crate) fn scalar<T: Scalar>(&mut self, field: &'static FieldDescriptor) -> Option<&mut Value> {
        if !self.cache.contains_key(field.name()) {
            let raw = self.raw.get(field.wire_key()).filter(|raw| !raw.is_null())?;
            let value = T::coerce(raw);
            self.cache.insert(field.name(), Cached::Value(value));
        }
        self.cache.get_mut(field.name()).and_then(Cached::value_mut)
    }

    pub(crate) fn model<V: View>(
        &mut self,
        field: &'static FieldDescriptor,
    ) -> Result<Option<&mut V>, ViewError> {
        if !self.cache.contains_key(field.name()) {
            let Some(raw) = take_object(self.schema.name(), &mut self.raw, field)? else {
                return Ok(None);
            };
            tracing::trace!(view = self.schema.name(), field = field.name(), "materializing nested view");
            self.cache.insert(field.name(), Cached::View(Box::new(V::new(raw))));
        }
        Ok(self.cache.get_mut(field.name()).and_then(Cached::view_mut::<V>))
    }

    pub(crate) fn list<V: View>(&mut self, field: &'static FieldDescriptor) -> Option<ListValue<'_, V>> {
        if !self.cache.contains_key(field.name()) {
            let cached = match take_list(&mut self.raw, field)? {
                Ok(items) => Cached::List(Box::new(LazyList::<V>::from_raw(items))),
                Err(raw) => Cached::Value(raw),
            };
            self.cache.insert(field.name(), cached);
        }
        self.cache.get_mut(field.name()).and_then(Cached::list_mut::<V>)
    }

    /// Table-driven materialization: looks `name` up in the schema and
    /// dispatches on its [`FieldKind`].
    pub(crate) fn materialize(&mut self, name: &str) -> Result<Option<&mut Cached>, ViewError> {
        let schema = self.schema;
        let Some(field) = schema.field(name) else {
            return Ok(None);
        };
        if !self.cache.contains_key(field.name()) {
            let cached = match field.kind() {
                FieldKind::Scalar(base) => match self.raw.get(field.wire_key()) {
                    None | Some(Value::Null) => return Ok(None),
                    Some(raw) => Cached::Value(base.coerce(raw)),
                },
                FieldKind::Model(ty) => match take_object(schema.name(), &mut self.raw, field)? {
                    Some(raw) => {
                        tracing::trace!(view = schema.name(), field = field.name(), "materializing nested view");
                        Cached::View(ty.wrap(raw))
                    }
                    None => return Ok(None),
                },
                FieldKind::List(ty) => match take_list(&mut self.raw, field) {
                    Some(Ok(items)) => Cached::List(ty.wrap_list(items)),
                    Some(Err(raw)) => Cached::Value(raw),
                    None => return Ok(None),
                },
            };
            self.cache.insert(field.name(), cached);
        }
        Ok(self.cache.get_mut(field.name()))
    }

    pub(crate) fn assign(&mut self, field: &'static FieldDescriptor, cached: Cached) {
        self.raw.insert(field.wire_key().to_owned(), cached.stored_form());
        self.cache.insert(field.name(), cached);
    }

    pub fn get(&mut self, name: &str) -> Result<Option<Dynamic<'_>>, ViewError> {
        if self.schema.field(name).is_some() {
            return Ok(self.materialize(name)?.map(Dynamic::from));
        }
        Ok(self.raw.get_mut(name).map(Dynamic::Value))
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), ViewError> {
        let schema = self.schema;
        let Some(field) = schema.field(name) else {
            self.raw.insert(name.to_owned(), value);
            return Ok(());
        };
        let cached = match (field.kind(), value) {
            (FieldKind::Model(ty), Value::Object(raw)) => Cached::View(ty.wrap(raw)),
            (FieldKind::Model(_), other) if !other.is_null() => {
                return Err(shape_mismatch(schema.name(), field, &other));
            }
            (FieldKind::List(ty), Value::Array(items)) => Cached::List(ty.wrap_list(items)),
            (_, value) => Cached::Value(value),
        };
        self.assign(field, cached);
        Ok(())
    }

    /// Raw document with every cached field written back under its wire key.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut out = self.raw.clone();
        for (name, cached) in &self.cache {
            out.insert(self.schema.wire_key(name).to_owned(), cached.to_value());
        }
        out
    }

    pub fn into_document(self) -> Map<String, Value> {
        let Self {
            schema,
            mut raw,
            cache,
        } = self;
        for (name, cached) in cache {
            raw.insert(schema.wire_key(name).to_owned(), cached.into_value());
        }
        raw
    }

    /// Encodes the exported document. With nothing cached the raw document
    /// is encoded as is, without walking any descriptor.
    pub fn to_bytes<C: DocumentCodec + ?Sized>(&self, codec: &C) -> Result<Vec<u8>, ViewError> {
        if self.cache.is_empty() {
            tracing::trace!(view = self.schema.name(), "encoding untouched raw document");
            return Ok(codec.encode_object(&self.raw)?);
        }
        Ok(codec.encode_object(&self.to_document())?)
    }
}
