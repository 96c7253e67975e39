//! Typed views over raw documents.
//!
//! A view owns its raw [`Map`] and a lazily populated cache of materialized
//! fields. Reading a declared field may populate the cache, which is why
//! accessors take `&mut self`: materialization is part of the read contract,
//! not a hidden side effect.

mod accessor;
mod cache;

use std::any::Any;
use std::fmt;

use json_view_codec::{DocumentCodec, JsonCodec};
use serde_json::{Map, Value};

use crate::bulk::{self, BulkLoader};
use crate::schema::ViewSchema;
use crate::ViewError;

pub use accessor::{ListField, ListValue, ModelField, ScalarField};
pub use cache::{Dynamic, ViewCore};
pub(crate) use cache::Cached;

/// A declared view type.
///
/// Usually implemented by [`typed_view!`](crate::typed_view); a manual
/// implementation only has to provide the schema and access to its
/// [`ViewCore`].
pub trait View: Clone + fmt::Debug + Send + Sync + 'static {
    fn schema() -> &'static ViewSchema;

    fn from_core(core: ViewCore) -> Self;

    fn core(&self) -> &ViewCore;

    fn core_mut(&mut self) -> &mut ViewCore;

    fn into_core(self) -> ViewCore;

    /// Construction side effect run by [`View::new`], including when a
    /// nested view or list element is materialized. Bulk construction and
    /// [`View::wrap`] skip it.
    fn on_construct(&mut self) {}

    /// Wraps `raw` with an empty cache. Does not run [`View::on_construct`].
    fn wrap(raw: Map<String, Value>) -> Self {
        Self::from_core(ViewCore::new(Self::schema(), raw))
    }

    fn new(raw: Map<String, Value>) -> Self {
        let mut view = Self::wrap(raw);
        view.on_construct();
        view
    }

    /// Decodes a single JSON object.
    fn load_json(bytes: &[u8]) -> Result<Self, ViewError> {
        BulkLoader::json().load_single(bytes)
    }

    /// Decodes a JSON array of objects into views.
    fn bulk_load(bytes: &[u8]) -> Result<Vec<Self>, ViewError> {
        BulkLoader::json().load(bytes)
    }

    fn bulk_construct(items: Vec<Map<String, Value>>) -> Vec<Self> {
        bulk::construct(items)
    }

    /// Untyped read. Declared names go through their descriptor, anything
    /// else reads the raw document.
    fn get(&mut self, name: &str) -> Result<Option<Dynamic<'_>>, ViewError> {
        self.core_mut().get(name)
    }

    /// Untyped write. Declared names go through their descriptor, anything
    /// else writes the raw document.
    fn set(&mut self, name: &str, value: Value) -> Result<(), ViewError> {
        self.core_mut().set(name, value)
    }

    fn is_cached(&self, name: &str) -> bool {
        self.core().is_cached(name)
    }

    fn raw(&self) -> &Map<String, Value> {
        self.core().raw()
    }

    /// Direct access to the raw document. Writes to keys that were never
    /// materialized are visible to later reads and exports.
    fn raw_mut(&mut self) -> &mut Map<String, Value> {
        self.core_mut().raw_mut()
    }

    fn to_document(&self) -> Map<String, Value> {
        self.core().to_document()
    }

    fn into_document(self) -> Map<String, Value> {
        self.into_core().into_document()
    }

    fn to_bytes<C: DocumentCodec + ?Sized>(&self, codec: &C) -> Result<Vec<u8>, ViewError> {
        self.core().to_bytes(codec)
    }

    fn to_json(&self) -> Result<Vec<u8>, ViewError> {
        self.to_bytes(&JsonCodec::new())
    }
}

/// Object-safe face of a [`View`], used to keep nested views in a cache.
pub trait AnyView: Any + fmt::Debug + Send + Sync {
    fn view_name(&self) -> &'static str;

    fn export(&self) -> Map<String, Value>;

    fn into_export(self: Box<Self>) -> Map<String, Value>;

    fn clone_box(&self) -> Box<dyn AnyView>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<V: View> AnyView for V {
    fn view_name(&self) -> &'static str {
        V::schema().name()
    }

    fn export(&self) -> Map<String, Value> {
        self.to_document()
    }

    fn into_export(self: Box<Self>) -> Map<String, Value> {
        (*self).into_document()
    }

    fn clone_box(&self) -> Box<dyn AnyView> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn AnyView {
    pub fn downcast_ref<V: View>(&self) -> Option<&V> {
        self.as_any().downcast_ref::<V>()
    }

    pub fn downcast_mut<V: View>(&mut self) -> Option<&mut V> {
        self.as_any_mut().downcast_mut::<V>()
    }
}
