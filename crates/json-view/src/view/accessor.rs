//! Typed field handles returned by declared accessors.
//!
//! Each handle borrows the view's [`ViewCore`] for one get or set. Under
//! [`AccessorStrategy::Precompiled`] the handle reaches its descriptor by
//! the position fixed at declaration and materializes through a path
//! specialized on the Rust field type; under [`AccessorStrategy::Generic`]
//! it resolves the descriptor by name and goes through the shared table.

use std::marker::PhantomData;

use serde_json::Value;

use super::{Cached, View, ViewCore};
use crate::coerce::{Coerced, Scalar};
use crate::list::LazyList;
use crate::schema::{AccessorStrategy, FieldDescriptor};
use crate::ViewError;

fn descriptor(core: &ViewCore, index: usize, name: &str) -> Option<&'static FieldDescriptor> {
    let schema = core.schema();
    match schema.strategy() {
        AccessorStrategy::Precompiled => schema.field_at(index),
        AccessorStrategy::Generic => schema.field(name),
    }
}

/// Handle to a scalar field.
pub struct ScalarField<'a, T> {
    core: &'a mut ViewCore,
    index: usize,
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<'a, T: Scalar> ScalarField<'a, T> {
    #[doc(hidden)]
    pub fn bind(core: &'a mut ViewCore, index: usize, name: &'static str) -> Self {
        Self {
            core,
            index,
            name,
            _type: PhantomData,
        }
    }

    /// Materializes the field. `None` when the key is absent or null.
    pub fn get(self) -> Option<Coerced<T>> {
        self.value().map(Coerced::read)
    }

    pub fn value(self) -> Option<&'a Value> {
        self.value_mut().map(|value| &*value)
    }

    /// Cached value for in-place edits; changes show up in exports.
    pub fn value_mut(self) -> Option<&'a mut Value> {
        let core = self.core;
        match core.schema().strategy() {
            AccessorStrategy::Precompiled => {
                let field = core.schema().field_at(self.index)?;
                core.scalar::<T>(field)
            }
            AccessorStrategy::Generic => core
                .materialize(self.name)
                .ok()
                .flatten()
                .and_then(Cached::value_mut),
        }
    }

    pub fn set(self, value: T) {
        if let Some(field) = descriptor(self.core, self.index, self.name) {
            self.core.assign(field, Cached::Value(value.into_value()));
        }
    }

    pub fn is_cached(&self) -> bool {
        self.core.is_cached(self.name)
    }
}

/// Handle to a nested-view field.
pub struct ModelField<'a, V> {
    core: &'a mut ViewCore,
    index: usize,
    name: &'static str,
    _type: PhantomData<fn() -> V>,
}

impl<'a, V: View> ModelField<'a, V> {
    #[doc(hidden)]
    pub fn bind(core: &'a mut ViewCore, index: usize, name: &'static str) -> Self {
        Self {
            core,
            index,
            name,
            _type: PhantomData,
        }
    }

    /// Materializes the nested view; repeated calls return the same object.
    ///
    /// Fails with [`ViewError::ShapeMismatch`] when the raw value is neither
    /// an object nor null.
    pub fn get(self) -> Result<Option<&'a mut V>, ViewError> {
        let core = self.core;
        match core.schema().strategy() {
            AccessorStrategy::Precompiled => match core.schema().field_at(self.index) {
                Some(field) => core.model::<V>(field),
                None => Ok(None),
            },
            AccessorStrategy::Generic => {
                Ok(core.materialize(self.name)?.and_then(Cached::view_mut::<V>))
            }
        }
    }

    pub fn set(self, view: V) {
        if let Some(field) = descriptor(self.core, self.index, self.name) {
            self.core.assign(field, Cached::View(Box::new(view)));
        }
    }

    pub fn is_cached(&self) -> bool {
        self.core.is_cached(self.name)
    }
}

/// A materialized list field.
#[derive(Debug)]
pub enum ListValue<'a, V> {
    Lazy(&'a mut LazyList<V>),
    /// The raw value was not an array and is kept as is.
    Raw(&'a mut Value),
}

impl<'a, V> ListValue<'a, V> {
    pub fn into_lazy(self) -> Option<&'a mut LazyList<V>> {
        match self {
            Self::Lazy(list) => Some(list),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Self::Raw(value) => Some(value),
            Self::Lazy(_) => None,
        }
    }
}

/// Handle to a list-of-views field.
pub struct ListField<'a, V> {
    core: &'a mut ViewCore,
    index: usize,
    name: &'static str,
    _type: PhantomData<fn() -> V>,
}

impl<'a, V: View> ListField<'a, V> {
    #[doc(hidden)]
    pub fn bind(core: &'a mut ViewCore, index: usize, name: &'static str) -> Self {
        Self {
            core,
            index,
            name,
            _type: PhantomData,
        }
    }

    pub fn get(self) -> Option<ListValue<'a, V>> {
        let core = self.core;
        match core.schema().strategy() {
            AccessorStrategy::Precompiled => {
                let field = core.schema().field_at(self.index)?;
                core.list::<V>(field)
            }
            AccessorStrategy::Generic => core
                .materialize(self.name)
                .ok()
                .flatten()
                .and_then(Cached::list_mut::<V>),
        }
    }

    /// The lazy list, or `None` when the field is absent or not an array.
    pub fn lazy(self) -> Option<&'a mut LazyList<V>> {
        self.get().and_then(ListValue::into_lazy)
    }

    pub fn set(self, list: LazyList<V>) {
        if let Some(field) = descriptor(self.core, self.index, self.name) {
            self.core.assign(field, Cached::List(Box::new(list)));
        }
    }

    pub fn is_cached(&self) -> bool {
        self.core.is_cached(self.name)
    }
}
