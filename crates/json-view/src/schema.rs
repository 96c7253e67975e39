//! Field descriptor tables.
//!
//! A [`ViewSchema`] is compiled once per view type (the `typed_view!` macro
//! keeps it in a `OnceLock`) and never rebuilt per instance. Each
//! [`FieldDescriptor`] carries the field's resolved wire key and its kind;
//! composite kinds carry a [`ViewType`], a small table of monomorphized
//! constructors for the nested view.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::alias::{self, KeyConvention};
use crate::coerce::BaseType;
use crate::list::{AnyList, LazyList};
use crate::view::{AnyView, View};

/// How typed accessors reach their descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessorStrategy {
    /// Accessors bind their descriptor by position at declaration time and
    /// materialize through a path specialized on the field's Rust type.
    #[default]
    Precompiled,
    /// Accessors look their descriptor up by name on every call and
    /// materialize through type-erased dispatch on [`FieldKind`].
    Generic,
}

/// Type-erased constructors for a nested view type.
#[derive(Clone, Copy)]
pub struct ViewType {
    name: &'static str,
    id: fn() -> TypeId,
    wrap: fn(Map<String, Value>) -> Box<dyn AnyView>,
    wrap_list: fn(Vec<Value>) -> Box<dyn AnyList>,
}

fn wrap_view<V: View>(raw: Map<String, Value>) -> Box<dyn AnyView> {
    Box::new(V::new(raw))
}

fn wrap_list<V: View>(items: Vec<Value>) -> Box<dyn AnyList> {
    Box::new(LazyList::<V>::from_raw(items))
}

impl ViewType {
    pub fn of<V: View>() -> Self {
        Self {
            name: std::any::type_name::<V>(),
            id: TypeId::of::<V>,
            wrap: wrap_view::<V>,
            wrap_list: wrap_list::<V>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        (self.id)()
    }

    pub(crate) fn wrap(&self, raw: Map<String, Value>) -> Box<dyn AnyView> {
        (self.wrap)(raw)
    }

    pub(crate) fn wrap_list(&self, items: Vec<Value>) -> Box<dyn AnyList> {
        (self.wrap_list)(items)
    }
}

impl fmt::Debug for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewType").field(&self.name).finish()
    }
}

impl PartialEq for ViewType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar(BaseType),
    Model(ViewType),
    List(ViewType),
}

impl FieldKind {
    pub fn is_composite(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }
}

/// One compiled field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    wire_key: Arc<str>,
    kind: FieldKind,
}

impl FieldDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn wire_key(&self) -> &str {
        &self.wire_key
    }

    pub(crate) fn wire_key_arc(&self) -> Arc<str> {
        Arc::clone(&self.wire_key)
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// A field as declared, before its wire key is resolved.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    name: &'static str,
    alias: Option<&'static str>,
    kind: FieldKind,
}

impl FieldDecl {
    pub fn scalar(name: &'static str, base: BaseType) -> Self {
        Self::new(name, FieldKind::Scalar(base))
    }

    pub fn model<V: View>(name: &'static str) -> Self {
        Self::new(name, FieldKind::Model(ViewType::of::<V>()))
    }

    pub fn list<V: View>(name: &'static str) -> Self {
        Self::new(name, FieldKind::List(ViewType::of::<V>()))
    }

    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            alias: None,
            kind,
        }
    }

    /// Stores the field under `alias` verbatim.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn alias_opt(mut self, alias: Option<&'static str>) -> Self {
        self.alias = alias;
        self
    }
}

/// Compiled descriptor table of one view type.
#[derive(Debug)]
pub struct ViewSchema {
    name: &'static str,
    strategy: AccessorStrategy,
    convention: KeyConvention,
    fields: Vec<FieldDescriptor>,
    by_name: FxHashMap<&'static str, usize>,
}

impl ViewSchema {
    pub fn builder(name: &'static str) -> ViewSchemaBuilder {
        ViewSchemaBuilder {
            name,
            strategy: AccessorStrategy::default(),
            convention: KeyConvention::default(),
            decls: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn strategy(&self) -> AccessorStrategy {
        self.strategy
    }

    pub fn convention(&self) -> KeyConvention {
        self.convention
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_at(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Wire key for a declared field; undeclared names map to themselves.
    pub fn wire_key<'a>(&'a self, name: &'a str) -> &'a str {
        self.field(name).map_or(name, FieldDescriptor::wire_key)
    }
}

#[derive(Debug)]
pub struct ViewSchemaBuilder {
    name: &'static str,
    strategy: AccessorStrategy,
    convention: KeyConvention,
    decls: Vec<FieldDecl>,
}

impl ViewSchemaBuilder {
    pub fn strategy(mut self, strategy: AccessorStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn keys(mut self, convention: KeyConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn field(mut self, decl: FieldDecl) -> Self {
        self.decls.push(decl);
        self
    }

    pub fn build(self) -> ViewSchema {
        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(self.decls.len());
        let mut by_name: FxHashMap<&'static str, usize> =
            FxHashMap::with_capacity_and_hasher(self.decls.len(), Default::default());
        for decl in self.decls {
            let descriptor = FieldDescriptor {
                name: decl.name,
                wire_key: alias::resolve(decl.name, decl.alias, self.convention),
                kind: decl.kind,
            };
            match by_name.get(decl.name) {
                Some(&index) => fields[index] = descriptor,
                None => {
                    by_name.insert(decl.name, fields.len());
                    fields.push(descriptor);
                }
            }
        }
        tracing::debug!(
            view = self.name,
            fields = fields.len(),
            strategy = ?self.strategy,
            "compiled view schema"
        );
        ViewSchema {
            name: self.name,
            strategy: self.strategy,
            convention: self.convention,
            fields,
            by_name,
        }
    }
}
