//! Lazily materialized lists of views.
//!
//! [`LazyList`] keeps each element as it came from the document until it
//! is accessed. Accessing a raw object slot builds the element view and
//! stores it back in that slot, so later accesses at the same index return
//! the same object. [`LazySlice`] is a borrowed window onto a list;
//! materializing through it writes into the parent's slots.

use std::any::Any;
use std::fmt;
use std::ops::{Bound, Range, RangeBounds};

use serde_json::Value;

use crate::view::View;

/// One slot of a lazy list.
#[derive(Debug, Clone, PartialEq)]
pub enum Element<V> {
    Raw(Value),
    View(V),
}

impl<V: View> Element<V> {
    pub fn is_materialized(&self) -> bool {
        matches!(self, Self::View(_))
    }

    pub fn as_view(&self) -> Option<&V> {
        match self {
            Self::View(view) => Some(view),
            Self::Raw(_) => None,
        }
    }

    pub fn as_view_mut(&mut self) -> Option<&mut V> {
        match self {
            Self::View(view) => Some(view),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Self::Raw(value) => Some(value),
            Self::View(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Raw(value) => value.clone(),
            Self::View(view) => Value::Object(view.to_document()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Raw(value) => value,
            Self::View(view) => Value::Object(view.into_document()),
        }
    }

    /// Turns a raw object slot into a view in place. Other raw values are
    /// left alone.
    fn materialize(&mut self) -> &mut Self {
        if let Self::Raw(Value::Object(raw)) = self {
            let raw = std::mem::take(raw);
            *self = Self::View(V::new(raw));
        }
        self
    }
}

/// Clamps `range` to `0..len` the way sequence slicing does.
fn clamp<R: RangeBounds<usize>>(range: R, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    let end = end.min(len);
    start.min(end)..end
}

#[derive(Debug, Clone, PartialEq)]
pub struct LazyList<V> {
    slots: Vec<Element<V>>,
}

impl<V> Default for LazyList<V> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<V: View> LazyList<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps raw items without materializing any of them.
    pub fn from_raw(items: Vec<Value>) -> Self {
        Self {
            slots: items.into_iter().map(Element::Raw).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Element at `index`, materializing it if it is still a raw object.
    pub fn get(&mut self, index: usize) -> Option<&mut Element<V>> {
        self.slots.get_mut(index).map(Element::materialize)
    }

    /// View at `index`; `None` when out of range or the slot holds a
    /// non-object raw value.
    pub fn view(&mut self, index: usize) -> Option<&mut V> {
        self.get(index).and_then(Element::as_view_mut)
    }

    pub fn is_materialized(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Element::is_materialized)
    }

    pub fn materialized_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_materialized()).count()
    }

    /// Borrowed sub-list. Nothing is materialized.
    pub fn slice<R: RangeBounds<usize>>(&mut self, range: R) -> LazySlice<'_, V> {
        let range = clamp(range, self.slots.len());
        LazySlice {
            slots: &mut self.slots[range],
        }
    }

    pub fn as_slice(&mut self) -> LazySlice<'_, V> {
        LazySlice {
            slots: &mut self.slots,
        }
    }

    /// Slots as they are, without materializing.
    pub fn iter(&self) -> std::slice::Iter<'_, Element<V>> {
        self.slots.iter()
    }

    /// Materializes each element as iteration reaches it.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.slots.iter_mut(),
        }
    }

    pub fn push(&mut self, raw: Value) {
        self.slots.push(Element::Raw(raw));
    }

    pub fn push_view(&mut self, view: V) {
        self.slots.push(Element::View(view));
    }

    /// Inserts at `index`, clamped to the list length.
    pub fn insert(&mut self, index: usize, element: Element<V>) {
        let index = index.min(self.slots.len());
        self.slots.insert(index, element);
    }

    pub fn remove(&mut self, index: usize) -> Option<Element<V>> {
        (index < self.slots.len()).then(|| self.slots.remove(index))
    }

    pub fn pop(&mut self) -> Option<Element<V>> {
        self.slots.pop()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn export(&self) -> Vec<Value> {
        self.slots.iter().map(Element::to_value).collect()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.slots.into_iter().map(Element::into_value).collect()
    }
}

impl<V: View> From<Vec<Value>> for LazyList<V> {
    fn from(items: Vec<Value>) -> Self {
        Self::from_raw(items)
    }
}

impl<V: View> FromIterator<V> for LazyList<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(Element::View).collect(),
        }
    }
}

impl<'a, V: View> IntoIterator for &'a mut LazyList<V> {
    type Item = &'a mut Element<V>;
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A borrowed window onto a [`LazyList`].
#[derive(Debug)]
pub struct LazySlice<'a, V> {
    slots: &'a mut [Element<V>],
}

impl<'a, V: View> LazySlice<'a, V> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&mut self, index: usize) -> Option<&mut Element<V>> {
        self.slots.get_mut(index).map(Element::materialize)
    }

    pub fn view(&mut self, index: usize) -> Option<&mut V> {
        self.get(index).and_then(Element::as_view_mut)
    }

    pub fn is_materialized(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Element::is_materialized)
    }

    pub fn slice<R: RangeBounds<usize>>(&mut self, range: R) -> LazySlice<'_, V> {
        let range = clamp(range, self.slots.len());
        LazySlice {
            slots: &mut self.slots[range],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element<V>> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.slots.iter_mut(),
        }
    }

    /// Copies the window into an owned list, keeping each slot's state.
    pub fn to_list(&self) -> LazyList<V> {
        LazyList {
            slots: self.slots.to_vec(),
        }
    }

    pub fn export(&self) -> Vec<Value> {
        self.slots.iter().map(Element::to_value).collect()
    }
}

/// Iterator that materializes elements one at a time.
#[derive(Debug)]
pub struct IterMut<'a, V> {
    inner: std::slice::IterMut<'a, Element<V>>,
}

impl<'a, V: View> Iterator for IterMut<'a, V> {
    type Item = &'a mut Element<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Element::materialize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V: View> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Element::materialize)
    }
}

impl<V: View> ExactSizeIterator for IterMut<'_, V> {}

/// Object-safe face of a [`LazyList`], used to keep lists in a view cache.
pub trait AnyList: Any + fmt::Debug + Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn export(&self) -> Vec<Value>;

    fn into_export(self: Box<Self>) -> Vec<Value>;

    fn clone_box(&self) -> Box<dyn AnyList>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<V: View> AnyList for LazyList<V> {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn export(&self) -> Vec<Value> {
        LazyList::export(self)
    }

    fn into_export(self: Box<Self>) -> Vec<Value> {
        (*self).into_values()
    }

    fn clone_box(&self) -> Box<dyn AnyList> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
