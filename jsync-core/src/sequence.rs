//! Homogeneous ordered collections.

use crate::aggregate::Syncable;
use crate::binding::Field;
use crate::document;
use crate::error::SyncResult;
use serde_json::Value;
use tracing::debug;

/// An ordered list of scalar or aggregate elements, saved as an array.
///
/// Loading replaces the contents: each array child is loaded into a
/// default-constructed element, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<T> {
    items: Vec<T>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sequence<T> {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Direct access to the underlying vector.
    pub fn as_mut_vec(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'s, T> IntoIterator for &'s Sequence<T> {
    type Item = &'s T;
    type IntoIter = std::slice::Iter<'s, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Field + Default> Syncable for Sequence<T> {
    fn save(&mut self, node: &mut Value) -> SyncResult<()> {
        let mut array = Vec::with_capacity(self.items.len());
        for item in &mut self.items {
            let mut child = Value::Null;
            item.save_field(&mut child)?;
            array.push(child);
        }
        debug!(elements = array.len(), "saved sequence");
        *node = Value::Array(array);
        Ok(())
    }

    fn load(&mut self, node: &Value) -> SyncResult<()> {
        let children = document::expect_array(node)?;
        self.items.clear();
        self.items.reserve(children.len());
        for child in children {
            let mut item = T::default();
            item.load_field(child)?;
            self.items.push(item);
        }
        debug!(elements = self.items.len(), "loaded sequence");
        Ok(())
    }
}
