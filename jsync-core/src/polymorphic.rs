//! Collections of runtime-variant elements rebuilt through a factory.
//!
//! Each element is stored behind a shared [`Handle`] together with the
//! discriminator string that names its concrete kind. On load the
//! container asks its [`Factory`] for a fresh instance per discriminator
//! and loads that instance in place.
//!
//! Wire shapes:
//! - sequence: `[{"type": discriminator, "data": element}, ...]`
//! - associative: `[{"key": key, "type": discriminator, "value": element}, ...]`

use crate::aggregate::Syncable;
use crate::binding::Field;
use crate::document::{self, DATA, KEY, TYPE, VALUE};
use crate::error::{SyncError, SyncResult};
use serde_json::{Map, Value};
use std::cell::{RefCell, RefMut};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Shared owning reference to a polymorphic element.
///
/// The container keeps one strong reference; a caller that holds on to the
/// handle returned by `push_from_factory` keeps the element alive after the
/// container clears.
pub type Handle<T> = Rc<RefCell<T>>;

/// Builds a fresh element for a discriminator, or `None` if it is unknown.
pub type Factory<T> = Box<dyn Fn(&str) -> Option<Handle<T>>>;

/// One element of a polymorphic container.
pub struct PolymorphicEntry<T: ?Sized> {
    handle: Handle<T>,
    discriminator: String,
}

impl<T: ?Sized> PolymorphicEntry<T> {
    pub fn new(handle: Handle<T>, discriminator: impl Into<String>) -> Self {
        Self {
            handle,
            discriminator: discriminator.into(),
        }
    }

    pub fn handle(&self) -> &Handle<T> {
        &self.handle
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }
}

impl<T: Syncable + ?Sized> PolymorphicEntry<T> {
    fn save_into(&self, node: &mut Value) -> SyncResult<()> {
        self.element_mut()?.save(node)
    }

    fn load_from(&self, node: &Value) -> SyncResult<()> {
        self.element_mut()?.load(node)
    }

    fn element_mut(&self) -> SyncResult<RefMut<'_, T>> {
        self.handle
            .try_borrow_mut()
            .map_err(|_| SyncError::HandleBusy(self.discriminator.clone()))
    }
}

impl<T: ?Sized> Clone for PolymorphicEntry<T> {
    fn clone(&self) -> Self {
        Self {
            handle: Rc::clone(&self.handle),
            discriminator: self.discriminator.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for PolymorphicEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicEntry")
            .field("discriminator", &self.discriminator)
            .field("owners", &Rc::strong_count(&self.handle))
            .finish()
    }
}

fn build<T: ?Sized>(factory: Option<&Factory<T>>, discriminator: &str) -> SyncResult<Handle<T>> {
    let factory = factory.ok_or(SyncError::MissingFactory)?;
    factory(discriminator).ok_or_else(|| SyncError::UnknownDiscriminator(discriminator.to_string()))
}

fn read_discriminator(entry: &Value) -> SyncResult<&str> {
    let node = document::member(entry, TYPE)?;
    node.as_str()
        .ok_or_else(|| SyncError::expected("string discriminator", node))
}

/// An ordered list of polymorphic elements.
pub struct PolymorphicSequence<T: ?Sized> {
    entries: Vec<PolymorphicEntry<T>>,
    factory: Option<Factory<T>>,
}

impl<T: ?Sized> Default for PolymorphicSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> PolymorphicSequence<T> {
    /// Creates an empty sequence with no factory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            factory: None,
        }
    }

    /// Creates an empty sequence that builds elements with `factory`.
    #[must_use]
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Option<Handle<T>> + 'static,
    {
        let mut sequence = Self::new();
        sequence.set_factory(factory);
        sequence
    }

    pub fn set_factory<F>(&mut self, factory: F)
    where
        F: Fn(&str) -> Option<Handle<T>> + 'static,
    {
        self.factory = Some(Box::new(factory));
    }

    #[must_use]
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Builds a new element for `discriminator`, appends it and returns its handle.
    pub fn push_from_factory(&mut self, discriminator: &str) -> SyncResult<Handle<T>> {
        let handle = build(self.factory.as_ref(), discriminator)?;
        self.entries
            .push(PolymorphicEntry::new(Rc::clone(&handle), discriminator));
        Ok(handle)
    }

    /// Appends an element built elsewhere.
    pub fn push(&mut self, handle: Handle<T>, discriminator: impl Into<String>) {
        self.entries.push(PolymorphicEntry::new(handle, discriminator));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PolymorphicEntry<T>> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PolymorphicEntry<T>> {
        self.entries.iter()
    }

    /// Drops the container's share of every element.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: ?Sized> fmt::Debug for PolymorphicSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicSequence")
            .field("entries", &self.entries)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

impl<T: Syncable + ?Sized> Syncable for PolymorphicSequence<T> {
    fn save(&mut self, node: &mut Value) -> SyncResult<()> {
        let mut array = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let mut data = Value::Null;
            entry.save_into(&mut data)?;

            let mut object = Map::new();
            object.insert(TYPE.to_string(), Value::String(entry.discriminator.clone()));
            object.insert(DATA.to_string(), data);
            array.push(Value::Object(object));
        }
        debug!(elements = array.len(), "saved polymorphic sequence");
        *node = Value::Array(array);
        Ok(())
    }

    fn load(&mut self, node: &Value) -> SyncResult<()> {
        let children = document::expect_array(node)?;
        let factory = self.factory.as_ref().ok_or(SyncError::MissingFactory)?;
        self.entries.clear();
        for child in children {
            let discriminator = read_discriminator(child)?;
            let entry = PolymorphicEntry::new(build(Some(factory), discriminator)?, discriminator);
            entry.load_from(document::member(child, DATA)?)?;
            self.entries.push(entry);
        }
        debug!(elements = self.entries.len(), "loaded polymorphic sequence");
        Ok(())
    }
}

/// A key-ordered map of polymorphic elements.
///
/// Inserting under an existing key replaces the entry; a document that
/// repeats a key keeps the last pair.
///
/// Keys are saved from a clone, as in [`crate::Associative`], so key
/// `after_save` side effects are discarded.
pub struct PolymorphicAssociative<K, T: ?Sized> {
    entries: BTreeMap<K, PolymorphicEntry<T>>,
    factory: Option<Factory<T>>,
}

impl<K: Ord, T: ?Sized> Default for PolymorphicAssociative<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, T: ?Sized> PolymorphicAssociative<K, T> {
    /// Creates an empty map with no factory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            factory: None,
        }
    }

    /// Creates an empty map that builds elements with `factory`.
    #[must_use]
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Option<Handle<T>> + 'static,
    {
        let mut map = Self::new();
        map.set_factory(factory);
        map
    }

    pub fn set_factory<F>(&mut self, factory: F)
    where
        F: Fn(&str) -> Option<Handle<T>> + 'static,
    {
        self.factory = Some(Box::new(factory));
    }

    #[must_use]
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Builds a new element for `discriminator`, stores it under `key` and
    /// returns its handle.
    pub fn push_from_factory(&mut self, key: K, discriminator: &str) -> SyncResult<Handle<T>> {
        let handle = build(self.factory.as_ref(), discriminator)?;
        self.entries
            .insert(key, PolymorphicEntry::new(Rc::clone(&handle), discriminator));
        Ok(handle)
    }

    /// Stores an element built elsewhere, returning the entry it replaced.
    pub fn insert(
        &mut self,
        key: K,
        handle: Handle<T>,
        discriminator: impl Into<String>,
    ) -> Option<PolymorphicEntry<T>> {
        self.entries
            .insert(key, PolymorphicEntry::new(handle, discriminator))
    }

    pub fn get(&self, key: &K) -> Option<&PolymorphicEntry<T>> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<PolymorphicEntry<T>> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, PolymorphicEntry<T>> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, PolymorphicEntry<T>> {
        self.entries.keys()
    }

    /// Drops the container's share of every element.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: fmt::Debug, T: ?Sized> fmt::Debug for PolymorphicAssociative<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicAssociative")
            .field("entries", &self.entries)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

impl<K, T> Syncable for PolymorphicAssociative<K, T>
where
    K: Field + Default + Ord + Clone,
    T: Syncable + ?Sized,
{
    fn save(&mut self, node: &mut Value) -> SyncResult<()> {
        let mut array = Vec::with_capacity(self.entries.len());
        for (key, entry) in &self.entries {
            let mut key = key.clone();
            let mut key_node = Value::Null;
            key.save_field(&mut key_node)?;

            let mut value = Value::Null;
            entry.save_into(&mut value)?;

            let mut object = Map::new();
            object.insert(KEY.to_string(), key_node);
            object.insert(TYPE.to_string(), Value::String(entry.discriminator.clone()));
            object.insert(VALUE.to_string(), value);
            array.push(Value::Object(object));
        }
        debug!(pairs = array.len(), "saved polymorphic associative");
        *node = Value::Array(array);
        Ok(())
    }

    fn load(&mut self, node: &Value) -> SyncResult<()> {
        let children = document::expect_array(node)?;
        let factory = self.factory.as_ref().ok_or(SyncError::MissingFactory)?;
        self.entries.clear();
        for child in children {
            let mut key = K::default();
            key.load_field(document::member(child, KEY)?)?;

            let discriminator = read_discriminator(child)?;
            let entry = PolymorphicEntry::new(build(Some(factory), discriminator)?, discriminator);
            entry.load_from(document::member(child, VALUE)?)?;

            if self.entries.insert(key, entry).is_some() {
                debug!("duplicate key in polymorphic document, keeping the later pair");
            }
        }
        debug!(pairs = self.entries.len(), "loaded polymorphic associative");
        Ok(())
    }
}
