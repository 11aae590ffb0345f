//! Homogeneous key → value collections.
//!
//! Keys need not be strings and may be aggregates themselves, so the wire
//! shape is an array of `{"key": K, "value": V}` pair objects rather than a
//! native JSON object. Pairs are written in key order.

use crate::aggregate::Syncable;
use crate::binding::Field;
use crate::document::{self, KEY, VALUE};
use crate::error::SyncResult;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::btree_map;
use tracing::debug;

/// A map of unique keys to values, ordered by key.
///
/// Loading replaces the contents. When the same key appears more than once
/// in a document the last pair wins.
///
/// Stored keys cannot be borrowed mutably, so a delegate key is saved from
/// a clone: its `after_save` hook runs on that clone and any state it
/// changes is discarded. Key hooks should not rely on mutating the key.
#[derive(Debug, Clone, PartialEq)]
pub struct Associative<K, V> {
    map: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for Associative<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> Associative<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Inserts a pair, returning the value previously stored under `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.map.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.map.keys()
    }

    /// Direct access to the underlying map.
    pub fn as_mut_map(&mut self) -> &mut BTreeMap<K, V> {
        &mut self.map
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<K, V> {
        self.map
    }
}

impl<K: Ord, V> From<BTreeMap<K, V>> for Associative<K, V> {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self { map }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Associative<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

impl<K, V> Syncable for Associative<K, V>
where
    K: Field + Default + Ord + Clone,
    V: Field + Default,
{
    fn save(&mut self, node: &mut Value) -> SyncResult<()> {
        let mut array = Vec::with_capacity(self.map.len());
        for (key, value) in &mut self.map {
            // Map keys are immutable in place; save a copy.
            let mut key = key.clone();
            let mut key_node = Value::Null;
            key.save_field(&mut key_node)?;

            let mut value_node = Value::Null;
            value.save_field(&mut value_node)?;

            let mut pair = Map::new();
            pair.insert(KEY.to_string(), key_node);
            pair.insert(VALUE.to_string(), value_node);
            array.push(Value::Object(pair));
        }
        debug!(pairs = array.len(), "saved associative");
        *node = Value::Array(array);
        Ok(())
    }

    fn load(&mut self, node: &Value) -> SyncResult<()> {
        let pairs = document::expect_array(node)?;
        self.map.clear();
        for pair in pairs {
            let mut key = K::default();
            key.load_field(document::member(pair, KEY)?)?;

            let mut value = V::default();
            value.load_field(document::member(pair, VALUE)?)?;

            if self.map.insert(key, value).is_some() {
                debug!("duplicate key in associative document, keeping the later pair");
            }
        }
        debug!(pairs = self.map.len(), "loaded associative");
        Ok(())
    }
}
