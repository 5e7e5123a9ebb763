//! Ordered map type for canopy tables.
//!
//! [`Table`] is a thin wrapper around `BTreeMap<Key, Value>`. The format
//! defines one canonical entry order, ascending by key byte value, and a
//! B-tree map gives exactly that, so printing is deterministic without any
//! sort step.

use crate::key::Key;
use crate::value::Value;
use std::collections::btree_map::{self, BTreeMap};

/// A string-keyed, byte-ordered map of [`Value`]s.
///
/// Keys are [`Key`]s (validated identifiers) and lookups take plain
/// `&str`, so callers never construct a `Key` just to probe.
///
/// # Examples
///
/// ```rust
/// use canopy::{Key, Table, Value};
///
/// let mut t = Table::new();
/// t.insert(Key::new("name").unwrap(), Value::from("fred"));
///
/// assert_eq!(t.get("name").and_then(|v| v.as_str()), Some("fred"));
/// assert_eq!(t.get("missing"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table(BTreeMap<Key, Value>);

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Table(BTreeMap::new())
    }

    /// Inserts a key-value pair, returning the previous value if any.
    pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Looks up a value by key text.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Mutable lookup by key text.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// The slot for `key`, inserting an empty [`Value::None`] if absent.
    ///
    /// This is what dotted-key assignment descends through: `a.b.c = v`
    /// materializes intermediate tables one slot at a time.
    pub fn slot(&mut self, key: Key) -> &mut Value {
        self.0.entry(key).or_default()
    }

    /// Removes an entry, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// True if `key` has an entry.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in canonical (byte) key order.
    pub fn iter(&self) -> btree_map::Iter<'_, Key, Value> {
        self.0.iter()
    }

    /// Mutable iteration in canonical key order.
    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, Key, Value> {
        self.0.iter_mut()
    }

    /// Iterates keys in canonical order.
    pub fn keys(&self) -> btree_map::Keys<'_, Key, Value> {
        self.0.keys()
    }

    /// Iterates values in canonical key order.
    pub fn values(&self) -> btree_map::Values<'_, Key, Value> {
        self.0.values()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl IntoIterator for Table {
    type Item = (Key, Value);
    type IntoIter = btree_map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a Key, &'a Value);
    type IntoIter = btree_map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Key, Value)> for Table {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Table(iter.into_iter().collect())
    }
}

impl Extend<(Key, Value)> for Table {
    fn extend<I: IntoIterator<Item = (Key, Value)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
