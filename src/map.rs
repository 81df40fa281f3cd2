//! Ordered mapping type for LPC mappings.
//!
//! This module provides [`Mapping`]. LPC mappings differ from JSON objects in
//! two ways:
//!
//! - **Any value can be a key**: integers, floats, strings, arrays and so on.
//!   Keys are compared with `==`, so lookup never needs the key to be hashable.
//! - **Several values per key**: a mapping of width 3 stores three values for
//!   every key (`"k":v1;v2;v3` in the text).
//!
//! Entries keep the order in which their keys were first inserted. Inserting an
//! existing key replaces its values in place, so when a save file repeats a key
//! the last definition wins while the entry keeps its original position.
//!
//! ## Examples
//!
//! ```rust
//! use serde_lpc::{Mapping, Value};
//!
//! let mut map = Mapping::new();
//! map.insert(Value::from("hp"), vec![Value::from(10), Value::from(20)]);
//! map.insert(Value::from(7), vec![Value::from("lucky")]);
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get(&Value::from("hp")).map(|v| v.len()), Some(2));
//! assert_eq!(map.get_first(&Value::from(7)).and_then(|v| v.as_str()), Some("lucky"));
//! ```

use crate::Value;

/// An ordered list of `key -> values` entries with equality-based lookup.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::{Mapping, Value};
///
/// let mut map = Mapping::new();
/// map.insert(Value::from("first"), vec![Value::from(1)]);
/// map.insert(Value::from("second"), vec![Value::from(2)]);
///
/// // Iteration maintains insertion order
/// let keys: Vec<_> = map.keys().filter_map(|k| k.as_str()).collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping(Vec<(Value, Vec<Value>)>);

impl Mapping {
    /// Creates an empty `Mapping`.
    #[must_use]
    pub fn new() -> Self {
        Mapping(Vec::new())
    }

    /// Creates an empty `Mapping` with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Mapping(Vec::with_capacity(capacity))
    }

    /// Inserts an entry. If the key is already present its values are
    /// replaced (keeping the entry's position) and the old values are returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lpc::{Mapping, Value};
    ///
    /// let mut map = Mapping::new();
    /// assert!(map.insert(Value::from("k"), vec![Value::from(1)]).is_none());
    /// assert!(map.insert(Value::from("k"), vec![Value::from(2)]).is_some());
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: Value, values: Vec<Value>) -> Option<Vec<Value>> {
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.0[index].1, values)),
            None => {
                self.0.push((key, values));
                None
            }
        }
    }

    /// Returns the values stored under `key`.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&[Value]> {
        self.position(key).map(|index| self.0[index].1.as_slice())
    }

    /// Returns the values stored under `key` for in-place modification.
    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Vec<Value>> {
        self.position(key).map(move |index| &mut self.0[index].1)
    }

    /// Returns the first value stored under `key`; for the common
    /// single-value mapping this is the value.
    #[must_use]
    pub fn get_first(&self, key: &Value) -> Option<&Value> {
        self.get(key).and_then(|values| values.first())
    }

    /// Looks up a string key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&[Value]> {
        self.0
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, values)| values.as_slice())
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    /// Removes an entry, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &Value) -> Option<Vec<Value>> {
        self.position(key).map(|index| self.0.remove(index).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(k, _)| k)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &[Value])> {
        self.0.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Entries in insertion order, with mutable access to the values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Value, &mut Vec<Value>)> {
        self.0.iter_mut().map(|(k, v)| (&*k, v))
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.0.iter().position(|(k, _)| k == key)
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Vec<Value>);
    type IntoIter = std::vec::IntoIter<(Value, Vec<Value>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(Value, Vec<Value>)> for Mapping {
    /// Collects entries; repeated keys collapse to their last values.
    fn from_iter<T: IntoIterator<Item = (Value, Vec<Value>)>>(iter: T) -> Self {
        let mut mapping = Mapping::new();
        for (key, values) in iter {
            mapping.insert(key, values);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_insert_wins_in_place() {
        let mut map = Mapping::new();
        map.insert(Value::from("a"), vec![Value::from(1)]);
        map.insert(Value::from("b"), vec![Value::from(2)]);
        map.insert(Value::from("a"), vec![Value::from(3)]);

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, &Value::from("a"));
        assert_eq!(entries[0].1, &[Value::from(3)][..]);
    }

    #[test]
    fn test_non_string_keys() {
        let mut map = Mapping::new();
        let key = Value::Array(vec![Value::from(1), Value::from(2)]);
        map.insert(key.clone(), vec![Value::from("pair")]);
        map.insert(Value::from(1.5), vec![Value::from("float")]);

        assert_eq!(map.get_first(&key), Some(&Value::from("pair")));
        assert_eq!(map.get_first(&Value::from(1.5)), Some(&Value::from("float")));
        assert_eq!(map.get(&Value::from(1)), None);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map: Mapping = (1..=3)
            .map(|i| (Value::from(i), vec![Value::from(i * 10)]))
            .collect();
        assert_eq!(map.remove(&Value::from(2)), Some(vec![Value::from(20)]));
        let keys: Vec<_> = map.keys().filter_map(Value::as_i64).collect();
        assert_eq!(keys, vec![1, 3]);
    }

    #[test]
    fn test_get_str_and_mut() {
        let mut map = Mapping::new();
        map.insert(Value::from("name"), vec![Value::from("bob")]);
        if let Some(values) = map.get_mut(&Value::from("name")) {
            values.push(Value::from("alice"));
        }
        assert_eq!(map.get_str("name").map(<[Value]>::len), Some(2));
        assert!(map.contains_key(&Value::from("name")));
    }
}
