//! The in-memory form of a whole save file.
//!
//! A [`Document`] is an ordered set of `name -> value` bindings together with
//! the anchor table its back-references resolve against. Every load builds a
//! fresh document with its own table; nothing is shared between loads.
//!
//! ## Examples
//!
//! ```rust
//! use serde_lpc::{dump, Document, Value};
//!
//! let mut doc = Document::new();
//! doc.insert("name", Value::from("simple"));
//! doc.insert("level", Value::from(3));
//!
//! assert_eq!(dump(&doc).unwrap(), "#3:2\nname \"simple\"\nlevel 3\n");
//! ```

use crate::value::{RefTable, Reference};
use crate::{Result, Value};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::rc::Rc;

/// Ordered variable bindings of one save file plus its anchor table.
///
/// Cloning a document shares the anchor table between the clones.
#[derive(Clone, Debug, Default)]
pub struct Document {
    vars: IndexMap<String, Value>,
    refs: Rc<RefTable>,
}

impl Document {
    /// Creates an empty document with an empty anchor table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(vars: IndexMap<String, Value>, refs: Rc<RefTable>) -> Self {
        Document { vars, refs }
    }

    /// Binds `name` to `value`. An existing binding keeps its position and
    /// its old value is returned.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.vars.insert(name.into(), value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.vars.get_mut(name)
    }

    /// Removes a binding, preserving the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.shift_remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Bindings in file order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.vars.iter()
    }

    /// Variable names in file order.
    pub fn names(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.vars.keys()
    }

    /// The anchor table back-references of this document resolve against.
    #[must_use]
    pub fn anchors(&self) -> &RefTable {
        &self.refs
    }

    /// Anchors `value` under `id`, returning the value previously anchored there.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lpc::{Document, Value};
    ///
    /// let mut doc = Document::new();
    /// let shared = doc.reference(1);
    /// doc.anchor(1, Value::from("shared"));
    /// assert_eq!(doc.resolve(&shared).unwrap(), Value::from("shared"));
    /// ```
    pub fn anchor(&mut self, id: u64, value: Value) -> Option<Value> {
        self.refs.insert(id, value)
    }

    /// Creates a back-reference bound to this document's anchor table. The
    /// anchor does not need to exist yet.
    #[must_use]
    pub fn reference(&self, id: u64) -> Value {
        Value::Reference(Reference::new(id, &self.refs))
    }

    /// Follows references until a non-reference value is reached; other
    /// values are returned as they are.
    ///
    /// # Errors
    ///
    /// See [`Reference::resolve_fully`].
    pub fn resolve(&self, value: &Value) -> Result<Value> {
        value.resolved()
    }
}

impl PartialEq for Document {
    /// Documents are equal when their bindings are; anchor tables are compared
    /// only through the references that use them.
    fn eq(&self, other: &Self) -> bool {
        self.vars == other.vars
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

impl FromIterator<(String, Value)> for Document {
    /// Collects bindings; a repeated name keeps its first position and its
    /// last value.
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Document::from_parts(iter.into_iter().collect(), RefTable::new())
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.vars.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_insert_keeps_position() {
        let mut doc = Document::new();
        doc.insert("a", Value::from(1));
        doc.insert("b", Value::from(2));
        assert_eq!(doc.insert("a", Value::from(3)), Some(Value::from(1)));

        let names: Vec<_> = doc.names().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&Value::from(3)));
    }

    #[test]
    fn test_remove_and_mutate() {
        let mut doc: Document = vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2)),
            ("c".to_string(), Value::from(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(doc.remove("b"), Some(Value::from(2)));
        if let Some(value) = doc.get_mut("c") {
            *value = Value::from("changed");
        }
        let names: Vec<_> = doc.names().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(doc.get("c").and_then(Value::as_str), Some("changed"));
    }

    #[test]
    fn test_reference_is_lazy() {
        let mut doc = Document::new();
        let reference = doc.reference(4);
        assert_eq!(
            doc.resolve(&reference),
            Err(Error::UnresolvedReference { id: 4 })
        );
        doc.anchor(4, Value::from(1.5));
        assert_eq!(doc.resolve(&reference), Ok(Value::from(1.5)));
        assert_eq!(doc.anchors().ids(), vec![4]);
    }

    #[test]
    fn test_documents_do_not_share_anchors() {
        let mut first = Document::new();
        first.anchor(1, Value::from("first"));
        let second = Document::new();
        assert!(second.anchors().is_empty());
        assert_eq!(
            second.resolve(&second.reference(1)),
            Err(Error::UnresolvedReference { id: 1 })
        );
    }
}
