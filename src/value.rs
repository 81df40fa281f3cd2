//! Dynamic value representation for LPC save file data.
//!
//! This module provides the [`Value`] enum, a closed set of variants covering
//! every construct the save file grammar can produce.
//!
//! ## Core Types
//!
//! - [`Value`]: number, string, closure, array, mapping, struct, lightweight object
//!   or back-reference
//! - [`Number`]: 64-bit integer, arbitrary-width integer or double
//! - [`Record`]: the positional, mutable body shared by structs and lightweight objects
//! - [`Reference`]: a lazy handle to a value anchored elsewhere in the same document
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use serde_lpc::{Record, Value};
//!
//! let number = Value::from(42);
//! let text = Value::from("hello");
//! let array = Value::Array(vec![Value::from(1), Value::from(2)]);
//! let record = Value::Struct(Record::new("point", vec![Value::from(1), Value::from(2)]));
//! ```
//!
//! ### Type Checking and Extraction
//!
//! ```rust
//! use serde_lpc::Value;
//!
//! let value = Value::from(2.5);
//! assert!(value.is_float());
//! assert_eq!(value.as_f64(), Some(2.5));
//! assert_eq!(value.as_str(), None);
//! ```
//!
//! ### Mutating Records In Place
//!
//! ```rust
//! use serde_lpc::{Record, Value};
//!
//! let mut record = Record::new("player", vec![Value::from("bob"), Value::from(10)]);
//! record[1] = Value::from(11);
//! assert_eq!(record[1].as_i64(), Some(11));
//! ```

use crate::{Error, Mapping, Result};
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::RefCell;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::rc::{Rc, Weak};

/// A dynamically-typed representation of any value a save file can hold.
///
/// Dispatch over values is always an exhaustive `match`, so adding a variant is
/// a compile-time checked change for the loader and the serializer alike.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::{Number, Value};
///
/// let num = Value::Number(Number::Integer(42));
/// let closure = Value::Closure("query_name".to_string());
///
/// assert!(num.is_integer());
/// assert!(closure.is_closure());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(Number),
    String(String),
    /// Symbol of a named callable, stored without the `#'` marker.
    Closure(String),
    Array(Vec<Value>),
    Mapping(Mapping),
    Struct(Record),
    LwObject(Record),
    Reference(Reference),
}

impl Default for Value {
    /// The LPC zero value.
    fn default() -> Self {
        Value::Number(Number::Integer(0))
    }
}

/// A numeric value.
///
/// Integer lexemes that fit in 64 bits load as [`Number::Integer`], longer ones
/// as [`Number::BigInt`]. Lexemes containing `.`, `e` or `E` load as
/// [`Number::Float`].
///
/// # Examples
///
/// ```rust
/// use serde_lpc::Number;
///
/// assert!(Number::Integer(42).is_integer());
/// assert!(Number::Float(1.0).is_float());
/// assert_eq!(Number::Float(1.0).to_string(), "1.0");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    BigInt(BigInt),
    Float(f64),
}

impl Number {
    /// Returns `true` for both integer representations.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::BigInt(_))
    }

    /// Returns `true` if this is a floating-point value.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Converts this number to an `i64` if it is an integer in range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lpc::Number;
    ///
    /// assert_eq!(Number::Integer(7).as_i64(), Some(7));
    /// assert_eq!(Number::Float(7.0).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::BigInt(bi) => i64::try_from(bi).ok(),
            Number::Float(_) => None,
        }
    }

    /// Converts this number to an `f64`, possibly losing precision.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::BigInt(bi) => bi.to_string().parse().unwrap_or(f64::NAN),
            Number::Float(f) => *f,
        }
    }

    /// Normalizes a big integer into [`Number::Integer`] when it fits.
    #[must_use]
    pub fn from_bigint(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(i) => Number::Integer(i),
            Err(_) => Number::BigInt(value),
        }
    }
}

impl fmt::Display for Number {
    /// Formats the number the way it appears in a save file. Finite floats
    /// always carry a fractional part so they read back as floats.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::BigInt(bi) => write!(f, "{}", bi),
            Number::Float(fl) => {
                let text = fl.to_string();
                if fl.is_finite() && !text.contains(['.', 'e', 'E']) {
                    write!(f, "{}.0", text)
                } else {
                    f.write_str(&text)
                }
            }
        }
    }
}

macro_rules! number_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(i64::from(value))
                }
            }
        )*
    };
}

number_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Number::Integer(i),
            Err(_) => Number::BigInt(BigInt::from(value)),
        }
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::from_bigint(value)
    }
}

/// The body of a struct or lightweight object: a description string followed
/// by positional fields.
///
/// Fields are addressed by index and can be replaced in place; their count and
/// meaning are defined by whoever wrote the data.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Record {
    name: String,
    fields: Vec<Value>,
}

impl Record {
    /// Creates a record with the given description and fields.
    pub fn new(name: impl Into<String>, fields: Vec<Value>) -> Self {
        Record {
            name: name.into(),
            fields,
        }
    }

    /// The description (struct) or class name (lightweight object).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Vec<Value> {
        &mut self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.fields.get_mut(index)
    }

    /// Replaces the field at `index`, returning the previous value, or `None`
    /// (leaving the record untouched) when the index is out of bounds.
    pub fn set(&mut self, index: usize, value: Value) -> Option<Value> {
        self.fields
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn push(&mut self, value: Value) {
        self.fields.push(value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.fields.iter()
    }

    /// Splits the record into its name and fields.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.name, self.fields)
    }
}

impl Index<usize> for Record {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.fields[index]
    }
}

impl IndexMut<usize> for Record {
    fn index_mut(&mut self, index: usize) -> &mut Value {
        &mut self.fields[index]
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Anchored values of one document, keyed by back-reference id.
///
/// A table is created fresh for every load and is owned by the resulting
/// [`Document`](crate::Document); [`Reference`] values only hold a weak handle to it.
#[derive(Debug, Default)]
pub struct RefTable {
    anchors: RefCell<IndexMap<u64, Value>>,
}

impl RefTable {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(RefTable::default())
    }

    /// Records `value` under `id`, returning the value it replaced.
    pub(crate) fn insert(&self, id: u64, value: Value) -> Option<Value> {
        self.anchors.borrow_mut().insert(id, value)
    }

    /// Returns a copy of the value anchored under `id`.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<Value> {
        self.anchors.borrow().get(&id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.anchors.borrow().contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.borrow().is_empty()
    }

    /// Anchored ids in the order they were first anchored.
    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        self.anchors.borrow().keys().copied().collect()
    }
}

/// A back-reference `<id>` whose value is looked up on demand.
///
/// The lookup happens in the anchor table of the document the reference was
/// loaded into, so the anchor may appear before or after the reference in the
/// text. Two references compare equal when their ids are equal.
#[derive(Clone)]
pub struct Reference {
    id: u64,
    table: Weak<RefTable>,
}

impl Reference {
    pub(crate) fn new(id: u64, table: &Rc<RefTable>) -> Self {
        Reference {
            id,
            table: Rc::downgrade(table),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Looks up the anchored value.
    ///
    /// The result can itself be a reference when the anchor was a bare
    /// back-reference (`<1>=<2>`).
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedReference`] if no anchor defines the id, and
    /// [`Error::DetachedReference`] if the owning document was dropped.
    pub fn resolve(&self) -> Result<Value> {
        let table = self
            .table
            .upgrade()
            .ok_or(Error::DetachedReference { id: self.id })?;
        table
            .get(self.id)
            .ok_or(Error::UnresolvedReference { id: self.id })
    }

    /// Follows a chain of references until a non-reference value is reached.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`Reference::resolve`], returns
    /// [`Error::CyclicReference`] when the chain loops.
    pub fn resolve_fully(&self) -> Result<Value> {
        let mut seen = vec![self.id];
        let mut current = self.resolve()?;
        while let Value::Reference(next) = &current {
            if seen.contains(&next.id) {
                return Err(Error::CyclicReference { id: next.id });
            }
            seen.push(next.id);
            current = next.resolve()?;
        }
        Ok(current)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reference").field(&self.id).finish()
    }
}

impl Value {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Number(Number::Float(_)) => "float",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Closure(_) => "closure",
            Value::Array(_) => "array",
            Value::Mapping(_) => "mapping",
            Value::Struct(_) => "struct",
            Value::LwObject(_) => "lightweight object",
            Value::Reference(_) => "reference",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_integer())
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Number(Number::Float(_)))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_closure(&self) -> bool {
        matches!(self, Value::Closure(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self, Value::Struct(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_lwobject(&self) -> bool {
        matches!(self, Value::LwObject(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Value::Reference(_))
    }

    /// If the value is an integer that fits in 64 bits, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lpc::Value;
    ///
    /// assert_eq!(Value::from(42).as_i64(), Some(42));
    /// assert_eq!(Value::from("42").as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// If the value is a number, returns it as an `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a closure, returns its symbol (without `#'`).
    #[inline]
    #[must_use]
    pub fn as_closure(&self) -> Option<&str> {
        match self {
            Value::Closure(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_struct(&self) -> Option<&Record> {
        match self {
            Value::Struct(record) => Some(record),
            _ => None,
        }
    }

    #[inline]
    pub fn as_struct_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Struct(record) => Some(record),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_lwobject(&self) -> Option<&Record> {
        match self {
            Value::LwObject(record) => Some(record),
            _ => None,
        }
    }

    #[inline]
    pub fn as_lwobject_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::LwObject(record) => Some(record),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the value itself, or for a reference the value its anchor chain
    /// ends in.
    ///
    /// # Errors
    ///
    /// See [`Reference::resolve_fully`].
    pub fn resolved(&self) -> Result<Value> {
        match self {
            Value::Reference(r) => r.resolve_fully(),
            other => Ok(other.clone()),
        }
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, BigInt);

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    /// LPC has no boolean type; truth values are the integers 1 and 0.
    fn from(value: bool) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| Error::custom(format!("cannot convert {} to i64", n))),
            other => Err(Error::custom(format!(
                "expected integer, found {}",
                other.kind()
            ))),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(Error::custom(format!(
                "expected number, found {}",
                other.kind()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::custom(format!(
                "expected string, found {}",
                other.kind()
            ))),
        }
    }
}

impl Serialize for Value {
    /// References are exported as the value they point at. A reference met
    /// again while its own target is being exported fails with
    /// [`Error::CyclicReference`].
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Expanded {
            value: self,
            expanding: &[],
        }
        .serialize(serializer)
    }
}

/// A value being exported, with the ids of the references currently being
/// expanded above it, innermost last.
struct Expanded<'a> {
    value: &'a Value,
    expanding: &'a [u64],
}

/// The values of one mapping entry or the fields of a record.
struct ExpandedSeq<'a> {
    values: &'a [Value],
    expanding: &'a [u64],
}

impl<'a> Expanded<'a> {
    fn child(&self, value: &'a Value) -> Self {
        Expanded {
            value,
            expanding: self.expanding,
        }
    }

    fn seq(&self, values: &'a [Value]) -> ExpandedSeq<'a> {
        ExpandedSeq {
            values,
            expanding: self.expanding,
        }
    }
}

impl Serialize for Expanded<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{Error as _, SerializeMap, SerializeStruct};

        match self.value {
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::BigInt(bi)) => match i128::try_from(bi) {
                Ok(i) => serializer.serialize_i128(i),
                Err(_) => serializer.serialize_str(&bi.to_string()),
            },
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Closure(name) => serializer.serialize_str(&format!("#'{}", name)),
            Value::Array(arr) => self.seq(arr).serialize(serializer),
            Value::Mapping(mapping) => {
                let mut map = serializer.serialize_map(Some(mapping.len()))?;
                for (key, values) in mapping.iter() {
                    match values {
                        [single] => map.serialize_entry(&self.child(key), &self.child(single))?,
                        many => map.serialize_entry(&self.child(key), &self.seq(many))?,
                    }
                }
                map.end()
            }
            Value::Struct(record) | Value::LwObject(record) => {
                let mut state = serializer.serialize_struct("Record", 2)?;
                state.serialize_field("name", record.name())?;
                state.serialize_field("fields", &self.seq(record.fields()))?;
                state.end()
            }
            Value::Reference(r) => {
                let id = r.id();
                if self.expanding.contains(&id) {
                    return Err(S::Error::custom(Error::CyclicReference { id }));
                }
                let target = r.resolve().map_err(S::Error::custom)?;
                let mut expanding = self.expanding.to_vec();
                expanding.push(id);
                Expanded {
                    value: &target,
                    expanding: &expanding,
                }
                .serialize(serializer)
            }
        }
    }
}

impl Serialize for ExpandedSeq<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.values.len()))?;
        for value in self.values {
            seq.serialize_element(&Expanded {
                value,
                expanding: self.expanding,
            })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any value representable in an LPC save file")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Value, E> {
                Ok(Value::from(BigInt::from(value)))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Value, E> {
                Ok(Value::from(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::default())
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::default())
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut mapping = Mapping::new();
                while let Some((key, value)) = map.next_entry::<Value, Value>()? {
                    mapping.insert(key, vec![value]);
                }
                Ok(Value::Mapping(mapping))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_display_keeps_fraction() {
        assert_eq!(Number::Float(2.2).to_string(), "2.2");
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(-0.0).to_string(), "-0.0");
        assert_eq!(Number::Float(1e300).to_string().parse::<f64>().unwrap(), 1e300);
        assert!(Number::Float(1e300).to_string().ends_with(".0"));
    }

    #[test]
    fn test_bigint_normalization() {
        assert_eq!(Number::from_bigint(BigInt::from(5)), Number::Integer(5));
        let big: BigInt = "123456789012345678901234567890".parse().unwrap();
        assert!(matches!(Number::from_bigint(big.clone()), Number::BigInt(_)));
        assert_eq!(Number::from(u64::MAX), Number::BigInt(BigInt::from(u64::MAX)));
        assert_eq!(Number::from_bigint(big).as_i64(), None);
    }

    #[test]
    fn test_record_index_access() {
        let mut record = Record::new("pos", vec![Value::from(1), Value::from(2)]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.name(), "pos");
        record[0] = Value::from("x");
        assert_eq!(record[0], Value::from("x"));
        assert_eq!(record.set(1, Value::from(3)), Some(Value::from(2)));
        assert_eq!(record.set(5, Value::from(3)), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_struct_and_lwobject_are_distinct() {
        let record = Record::new("obj", vec![]);
        assert_ne!(Value::Struct(record.clone()), Value::LwObject(record));
    }

    #[test]
    fn test_reference_resolution() {
        let table = RefTable::new();
        let reference = Reference::new(1, &table);
        assert_eq!(
            reference.resolve(),
            Err(Error::UnresolvedReference { id: 1 })
        );
        table.insert(1, Value::from("shared"));
        assert_eq!(reference.resolve(), Ok(Value::from("shared")));
    }

    #[test]
    fn test_reference_detached_after_drop() {
        let table = RefTable::new();
        let reference = Reference::new(3, &table);
        drop(table);
        assert_eq!(
            reference.resolve(),
            Err(Error::DetachedReference { id: 3 })
        );
    }

    #[test]
    fn test_reference_chain_and_cycle() {
        let table = RefTable::new();
        table.insert(1, Value::Reference(Reference::new(2, &table)));
        table.insert(2, Value::from(9));
        assert_eq!(Reference::new(1, &table).resolve_fully(), Ok(Value::from(9)));

        table.insert(2, Value::Reference(Reference::new(1, &table)));
        assert_eq!(
            Reference::new(1, &table).resolve_fully(),
            Err(Error::CyclicReference { id: 1 })
        );
    }

    #[test]
    fn test_serialize_expands_shared_reference() {
        let table = RefTable::new();
        table.insert(1, Value::from("shared"));
        let value = Value::Array(vec![
            Value::Reference(Reference::new(1, &table)),
            Value::Reference(Reference::new(1, &table)),
        ]);
        assert_eq!(
            crate::to_value(&value).unwrap(),
            Value::Array(vec![Value::from("shared"), Value::from("shared")])
        );
    }

    #[test]
    fn test_serialize_cycle_is_an_error() {
        let table = RefTable::new();
        let node = Value::Struct(Record::new(
            "node",
            vec![Value::from("root"), Value::Reference(Reference::new(1, &table))],
        ));
        table.insert(1, node.clone());

        match crate::to_value(&node) {
            Err(Error::Custom(msg)) => assert!(msg.contains("<1>"), "{}", msg),
            other => panic!("expected a cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_bool_is_integer() {
        assert_eq!(Value::from(true), Value::from(1));
        assert_eq!(Value::from(false), Value::default());
    }

    #[test]
    fn test_try_from() {
        assert_eq!(i64::try_from(Value::from(5)).unwrap(), 5);
        assert_eq!(f64::try_from(Value::from(5)).unwrap(), 5.0);
        assert!(String::try_from(Value::from(5)).is_err());
    }
}
