//! Save file serialization.
//!
//! This module holds two serializers:
//!
//! - [`Serializer`] renders a [`Document`] (or a single [`Value`]) as save
//!   file text
//! - [`ValueSerializer`] is a serde serializer that turns any `T: Serialize`
//!   into a [`Value`]
//!
//! ## Rendering Rules
//!
//! - Every composite element is followed by `,`, including the last one:
//!   `({1,2,3,})`
//! - Mapping entries render as `key:v1;v2,`
//! - Floats always carry a fractional part (`1.0`), so they read back as floats
//! - References are expanded to the value they point at on every occurrence
//!
//! ```rust
//! use serde_lpc::{DumpOptions, Serializer, Value};
//!
//! let mut serializer = Serializer::new(DumpOptions::default());
//! serializer
//!     .serialize_value(&Value::Array(vec![Value::from(1), Value::from(2.0)]))
//!     .unwrap();
//! assert_eq!(serializer.into_inner(), "({1,2.0,})");
//! ```

use crate::escape::escape;
use crate::parser::HEADER;
use crate::value::Reference;
use crate::{Document, DumpOptions, Error, Mapping, Number, Record, Result, Value};
use num_bigint::BigInt;
use serde::{ser, Serialize};
use tracing::debug;

/// Renders values as save file text.
pub struct Serializer {
    output: String,
    options: DumpOptions,
    /// Ids of the references currently being expanded, innermost last.
    expanding: Vec<u64>,
}

impl Serializer {
    pub fn new(options: DumpOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
            expanding: Vec::new(),
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes the header line followed by one line per binding.
    ///
    /// # Errors
    ///
    /// [`Error::Encode`] for variable names that are not identifiers and for
    /// unrenderable values, plus any error raised while resolving references.
    pub fn serialize_document(&mut self, document: &Document) -> Result<()> {
        self.output.push_str(HEADER);
        self.output.push('\n');
        for (name, value) in document {
            if !is_identifier(name) {
                return Err(Error::encode(format!("variable name {:?}", name)));
            }
            self.output.push_str(name);
            self.output.push_str(self.options.separator.as_str());
            self.serialize_value(value)?;
            self.output.push('\n');
        }
        debug!(
            variables = document.len(),
            bytes = self.output.len(),
            "rendered save file"
        );
        Ok(())
    }

    /// Writes a single value.
    ///
    /// # Errors
    ///
    /// [`Error::Encode`] for non-finite floats, closure symbols that are not
    /// identifiers and mapping entries without values;
    /// [`Error::CyclicReference`] when a reference expands into itself.
    pub fn serialize_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Number(Number::Float(f)) if !f.is_finite() => {
                Err(Error::encode(format!("non-finite float {}", f)))
            }
            Value::Number(n) => {
                self.output.push_str(&n.to_string());
                Ok(())
            }
            Value::String(s) => {
                self.write_string(s);
                Ok(())
            }
            Value::Closure(symbol) => {
                if !is_identifier(symbol) {
                    return Err(Error::encode(format!("closure symbol {:?}", symbol)));
                }
                self.output.push_str("#'");
                self.output.push_str(symbol);
                Ok(())
            }
            Value::Array(elements) => {
                self.output.push_str("({");
                self.write_elements(elements)?;
                self.output.push_str("})");
                Ok(())
            }
            Value::Mapping(mapping) => self.write_mapping(mapping),
            Value::Struct(record) => self.write_record("(<", record, ">)"),
            Value::LwObject(record) => self.write_record("(*", record, "*)"),
            Value::Reference(reference) => self.write_reference(reference),
        }
    }

    fn write_string(&mut self, s: &str) {
        self.output.push('"');
        self.output.push_str(&escape(s));
        self.output.push('"');
    }

    fn write_elements(&mut self, elements: &[Value]) -> Result<()> {
        for element in elements {
            self.serialize_value(element)?;
            self.output.push(',');
        }
        Ok(())
    }

    fn write_mapping(&mut self, mapping: &Mapping) -> Result<()> {
        self.output.push_str("([");
        for (key, values) in mapping.iter() {
            if values.is_empty() {
                return Err(Error::encode("mapping entry without values"));
            }
            self.serialize_value(key)?;
            self.output.push(':');
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    self.output.push(';');
                }
                self.serialize_value(value)?;
            }
            self.output.push(',');
        }
        self.output.push_str("])");
        Ok(())
    }

    fn write_record(&mut self, open: &str, record: &Record, close: &str) -> Result<()> {
        self.output.push_str(open);
        self.write_string(record.name());
        self.output.push(',');
        self.write_elements(record.fields())?;
        self.output.push_str(close);
        Ok(())
    }

    fn write_reference(&mut self, reference: &Reference) -> Result<()> {
        let id = reference.id();
        if self.expanding.contains(&id) {
            return Err(Error::CyclicReference { id });
        }
        let target = reference.resolve()?;
        self.expanding.push(id);
        let result = self.serialize_value(&target);
        self.expanding.pop();
        result
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, the shape of variable names and closure symbols.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

/// Serde serializer producing [`Value`]s.
///
/// | Rust | Value |
/// |------|-------|
/// | integers | `Number::Integer`, or `Number::BigInt` beyond 64 bits |
/// | `f32`, `f64` | `Number::Float` |
/// | `bool` | integer `1` / `0` |
/// | `()`, `None`, unit structs | integer `0` |
/// | `char`, `&str`, `String` | `String` |
/// | bytes, sequences, tuples | `Array` |
/// | maps, structs | `Mapping` with one value per key |
/// | tuple structs | `Struct` named after the Rust type |
/// | enum variants | `String` for unit variants, otherwise a one-entry `Mapping` |
pub struct ValueSerializer;

enum SeqKind {
    Array,
    TupleStruct(&'static str),
    TupleVariant(&'static str),
}

pub struct SerializeVec {
    vec: Vec<Value>,
    kind: SeqKind,
}

pub struct SerializeMap {
    map: Mapping,
    current_key: Option<Value>,
    variant: Option<&'static str>,
}

/// Wraps `value` in a one-entry mapping keyed by the variant name.
fn tagged(variant: &'static str, value: Value) -> Value {
    let mut map = Mapping::with_capacity(1);
    map.insert(Value::from(variant), vec![value]);
    Value::Mapping(map)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(BigInt::from(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(BigInt::from(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::default())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::default())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::default())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(SeqKind::Array, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(SeqKind::Array, len))
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(SeqKind::TupleStruct(name), len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(SeqKind::TupleVariant(variant), len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(kind: SeqKind, capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            kind,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        match self.kind {
            SeqKind::Array => Value::Array(self.vec),
            SeqKind::TupleStruct(name) => Value::Struct(Record::new(name, self.vec)),
            SeqKind::TupleVariant(variant) => tagged(variant, Value::Array(self.vec)),
        }
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: Mapping::new(),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Value {
        let value = Value::Mapping(self.map);
        match self.variant {
            Some(variant) => tagged(variant, value),
            None => value,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(to_value(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, vec![to_value(value)?]);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(Value::from(key), vec![to_value(value)?]);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(Value::from(key), vec![to_value(value)?]);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

/// Converts any `T: Serialize` into a [`Value`].
///
/// # Errors
///
/// Returns an error if `T`'s `Serialize` implementation fails.
pub fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

/// Converts any `T: Serialize` that serializes as a map or struct into a
/// [`Document`], one variable per key.
///
/// # Errors
///
/// Fails if `T` does not serialize to a mapping, or a key is not a string
/// that is valid as a variable name.
pub fn to_document<T: ?Sized + Serialize>(value: &T) -> Result<Document> {
    let mapping = match to_value(value)? {
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(Error::custom(format!(
                "a document must serialize as a map or struct, found {}",
                other.kind()
            )))
        }
    };

    let mut document = Document::new();
    for (key, values) in mapping {
        let name = match key {
            Value::String(name) if is_identifier(&name) => name,
            other => return Err(Error::encode(format!("variable name {:?}", other))),
        };
        let value = match <[Value; 1]>::try_from(values) {
            Ok([value]) => value,
            Err(values) => Value::Array(values),
        };
        document.insert(name, value);
    }
    Ok(document)
}
