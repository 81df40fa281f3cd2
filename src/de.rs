//! Deserializing Rust types from [`Value`]s.
//!
//! Text is turned into values by the [`loader`](crate::loader); this module
//! maps those values onto `T: Deserialize`.
//!
//! | Value | Presented to serde as |
//! |-------|-----------------------|
//! | `Number::Integer` | `i64` (also `bool` and `Option`: zero is false / `None`) |
//! | `Number::BigInt` | the narrowest of `i64`, `u64`, `i128` that fits, otherwise its decimal string |
//! | `Number::Float` | `f64` |
//! | `String` | string, or a unit enum variant |
//! | `Closure` | string `#'symbol` |
//! | `Array` | sequence |
//! | `Mapping` | map; an entry with several values becomes a sequence |
//! | `Struct`, `LwObject` | sequence of the fields |
//! | `Reference` | the anchored value |
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_lpc::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Player { name: String, level: u32, tags: Vec<String> }
//!
//! let text = "#3:2\nname \"bob\"\nlevel 12\ntags ({\"new\",})\n";
//! let player: Player = from_str(text).unwrap();
//! assert_eq!(player.level, 12);
//! ```

use crate::value::Reference;
use crate::{Document, Error, Mapping, Number, Result, Value};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};

/// How many references may be followed along one path before giving up.
const MAX_REFERENCE_HOPS: usize = 128;

/// A serde deserializer reading from an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
    hops: usize,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value, hops: 0 }
    }

    fn child(&self, value: Value) -> Self {
        ValueDeserializer {
            value,
            hops: self.hops,
        }
    }

    fn follow(reference: &Reference, hops: usize) -> Result<Self> {
        let hops = hops + 1;
        if hops > MAX_REFERENCE_HOPS {
            return Err(Error::CyclicReference { id: reference.id() });
        }
        Ok(ValueDeserializer {
            value: reference.resolve()?,
            hops,
        })
    }
}

/// Collapses the values of one mapping entry into a single value.
fn entry_value(values: Vec<Value>) -> Value {
    match <[Value; 1]>::try_from(values) {
        Ok([value]) => value,
        Err(values) => Value::Array(values),
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let hops = self.hops;
        match self.value {
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::BigInt(bi)) => {
                if let Ok(i) = i64::try_from(&bi) {
                    visitor.visit_i64(i)
                } else if let Ok(u) = u64::try_from(&bi) {
                    visitor.visit_u64(u)
                } else if let Ok(i) = i128::try_from(&bi) {
                    visitor.visit_i128(i)
                } else {
                    visitor.visit_string(bi.to_string())
                }
            }
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Closure(symbol) => visitor.visit_string(format!("#'{}", symbol)),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr, hops)),
            Value::Mapping(map) => visitor.visit_map(MapDeserializer::new(map, hops)),
            Value::Struct(record) | Value::LwObject(record) => {
                let (_, fields) = record.into_parts();
                visitor.visit_seq(SeqDeserializer::new(fields, hops))
            }
            Value::Reference(r) => Self::follow(&r, hops)?.deserialize_any(visitor),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let hops = self.hops;
        match self.value {
            Value::Number(Number::Integer(i)) => visitor.visit_bool(i != 0),
            Value::Reference(r) => Self::follow(&r, hops)?.deserialize_bool(visitor),
            value => ValueDeserializer { value, hops }.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let hops = self.hops;
        match self.value {
            Value::Number(Number::Integer(0)) => visitor.visit_none(),
            Value::Reference(r) => Self::follow(&r, hops)?.deserialize_option(visitor),
            value => visitor.visit_some(ValueDeserializer { value, hops }),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let hops = self.hops;
        match self.value {
            Value::Number(Number::Integer(0)) => visitor.visit_unit(),
            Value::Reference(r) => Self::follow(&r, hops)?.deserialize_unit(visitor),
            value => ValueDeserializer { value, hops }.deserialize_any(visitor),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let hops = self.hops;
        match self.value {
            Value::String(variant) => visitor.visit_enum(variant.into_deserializer()),
            Value::Mapping(map) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((Value::String(variant), values)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, entry_value(values), hops))
                    }
                    _ => Err(Error::custom("expected a string variant name as mapping key")),
                }
            }
            Value::Reference(r) => {
                Self::follow(&r, hops)?.deserialize_enum(name, variants, visitor)
            }
            other => Err(Error::custom(format!(
                "expected a string or single-entry mapping for enum {}, found {}",
                name,
                other.kind()
            ))),
        }
    }

    forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf seq tuple tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
    hops: usize,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>, hops: usize) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
            hops,
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer {
                    value,
                    hops: self.hops,
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(Value, Vec<Value>)>,
    value: Option<Value>,
    hops: usize,
}

impl MapDeserializer {
    fn new(map: Mapping, hops: usize) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
            hops,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, values)) => {
                self.value = Some(entry_value(values));
                seed.deserialize(ValueDeserializer {
                    value: key,
                    hops: self.hops,
                })
                .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer {
                value,
                hops: self.hops,
            }),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: ValueDeserializer,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value, hops: usize) -> Self {
        EnumDeserializer {
            variant,
            value: ValueDeserializer { value, hops },
        }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(self.value.child(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: ValueDeserializer,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        de::Deserialize::deserialize(self.value)
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self.value)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self.value, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self.value, visitor)
    }
}

/// Deserializes a `T` from a [`Value`].
///
/// # Errors
///
/// Fails when the value's shape does not match `T`, or a reference inside it
/// cannot be resolved.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

/// Deserializes a `T` from all bindings of a document, treating variable
/// names as map keys.
///
/// # Errors
///
/// Same as [`from_value`].
pub fn from_document<T: DeserializeOwned>(document: &Document) -> Result<T> {
    let mapping: Mapping = document
        .iter()
        .map(|(name, value)| (Value::String(name.clone()), vec![value.clone()]))
        .collect();
    from_value(Value::Mapping(mapping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load, Record};
    use num_bigint::BigInt;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Position(i32, i32);

    #[derive(Deserialize, Debug, PartialEq)]
    enum Mood {
        Calm,
        Angry(u8),
        Mixed { a: u8, b: u8 },
    }

    #[test]
    fn test_scalars() {
        assert_eq!(from_value::<i32>(Value::from(-3)).unwrap(), -3);
        assert_eq!(from_value::<f64>(Value::from(2)).unwrap(), 2.0);
        assert!(from_value::<bool>(Value::from(7)).unwrap());
        assert!(!from_value::<bool>(Value::from(0)).unwrap());
        assert_eq!(from_value::<Option<u8>>(Value::from(0)).unwrap(), None);
        assert_eq!(from_value::<Option<u8>>(Value::from(4)).unwrap(), Some(4));
        assert_eq!(
            from_value::<String>(Value::Closure("f".to_string())).unwrap(),
            "#'f"
        );
        assert!(from_value::<u8>(Value::from(300)).is_err());
    }

    #[test]
    fn test_big_integer() {
        let big = BigInt::from(i64::MAX) * 4;
        let expected = i128::from(i64::MAX) * 4;
        assert_eq!(from_value::<i128>(Value::from(big)).unwrap(), expected);
    }

    #[test]
    fn test_record_as_tuple_struct() {
        let value = Value::Struct(Record::new("Position", vec![Value::from(1), Value::from(2)]));
        assert_eq!(from_value::<Position>(value).unwrap(), Position(1, 2));
    }

    #[test]
    fn test_multi_value_entry_becomes_sequence() {
        let mut mapping = Mapping::new();
        mapping.insert(Value::from("a"), vec![Value::from(1), Value::from(2)]);
        let map: HashMap<String, Vec<i32>> = from_value(Value::Mapping(mapping)).unwrap();
        assert_eq!(map["a"], vec![1, 2]);
    }

    #[test]
    fn test_enums() {
        assert_eq!(from_value::<Mood>(Value::from("Calm")).unwrap(), Mood::Calm);

        let mut angry = Mapping::new();
        angry.insert(Value::from("Angry"), vec![Value::from(9)]);
        assert_eq!(
            from_value::<Mood>(Value::Mapping(angry)).unwrap(),
            Mood::Angry(9)
        );

        let mut fields = Mapping::new();
        fields.insert(Value::from("a"), vec![Value::from(1)]);
        fields.insert(Value::from("b"), vec![Value::from(2)]);
        let mut mixed = Mapping::new();
        mixed.insert(Value::from("Mixed"), vec![Value::Mapping(fields)]);
        assert_eq!(
            from_value::<Mood>(Value::Mapping(mixed)).unwrap(),
            Mood::Mixed { a: 1, b: 2 }
        );

        assert!(from_value::<Mood>(Value::from(1)).is_err());
    }

    #[test]
    fn test_references_are_followed() {
        let doc = load("#3:2\na <1>=({1,2,})\nb <1>\n").unwrap();
        let b = doc.get("b").cloned().unwrap();
        assert_eq!(from_value::<Vec<u8>>(b).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_cyclic_reference_is_an_error() {
        let doc = load("#3:2\na <1>=({<1>,})\n").unwrap();
        let a = doc.get("a").cloned().unwrap();
        let result = from_value::<Value>(a);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_document() {
        #[derive(Deserialize)]
        struct Save {
            name: String,
            hp: Option<i64>,
        }

        let doc = load("#3:2\nname \"x\"\nhp 0\n").unwrap();
        let save: Save = from_document(&doc).unwrap();
        assert_eq!(save.name, "x");
        assert_eq!(save.hp, None);
    }
}
