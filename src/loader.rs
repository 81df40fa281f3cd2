//! Turning a parse tree into a [`Document`].
//!
//! The loader walks the tree bottom-up. It owns the anchor table of the
//! document being built, so two loads never see each other's anchors.
//!
//! - Numbers containing `.`, `e` or `E` become floats, all others integers
//! - String literals are unescaped
//! - `<N>=value` anchors `value` under `N` and stands for `value` itself
//! - A bare `<N>` becomes a lazy [`Reference`](crate::Reference); its anchor may
//!   appear later in the file, and a missing anchor only surfaces as an error
//!   when the reference is resolved

use crate::escape::unescape;
use crate::parser::{self, Node, NodeKind, SaveFile, StrLit};
use crate::value::{RefTable, Reference};
use crate::{Document, Error, LoadOptions, Mapping, Number, Record, Result, Value};
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Parses and loads `input` in one step.
///
/// # Errors
///
/// Any error of [`parser::parse`], or a syntax error for a number lexeme that
/// does not convert.
pub fn load_str(input: &str, options: &LoadOptions) -> Result<Document> {
    let tree = parser::parse(input, options)?;
    Loader::new(input).load(tree)
}

/// Converts one parse tree into a document.
pub struct Loader<'a> {
    input: &'a str,
    refs: Rc<RefTable>,
}

impl<'a> Loader<'a> {
    /// `input` is the text the tree was parsed from; it is used to locate errors.
    pub fn new(input: &'a str) -> Self {
        Loader {
            input,
            refs: RefTable::new(),
        }
    }

    /// Consumes the loader and the tree. Repeated variable names keep the
    /// position of their first occurrence and the value of their last.
    pub fn load(self, tree: SaveFile<'_>) -> Result<Document> {
        let mut vars = IndexMap::with_capacity(tree.assignments.len());
        for assignment in tree.assignments {
            let value = self.load_node(assignment.value)?;
            if vars.insert(assignment.name.to_string(), value).is_some() {
                trace!(name = assignment.name, "variable redefined, keeping last value");
            }
        }

        debug!(
            variables = vars.len(),
            anchors = self.refs.len(),
            "loaded save file"
        );
        Ok(Document::from_parts(vars, self.refs))
    }

    fn load_node(&self, node: Node<'_>) -> Result<Value> {
        match node.kind {
            NodeKind::Number(lexeme) => self.load_number(lexeme, node.span.start),
            NodeKind::String(lit) => Ok(Value::String(self.load_string(lit)?)),
            NodeKind::Closure(symbol) => Ok(Value::Closure(symbol.to_string())),
            NodeKind::Array(elements) => Ok(Value::Array(self.load_all(elements)?)),
            NodeKind::Mapping(entries) => {
                let mut mapping = Mapping::with_capacity(entries.len());
                for entry in entries {
                    let key = self.load_node(entry.key)?;
                    let values = self.load_all(entry.values)?;
                    mapping.insert(key, values);
                }
                Ok(Value::Mapping(mapping))
            }
            NodeKind::Struct {
                description,
                fields,
            } => Ok(Value::Struct(self.load_record(description, fields)?)),
            NodeKind::LwObject { class, fields } => {
                Ok(Value::LwObject(self.load_record(class, fields)?))
            }
            NodeKind::Ref {
                id,
                anchor: Some(anchor),
            } => {
                let value = self.load_node(*anchor)?;
                if self.refs.insert(id, value.clone()).is_some() {
                    trace!(id, "anchor redefined, keeping last value");
                } else {
                    trace!(id, kind = value.kind(), "anchor registered");
                }
                Ok(value)
            }
            NodeKind::Ref { id, anchor: None } => {
                if !self.refs.contains(id) {
                    trace!(id, "reference precedes its anchor");
                }
                Ok(Value::Reference(Reference::new(id, &self.refs)))
            }
        }
    }

    fn load_all(&self, nodes: Vec<Node<'_>>) -> Result<Vec<Value>> {
        nodes.into_iter().map(|node| self.load_node(node)).collect()
    }

    fn load_record(&self, name: StrLit<'_>, fields: Vec<Node<'_>>) -> Result<Record> {
        Ok(Record::new(self.load_string(name)?, self.load_all(fields)?))
    }

    fn load_number(&self, lexeme: &str, position: usize) -> Result<Value> {
        let number = if lexeme.contains(['.', 'e', 'E']) {
            let float = lexeme
                .parse::<f64>()
                .map_err(|_| Error::syntax(self.input, position, "float"))?;
            if !float.is_finite() {
                return Err(Error::syntax(self.input, position, "finite float"));
            }
            Number::Float(float)
        } else {
            match lexeme.parse::<i64>() {
                Ok(i) => Number::Integer(i),
                Err(_) => lexeme
                    .parse::<BigInt>()
                    .map(Number::BigInt)
                    .map_err(|_| Error::syntax(self.input, position, "integer"))?,
            }
        };
        Ok(Value::Number(number))
    }

    fn load_string(&self, lit: StrLit<'_>) -> Result<String> {
        unescape(lit.raw).map_err(|err| match err {
            Error::Unescape { position } => {
                Error::syntax(self.input, lit.start + position, "escaped character")
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(input: &str) -> Document {
        load_str(input, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_number_kinds() {
        let doc = load("#3:2\na 123\nb 2.2\nc 1e3\nd -7\ne 2E-2\n");
        assert_eq!(doc.get("a"), Some(&Value::Number(Number::Integer(123))));
        assert_eq!(doc.get("b"), Some(&Value::Number(Number::Float(2.2))));
        assert_eq!(doc.get("c"), Some(&Value::Number(Number::Float(1000.0))));
        assert_eq!(doc.get("d"), Some(&Value::Number(Number::Integer(-7))));
        assert_eq!(doc.get("e"), Some(&Value::Number(Number::Float(0.02))));
    }

    #[test]
    fn test_overflowing_float_rejected() {
        for input in ["#3:2
f 1e999
", "#3:2
f -1e999
", "#3:2
f ({1,1.5e400,})
"] {
            let err = load_str(input, &LoadOptions::default()).unwrap_err();
            assert!(matches!(err, Error::Syntax { .. }), "{:?}", input);
            assert!(err.to_string().contains("finite float"), "{}", err);
        }
        let err = load_str("#3:2
f 1e999
", &LoadOptions::default()).unwrap_err();
        assert_eq!(err.position(), Some(7));
    }

    #[test]
    fn test_big_integer() {
        let doc = load("#3:2\nbig 123456789012345678901234567890\n");
        let expected: BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(doc.get("big"), Some(&Value::Number(Number::BigInt(expected))));
    }

    #[test]
    fn test_string_unescaped() {
        let doc = load("#3:2\ns \"a\\nb\\\"c\\\\d\\e\"\n");
        assert_eq!(doc.get("s").and_then(Value::as_str), Some("a\nb\"c\\de"));
    }

    #[test]
    fn test_duplicate_variable_last_wins() {
        let doc = load("#3:2\nx 1\ny 2\nx 3\n");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("x"), Some(&Value::from(3)));
        let names: Vec<_> = doc.names().map(String::as_str).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_anchor_is_transparent() {
        let doc = load("#3:2\nfield <1>=\"shared\"\nother <1>\n");
        assert_eq!(doc.get("field"), Some(&Value::from("shared")));
        let other = doc.get("other").unwrap();
        assert!(other.is_reference());
        assert_eq!(doc.resolve(other), Ok(Value::from("shared")));
    }

    #[test]
    fn test_forward_reference() {
        let doc = load("#3:2\nfirst ({<2>,})\nsecond <2>=([\"k\":1,])\n");
        let first = doc.get("first").and_then(Value::as_array).unwrap();
        let resolved = doc.resolve(&first[0]).unwrap();
        assert_eq!(resolved.as_mapping().map(Mapping::len), Some(1));
    }

    #[test]
    fn test_dangling_reference_fails_only_on_resolve() {
        let doc = load("#3:2\nr <9>\n");
        let r = doc.get("r").unwrap();
        assert_eq!(doc.resolve(r), Err(Error::UnresolvedReference { id: 9 }));
    }

    #[test]
    fn test_tables_are_per_load() {
        let first = load("#3:2\na <1>=5\n");
        let second = load("#3:2\nb <1>\n");
        assert!(first.anchors().contains(1));
        assert!(!second.anchors().contains(1));
        assert_eq!(
            second.resolve(second.get("b").unwrap()),
            Err(Error::UnresolvedReference { id: 1 })
        );
    }

    #[test]
    fn test_records() {
        let doc = load("#3:2\ns (<\"pos\",1,2,>)\no (*\"/std/obj\",\"x\",*)\n");
        let s = doc.get("s").and_then(Value::as_struct).unwrap();
        assert_eq!(s.name(), "pos");
        assert_eq!(s.fields(), &[Value::from(1), Value::from(2)]);
        let o = doc.get("o").and_then(Value::as_lwobject).unwrap();
        assert_eq!(o.name(), "/std/obj");
        assert_eq!(o[0], Value::from("x"));
    }

    #[test]
    fn test_closure_symbol_without_marker() {
        let doc = load("#3:2\nc #'heart_beat\n");
        assert_eq!(doc.get("c"), Some(&Value::Closure("heart_beat".to_string())));
    }

    #[test]
    fn test_mapping_duplicate_keys() {
        let doc = load("#3:2\nm ([\"a\":1,\"b\":2,\"a\":3;4,])\n");
        let m = doc.get("m").and_then(Value::as_mapping).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(
            m.get(&Value::from("a")),
            Some(&[Value::from(3), Value::from(4)][..])
        );
    }
}
