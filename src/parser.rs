//! Save file parsing.
//!
//! This module turns save file text into a parse tree ([`SaveFile`]) that
//! borrows its lexemes from the input. Turning the tree into values is the
//! job of the [`loader`](crate::loader).
//!
//! ## Overview
//!
//! - **Single pass**: recursive descent, every construct is chosen by its
//!   leading delimiter (`({`, `([`, `(<`, `(*`, `<`, `#'`, `"`, digit or `-`),
//!   so there is no backtracking
//! - **Whitespace is grammar**: it is only accepted between a variable name and
//!   its value, and between a value and the end of its line
//! - **All or nothing**: any violation aborts with a position-annotated
//!   [`Error::Syntax`] and no partial tree
//!
//! ```rust
//! use serde_lpc::parser::{parse, NodeKind};
//! use serde_lpc::LoadOptions;
//!
//! let tree = parse("#3:2\narr ({1,2,})\n", &LoadOptions::default()).unwrap();
//! assert_eq!(tree.assignments[0].name, "arr");
//! assert!(matches!(tree.assignments[0].value.kind, NodeKind::Array(_)));
//! ```

use crate::{Error, LoadOptions, Result};

/// The fixed first line of every save file.
pub const HEADER: &str = "#3:2";

/// Byte range of a construct in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A whole save file: the assignments in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveFile<'a> {
    pub assignments: Vec<Assignment<'a>>,
}

/// One `name value` line.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment<'a> {
    pub name: &'a str,
    pub value: Node<'a>,
    pub span: Span,
}

/// The raw text between the quotes of a string literal, still escaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrLit<'a> {
    pub raw: &'a str,
    /// Byte offset of `raw` in the input.
    pub start: usize,
}

/// A parsed value with its location.
#[derive(Clone, Debug, PartialEq)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    pub span: Span,
}

/// One `key:value;value` entry of a mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<'a> {
    pub key: Node<'a>,
    pub values: Vec<Node<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind<'a> {
    /// The number lexeme exactly as written.
    Number(&'a str),
    String(StrLit<'a>),
    /// The symbol after `#'`.
    Closure(&'a str),
    Array(Vec<Node<'a>>),
    Mapping(Vec<Entry<'a>>),
    Struct {
        description: StrLit<'a>,
        fields: Vec<Node<'a>>,
    },
    LwObject {
        class: StrLit<'a>,
        fields: Vec<Node<'a>>,
    },
    /// `<id>` or `<id>=value`.
    Ref {
        id: u64,
        anchor: Option<Box<Node<'a>>>,
    },
}

/// Parses a complete save file.
///
/// # Errors
///
/// [`Error::Syntax`] for any grammar violation (a wrong or missing header is
/// reported at position 0) and [`Error::DepthLimit`] when values nest deeper
/// than `options.max_depth`.
pub fn parse<'a>(input: &'a str, options: &LoadOptions) -> Result<SaveFile<'a>> {
    Parser::new(input, options).parse_save_file()
}

/// Recursive-descent parser over one input string.
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, options: &LoadOptions) -> Self {
        Parser {
            input,
            position: 0,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    pub fn parse_save_file(mut self) -> Result<SaveFile<'a>> {
        if !self.eat(HEADER) {
            return Err(Error::syntax(self.input, 0, "header `#3:2`"));
        }
        self.expect("\n", "newline after header")?;

        let mut assignments = Vec::new();
        while !self.at_end() {
            assignments.push(self.parse_assignment()?);
            self.parse_line_end()?;
        }
        Ok(SaveFile { assignments })
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.position += literal.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, literal: &str, expected: &str) -> Result<()> {
        if self.eat(literal) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn error(&self, expected: &str) -> Error {
        Error::syntax(self.input, self.position, expected)
    }

    fn span_from(&self, start: usize) -> Span {
        Span {
            start,
            end: self.position,
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::DepthLimit {
                position: self.position,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn skip_digits(&mut self) -> usize {
        let digits = self
            .rest()
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        self.position += digits;
        digits
    }

    fn parse_assignment(&mut self) -> Result<Assignment<'a>> {
        let start = self.position;
        let name = self.parse_identifier("variable name")?;

        let gap_start = self.position;
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.next_char();
        }
        if self.position == gap_start {
            return Err(self.error("whitespace after variable name"));
        }

        let value = self.parse_value()?;
        Ok(Assignment {
            name,
            value,
            span: self.span_from(start),
        })
    }

    /// `WS* "\n"`: takes the whole whitespace run after a value and ends the
    /// line at the last newline inside it.
    fn parse_line_end(&mut self) -> Result<()> {
        let start = self.position;
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.next_char();
        }
        match self.input[start..self.position].rfind('\n') {
            Some(offset) => {
                self.position = start + offset + 1;
                Ok(())
            }
            None => Err(self.error("newline after value")),
        }
    }

    /// `[a-zA-Z_][a-zA-Z0-9_]*`
    fn parse_identifier(&mut self, expected: &str) -> Result<&'a str> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        match bytes.first() {
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
            _ => return Err(self.error(expected)),
        }
        let len = bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count();
        self.position += len;
        Ok(&rest[..len])
    }

    fn parse_value(&mut self) -> Result<Node<'a>> {
        let rest = self.rest();
        if rest.starts_with("({") {
            self.parse_array()
        } else if rest.starts_with("([") {
            self.parse_mapping()
        } else if rest.starts_with("(<") {
            self.parse_record("(<", ">)")
        } else if rest.starts_with("(*") {
            self.parse_record("(*", "*)")
        } else if rest.starts_with("#'") {
            self.parse_closure()
        } else {
            match self.peek_char() {
                Some('<') => self.parse_ref(),
                Some('"') => {
                    let start = self.position;
                    let lit = self.parse_string_literal()?;
                    Ok(Node {
                        kind: NodeKind::String(lit),
                        span: self.span_from(start),
                    })
                }
                Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
                _ => Err(self.error("value")),
            }
        }
    }

    /// `-?\d+(\.\d+)?([eE]-?\d+)?`
    fn parse_number(&mut self) -> Result<Node<'a>> {
        let start = self.position;
        self.eat("-");
        if self.skip_digits() == 0 {
            return Err(self.error("digit"));
        }

        let bytes = self.rest().as_bytes();
        if bytes.first() == Some(&b'.') && bytes.get(1).is_some_and(u8::is_ascii_digit) {
            self.position += 1;
            self.skip_digits();
        }

        let bytes = self.rest().as_bytes();
        if matches!(bytes.first(), Some(b'e') | Some(b'E')) {
            let sign = usize::from(bytes.get(1) == Some(&b'-'));
            if bytes.get(1 + sign).is_some_and(u8::is_ascii_digit) {
                self.position += 1 + sign;
                self.skip_digits();
            }
        }

        Ok(Node {
            kind: NodeKind::Number(&self.input[start..self.position]),
            span: self.span_from(start),
        })
    }

    /// `'"' ( [^"\\\n] | "\\" [^\n] )* '"'`
    fn parse_string_literal(&mut self) -> Result<StrLit<'a>> {
        self.expect("\"", "string")?;
        let start = self.position;
        loop {
            match self.peek_char() {
                None | Some('\n') => return Err(self.error("closing `\"`")),
                Some('"') => break,
                Some('\\') => {
                    self.next_char();
                    match self.peek_char() {
                        None | Some('\n') => return Err(self.error("escaped character")),
                        Some(_) => {
                            self.next_char();
                        }
                    }
                }
                Some(_) => {
                    self.next_char();
                }
            }
        }
        let raw = &self.input[start..self.position];
        self.next_char();
        Ok(StrLit { raw, start })
    }

    fn parse_closure(&mut self) -> Result<Node<'a>> {
        let start = self.position;
        self.expect("#'", "`#'`")?;
        let symbol = self.parse_identifier("closure symbol")?;
        Ok(Node {
            kind: NodeKind::Closure(symbol),
            span: self.span_from(start),
        })
    }

    fn parse_array(&mut self) -> Result<Node<'a>> {
        let start = self.position;
        self.expect("({", "`({`")?;
        self.enter()?;
        let mut elements = Vec::new();
        while !self.eat("})") {
            elements.push(self.parse_value()?);
            self.expect(",", "`,` after array element")?;
        }
        self.leave();
        Ok(Node {
            kind: NodeKind::Array(elements),
            span: self.span_from(start),
        })
    }

    fn parse_mapping(&mut self) -> Result<Node<'a>> {
        let start = self.position;
        self.expect("([", "`([`")?;
        self.enter()?;
        let mut entries = Vec::new();
        while !self.eat("])") {
            let key = self.parse_value()?;
            self.expect(":", "`:` after mapping key")?;
            let mut values = vec![self.parse_value()?];
            while self.eat(";") {
                values.push(self.parse_value()?);
            }
            self.expect(",", "`,` after mapping entry")?;
            entries.push(Entry { key, values });
        }
        self.leave();
        Ok(Node {
            kind: NodeKind::Mapping(entries),
            span: self.span_from(start),
        })
    }

    /// Structs `(<"desc",v,>)` and lightweight objects `(*"class",v,*)`.
    fn parse_record(&mut self, open: &str, close: &str) -> Result<Node<'a>> {
        let start = self.position;
        self.expect(open, open)?;
        self.enter()?;
        let name = self.parse_string_literal()?;
        self.expect(",", "`,` after description")?;
        let mut fields = Vec::new();
        while !self.eat(close) {
            fields.push(self.parse_value()?);
            self.expect(",", "`,` after field")?;
        }
        self.leave();

        let kind = if open == "(<" {
            NodeKind::Struct {
                description: name,
                fields,
            }
        } else {
            NodeKind::LwObject { class: name, fields }
        };
        Ok(Node {
            kind,
            span: self.span_from(start),
        })
    }

    fn parse_ref(&mut self) -> Result<Node<'a>> {
        let start = self.position;
        self.expect("<", "`<`")?;
        let digits_start = self.position;
        if self.skip_digits() == 0 {
            return Err(self.error("reference id"));
        }
        let id = self.input[digits_start..self.position]
            .parse::<u64>()
            .map_err(|_| Error::syntax(self.input, digits_start, "reference id in u64 range"))?;
        self.expect(">", "`>`")?;

        let anchor = if self.eat("=") {
            self.enter()?;
            let value = self.parse_value()?;
            self.leave();
            Some(Box::new(value))
        } else {
            None
        };

        Ok(Node {
            kind: NodeKind::Ref { id, anchor },
            span: self.span_from(start),
        })
    }
}
