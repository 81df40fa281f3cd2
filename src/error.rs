//! Error types for LPC save file loading and dumping.
//!
//! Every fallible operation in this crate returns [`Result`], whose error type
//! is the single [`Error`] enum below.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: the input violates the save file grammar. Carries the byte
//!   offset plus 1-based line and column, and what the parser expected there.
//! - **Unescape Errors**: a string literal ends in a lone backslash.
//! - **Reference Errors**: a back-reference was dereferenced but its id was never
//!   anchored, or the document owning the anchor table is gone.
//! - **Encode Errors**: the serializer met a value it cannot render.
//! - **I/O Errors**: reading or writing the backing file failed.
//!
//! ## Examples
//!
//! ```rust
//! use serde_lpc::{load, Error};
//!
//! let err = load("#3:1\nname \"x\"\n").unwrap_err();
//! match err {
//!     Error::Syntax { position, .. } => assert_eq!(position, 0),
//!     other => panic!("unexpected error: {other}"),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while loading, dumping or converting
/// save file data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The input does not match the save file grammar
    #[error("Syntax error at line {line}, column {column} (byte {position}): expected {expected}")]
    Syntax {
        position: usize,
        line: usize,
        column: usize,
        expected: String,
    },

    /// A string ended in the middle of an escape sequence
    #[error("String ends with incomplete escape at byte {position}")]
    Unescape { position: usize },

    /// A back-reference was dereferenced but no anchor defines its id
    #[error("Unresolved reference <{id}>: no anchor defines this id")]
    UnresolvedReference { id: u64 },

    /// A back-reference outlived the document that owns its anchor table
    #[error("Detached reference <{id}>: the owning document was dropped")]
    DetachedReference { id: u64 },

    /// A chain of back-references loops back on itself
    #[error("Cyclic reference: <{id}> refers back to itself")]
    CyclicReference { id: u64 },

    /// The serializer cannot render a value
    #[error("Cannot encode {kind}")]
    Encode { kind: String },

    /// Composite values are nested deeper than the configured limit
    #[error("Nesting depth limit of {limit} exceeded at byte {position}")]
    DepthLimit { position: usize, limit: usize },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error at `position` in `input`, computing the line and
    /// column from the text before it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lpc::Error;
    ///
    /// let err = Error::syntax("#3:2\nx ?\n", 7, "value");
    /// assert!(err.to_string().contains("line 2, column 3"));
    /// ```
    pub fn syntax(input: &str, position: usize, expected: &str) -> Self {
        let (line, column) = line_column(input, position);
        Error::Syntax {
            position,
            line,
            column,
            expected: expected.to_string(),
        }
    }

    /// Creates an encode error describing the value kind that could not be rendered.
    pub fn encode<T: fmt::Display>(kind: T) -> Self {
        Error::Encode {
            kind: kind.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lpc::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the byte offset this error points at, if it has one.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Syntax { position, .. }
            | Error::Unescape { position }
            | Error::DepthLimit { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// 1-based line and column (in characters) of a byte offset.
fn line_column(input: &str, position: usize) -> (usize, usize) {
    let mut end = position.min(input.len());
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    let before = &input[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
