//! # serde_lpc
//!
//! A codec for the `#3:2` save file format written by LPC drivers to persist
//! object variables: scalars, nested arrays and mappings, structs, lightweight
//! objects, closures and value-sharing back-references.
//!
//! ## What is a save file?
//!
//! A header line `#3:2` followed by one `name value` line per variable:
//!
//! ```text
//! #3:2
//! name "simple"
//! fraction 2.2
//! number 123
//! arr ({1,2,3,})
//! ```
//!
//! See the [`format`] module for the full grammar.
//!
//! ## Key Features
//!
//! - **Lossless**: every construct of the grammar has its own [`Value`] variant,
//!   and reference-free documents round-trip exactly
//! - **Lazy references**: `<N>` back-references resolve on demand against the
//!   anchor table of their own [`Document`], so forward references work and a
//!   dangling one only fails when followed
//! - **Serde Compatible**: Rust types convert to and from documents via
//!   `#[derive(Serialize, Deserialize)]`
//! - **No Unsafe Code**
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_lpc::{dump, load, Value};
//!
//! let text = "#3:2\nname \"simple\"\narr ({1,2,3,})\n";
//! let doc = load(text).unwrap();
//!
//! assert_eq!(doc.get("name").and_then(Value::as_str), Some("simple"));
//! assert_eq!(dump(&doc).unwrap(), text);
//! ```
//!
//! ### Typed Access Through Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_lpc::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Player {
//!     name: String,
//!     level: u32,
//!     titles: Vec<String>,
//! }
//!
//! let player = Player {
//!     name: "bob".to_string(),
//!     level: 7,
//!     titles: vec!["the brave".to_string()],
//! };
//!
//! let text = to_string(&player).unwrap();
//! assert_eq!(text, "#3:2\nname \"bob\"\nlevel 7\ntitles ({\"the brave\",})\n");
//!
//! let back: Player = from_str(&text).unwrap();
//! assert_eq!(player, back);
//! ```
//!
//! ### Building Values with the lpc! Macro
//!
//! ```rust
//! use serde_lpc::{lpc, Value};
//!
//! let inventory = lpc!({ "sword": 1, "coins": [10, 20] });
//! let coins = inventory.as_mapping().and_then(|m| m.get_first(&Value::from("coins")));
//! assert_eq!(coins.and_then(Value::as_array).map(Vec::len), Some(2));
//! ```
//!
//! ## Logging
//!
//! Load and dump report through [`tracing`] at `debug` and `trace` level. The
//! crate never installs a subscriber.

pub mod de;
pub mod document;
pub mod error;
pub mod escape;
pub mod format;
pub mod loader;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod ser;
pub mod value;

pub use de::{from_document, from_value, ValueDeserializer};
pub use document::Document;
pub use error::{Error, Result};
pub use escape::{escape, unescape};
pub use map::Mapping;
pub use options::{DumpOptions, LoadOptions, Separator};
pub use ser::{to_document, to_value, Serializer, ValueSerializer};
pub use value::{Number, Record, RefTable, Reference, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::debug;

/// Loads a save file from text.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::{load, Value};
///
/// let doc = load("#3:2\nnumber 123\nfraction 2.2\n").unwrap();
/// assert_eq!(doc.get("number"), Some(&Value::from(123)));
/// assert!(doc.get("fraction").unwrap().is_float());
/// ```
///
/// # Errors
///
/// [`Error::Syntax`] on any grammar violation, including a missing or wrong
/// header (reported at position 0). No partial document is returned.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load(text: &str) -> Result<Document> {
    load_with_options(text, &LoadOptions::default())
}

/// Loads a save file from text with custom limits.
///
/// # Errors
///
/// Same as [`load`], plus [`Error::DepthLimit`] for values nested deeper than
/// `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_with_options(text: &str, options: &LoadOptions) -> Result<Document> {
    loader::load_str(text, options)
}

/// Renders a document as canonical save file text.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::{dump, lpc, Document};
///
/// let mut doc = Document::new();
/// doc.insert("arr", lpc!([1, 2, 3]));
/// assert_eq!(dump(&doc).unwrap(), "#3:2\narr ({1,2,3,})\n");
/// ```
///
/// # Errors
///
/// [`Error::Encode`] for values the format cannot express (see
/// [`Serializer::serialize_value`]), and reference errors raised while
/// expanding back-references.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn dump(document: &Document) -> Result<String> {
    dump_with_options(document, &DumpOptions::default())
}

/// Renders a document with custom formatting options.
///
/// # Errors
///
/// Same as [`dump`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn dump_with_options(document: &Document, options: &DumpOptions) -> Result<String> {
    let mut serializer = Serializer::new(options.clone());
    serializer.serialize_document(document)?;
    Ok(serializer.into_inner())
}

/// Loads a save file from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::load_reader;
/// use std::io::Cursor;
///
/// let doc = load_reader(Cursor::new(b"#3:2\nx 1\n")).unwrap();
/// assert!(doc.contains("x"));
/// ```
///
/// # Errors
///
/// [`Error::Io`] if reading fails or the bytes are not UTF-8, otherwise the
/// errors of [`load`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_reader<R>(mut reader: R) -> Result<Document>
where
    R: io::Read,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(&e.to_string()))?;
    load(&text)
}

/// Writes a document to an I/O stream.
///
/// # Errors
///
/// The errors of [`dump`], or [`Error::Io`] if writing fails. Nothing is
/// written when rendering fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn dump_writer<W>(mut writer: W, document: &Document) -> Result<()>
where
    W: io::Write,
{
    let text = dump(document)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))
}

/// Reads and loads the save file at `path`.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, otherwise the errors of [`load`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading save file");
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::io(&format!("{}: {}", path.display(), e)))?;
    load(&text)
}

/// Renders `document` and writes it as the entire contents of `path`.
///
/// # Errors
///
/// The errors of [`dump`], or [`Error::Io`] if the file cannot be written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn dump_file<P: AsRef<Path>>(path: P, document: &Document) -> Result<()> {
    let path = path.as_ref();
    let text = dump(document)?;
    debug!(path = %path.display(), bytes = text.len(), "writing save file");
    std::fs::write(path, text).map_err(|e| Error::io(&format!("{}: {}", path.display(), e)))
}

/// Serializes any `T: Serialize` as save file text, one variable per field.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_lpc::to_string;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: f64 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2.0 }).unwrap(), "#3:2\nx 1\ny 2.0\n");
/// ```
///
/// # Errors
///
/// See [`to_document`] and [`dump`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    dump(&to_document(value)?)
}

/// Deserializes a `T` from save file text, treating variables as fields.
///
/// # Errors
///
/// The errors of [`load`], or a custom error if the document does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_document(&load(text)?)
}
