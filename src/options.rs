//! Configuration options for loading and dumping save files.
//!
//! - [`LoadOptions`]: limits applied while parsing
//! - [`DumpOptions`]: formatting choices for the serializer
//! - [`Separator`]: whitespace written between a variable name and its value
//!
//! ## Examples
//!
//! ```rust
//! use serde_lpc::{dump_with_options, load_with_options, DumpOptions, LoadOptions, Separator};
//!
//! let doc = load_with_options("#3:2\nx 1\n", &LoadOptions::new().with_max_depth(8)).unwrap();
//!
//! let text = dump_with_options(&doc, &DumpOptions::new().with_separator(Separator::Tab)).unwrap();
//! assert_eq!(text, "#3:2\nx\t1\n");
//! ```

/// Whitespace between a variable name and its value.
///
/// The grammar accepts any run of whitespace there; a single space is the
/// canonical form.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::Separator;
///
/// assert_eq!(Separator::Space.as_str(), " ");
/// assert_eq!(Separator::Tab.as_str(), "\t");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Space,
    Tab,
}

impl Separator {
    /// Returns the string representation of this separator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Separator::Space => " ",
            Separator::Tab => "\t",
        }
    }
}

/// Limits applied while loading.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::LoadOptions;
///
/// let options = LoadOptions::new();
/// assert_eq!(options.max_depth, 512);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Deepest allowed nesting of composite values (arrays, mappings, structs,
    /// lightweight objects and anchors). The parser recurses once per level.
    pub max_depth: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions { max_depth: 512 }
    }
}

impl LoadOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Formatting choices for dumping.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::{DumpOptions, Separator};
///
/// let options = DumpOptions::new().with_separator(Separator::Tab);
/// assert_eq!(options.separator, Separator::Tab);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DumpOptions {
    pub separator: Separator,
}

impl DumpOptions {
    /// Creates default options (canonical output).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the separator between variable names and values.
    #[must_use]
    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }
}
