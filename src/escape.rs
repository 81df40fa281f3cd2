//! Escape transform for string literals.
//!
//! The save file format knows exactly three escapes: `\\`, `\"` and `\n`.
//! Any other escaped character stands for itself.

use crate::{Error, Result};

/// Decodes the raw text between the quotes of a string literal.
///
/// A backslash escapes the following character: `n` becomes a newline, every
/// other character (including `"` and `\`) is kept literally.
///
/// # Errors
///
/// Returns [`Error::Unescape`] if the text ends with a lone backslash. The
/// position is the byte offset of that backslash within `text`.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::escape::unescape;
///
/// assert_eq!(unescape(r#"a\nb\"c\\d"#).unwrap(), "a\nb\"c\\d");
/// assert!(unescape("oops\\").is_err());
/// ```
pub fn unescape(text: &str) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    let mut pending: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if pending.take().is_some() {
            match ch {
                'n' => result.push('\n'),
                other => result.push(other),
            }
        } else if ch == '\\' {
            pending = Some(i);
        } else {
            result.push(ch);
        }
    }

    match pending {
        Some(position) => Err(Error::Unescape { position }),
        None => Ok(result),
    }
}

/// Encodes text for use between the quotes of a string literal.
///
/// Backslashes are escaped first so the backslashes introduced for newlines
/// and quotes are not escaped twice.
///
/// # Examples
///
/// ```rust
/// use serde_lpc::escape::escape;
///
/// assert_eq!(escape("say \"hi\"\n"), r#"say \"hi\"\n"#);
/// ```
#[must_use]
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '"' => result.push_str("\\\""),
            other => result.push(other),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_known_sequences() {
        assert_eq!(unescape(r"test\ntest").unwrap(), "test\ntest");
        assert_eq!(unescape(r#"\"quoted\""#).unwrap(), "\"quoted\"");
        assert_eq!(unescape(r"back\\slash").unwrap(), "back\\slash");
    }

    #[test]
    fn test_unescape_unknown_sequence_is_literal() {
        assert_eq!(unescape(r"\t\x").unwrap(), "tx");
    }

    #[test]
    fn test_unescape_trailing_backslash() {
        assert_eq!(unescape("abc\\"), Err(Error::Unescape { position: 3 }));
        assert_eq!(unescape("\\"), Err(Error::Unescape { position: 0 }));
    }

    #[test]
    fn test_unescape_multibyte() {
        assert_eq!(unescape("grüße\\n").unwrap(), "grüße\n");
    }

    #[test]
    fn test_escape_order() {
        assert_eq!(escape("\\n"), "\\\\n");
        assert_eq!(escape("\n"), "\\n");
        assert_eq!(escape("a\"b"), "a\\\"b");
    }

    #[test]
    fn test_escape_then_unescape() {
        let text = "test\ntest\"and\\must be quoted";
        assert_eq!(unescape(&escape(text)).unwrap(), text);
    }
}
