//! Validated identifier type for table entries.

use crate::error::{Error, Result};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// A validated, immutable table key.
///
/// Keys follow the identifier grammar `[A-Za-z_:][A-Za-z0-9_:-]*`: the
/// first character is an ASCII letter, underscore, or colon; the rest may
/// also be digits or hyphens. Invalid text fails at construction, so a
/// `Key` in hand is always well-formed.
///
/// # Examples
///
/// ```rust
/// use canopy::Key;
///
/// assert!(Key::new("_ok:1-2").is_ok());
/// assert!(Key::new("").is_err());
/// assert!(Key::new("1abc").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Box<str>);

impl Key {
    /// Creates a key, rejecting text outside the key grammar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] when the text is empty or contains a
    /// character outside the allowed set.
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if Key::is_valid(&s) {
            Ok(Key(s.into_boxed_str()))
        } else {
            Err(Error::InvalidKey(s))
        }
    }

    /// Checks text against the key grammar without constructing a key.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '-')
    }

    /// The key text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the key in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Keys are never empty, but the pair of `len`/`is_empty` keeps clippy
    /// and generic code happy.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

// Lets a BTreeMap<Key, _> be probed with a plain &str.
impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Key::new(s)
    }
}

impl TryFrom<&str> for Key {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Key::new(s)
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Key::new(s)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_identifier_shapes() {
        for good in ["a", "_", ":", "_ok:1-2", "x9", "snake_case", "a-b-c", "CamelCase"] {
            assert!(Key::new(good).is_ok(), "expected {good:?} to be valid");
        }
    }

    #[test]
    fn rejects_out_of_grammar_text() {
        for bad in ["", "1abc", "-x", "a b", "a.b", "a[0]", "é", "a=b"] {
            assert!(Key::new(bad).is_err(), "expected {bad:?} to be invalid");
        }
    }

    #[test]
    fn orders_by_byte_value() {
        let mut keys = vec![
            Key::new("b").unwrap(),
            Key::new("A").unwrap(),
            Key::new("a").unwrap(),
        ];
        keys.sort();
        let names: Vec<_> = keys.iter().map(Key::as_str).collect();
        assert_eq!(names, ["A", "a", "b"]);
    }

    #[test]
    fn invalid_key_error_names_the_text() {
        let err = Key::new("1abc").unwrap_err();
        assert!(err.to_string().contains("1abc"));
    }
}
