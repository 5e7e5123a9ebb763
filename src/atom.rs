//! The text scalar stored at the leaves of a canopy tree.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// An immutable-by-replacement text scalar.
///
/// Every leaf value in a canopy tree is text; numbers and booleans are
/// converted on demand by the [`Reader`](crate::Reader). `Atom` stores its
/// text as a `Box<str>` (two words instead of `String`'s three) since
/// trees of small scalars dominate real configuration data.
///
/// # Examples
///
/// ```rust
/// use canopy::Atom;
///
/// let a = Atom::from("11");
/// assert_eq!(a.as_str(), "11");
/// assert_eq!(a, "11");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(Box<str>);

impl Atom {
    /// Creates an empty atom.
    #[must_use]
    pub fn new() -> Self {
        Atom::default()
    }

    /// The text of this atom.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the text in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty atom.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Atom {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(s: &str) -> Self {
        Atom(s.into())
    }
}

impl From<String> for Atom {
    fn from(s: String) -> Self {
        Atom(s.into_boxed_str())
    }
}

impl From<Atom> for String {
    fn from(a: Atom) -> Self {
        a.0.into_string()
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_and_access() {
        let a = Atom::from("hello");
        assert_eq!(a.as_str(), "hello");
        assert_eq!(a.len(), 5);
        assert!(!a.is_empty());
        assert!(Atom::new().is_empty());
    }

    #[test]
    fn comparisons() {
        assert_eq!(Atom::from("x"), "x");
        assert_ne!(Atom::from("x"), "y");
        assert!(Atom::from("a") < Atom::from("b"));
    }

    #[test]
    fn string_round_trip() {
        let a = Atom::from(String::from("text"));
        let s: String = a.clone().into();
        assert_eq!(s, "text");
        assert_eq!(a.to_string(), "text");
    }
}
