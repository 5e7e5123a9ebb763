//! Dynamic tree representation for canopy data.
//!
//! This module provides the [`Value`] enum, a minimal tree of four kinds:
//! absence ([`Value::None`]), text scalar ([`Atom`]), ordered list
//! ([`Value::Vector`]), and string-keyed map ([`Table`]).
//!
//! ## Usage Patterns
//!
//! ### Creating values
//!
//! ```rust
//! use canopy::{canopy, Value};
//!
//! let none = Value::None;
//! let atom = Value::from("11");
//! let tree = canopy!({ "host": "db1", "ports": ["5432", "5433"] });
//! # let _ = (none, atom, tree);
//! ```
//!
//! ### Transmuting in place
//!
//! A value changes kind with [`Value::be`]: the previous payload is
//! dropped and a fresh default takes its place, unless the kind is already
//! current, in which case nothing happens.
//!
//! ```rust
//! use canopy::{Kind, Value};
//!
//! let mut v = Value::from("leaf");
//! v.be(Kind::Table);
//! assert!(v.as_table().is_some());
//! ```
//!
//! ### Looking things up
//!
//! [`Value::get`] takes either a `usize` (vector index) or a `&str` (table
//! key) and returns `None` on any mismatch; [`Value::xget`] evaluates a
//! whole dotted/indexed path the same way. Neither ever fails with an
//! error.

use crate::atom::Atom;
use crate::error::Result;
use crate::map::Table;
use crate::tokens::{Syntax, Token, Tokenizer};
use serde::de::{self, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The things a [`Value`] might be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A singular or uninitialized value.
    None,
    /// A text scalar.
    Atom,
    /// An ordered list of values.
    Vector,
    /// A string-keyed map of values.
    Table,
}

impl Kind {
    /// Lowercase name, as used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Kind::None => "none",
            Kind::Atom => "atom",
            Kind::Vector => "vector",
            Kind::Table => "table",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tree of text: none, atom, vector, or table.
///
/// `Value` has deep-copy value semantics: cloning yields an independent
/// tree with no sharing, and exactly one payload is ever live. The tree
/// cannot represent aliased sub-trees or cycles.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absence; the default.
    #[default]
    None,
    /// A leaf text scalar.
    Atom(Atom),
    /// An ordered, dense sequence.
    Vector(Vec<Value>),
    /// A byte-ordered map with validated keys.
    Table(Table),
}

impl Value {
    /// The current kind of this value.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Value::None => Kind::None,
            Value::Atom(_) => Kind::Atom,
            Value::Vector(_) => Kind::Vector,
            Value::Table(_) => Kind::Table,
        }
    }

    /// Transmutes this value to `kind` in place.
    ///
    /// If the value is already of that kind, nothing happens and the
    /// payload is preserved. Otherwise the old payload is discarded and a
    /// fresh default payload for the new kind takes its place.
    pub fn be(&mut self, kind: Kind) -> &mut Self {
        if self.kind() != kind {
            *self = match kind {
                Kind::None => Value::None,
                Kind::Atom => Value::Atom(Atom::new()),
                Kind::Vector => Value::Vector(Vec::new()),
                Kind::Table => Value::Table(Table::new()),
            };
        }
        self
    }

    /// Resets to [`Value::None`], releasing any payload.
    pub fn clear(&mut self) {
        self.be(Kind::None);
    }

    /// Returns `true` if the value is none.
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` if the value is an atom.
    #[inline]
    #[must_use]
    pub const fn is_atom(&self) -> bool {
        matches!(self, Value::Atom(_))
    }

    /// Returns `true` if the value is a vector.
    #[inline]
    #[must_use]
    pub const fn is_vector(&self) -> bool {
        matches!(self, Value::Vector(_))
    }

    /// Returns `true` if the value is a table.
    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    /// If the value is an atom, returns it. Otherwise `None`.
    #[inline]
    #[must_use]
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(a) => Some(a),
            _ => None,
        }
    }

    /// If the value is an atom, returns its text. Otherwise `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_atom().map(Atom::as_str)
    }

    /// If the value is a vector, returns it. Otherwise `None`.
    #[inline]
    #[must_use]
    pub fn as_vector(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable vector access; `None` on kind mismatch.
    #[inline]
    pub fn as_vector_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// If the value is a table, returns it. Otherwise `None`.
    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Mutable table access; `None` on kind mismatch.
    #[inline]
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Consumes the value, returning its atom if it is one.
    #[must_use]
    pub fn into_atom(self) -> Option<Atom> {
        match self {
            Value::Atom(a) => Some(a),
            _ => None,
        }
    }

    /// Consumes the value, returning its vector if it is one.
    #[must_use]
    pub fn into_vector(self) -> Option<Vec<Value>> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the value, returning its table if it is one.
    #[must_use]
    pub fn into_table(self) -> Option<Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    // Transmute-and-borrow conveniences for the parser: the `unreachable`
    // arms are truly unreachable since `be` just installed the kind.
    pub(crate) fn make_vector(&mut self) -> &mut Vec<Value> {
        match self.be(Kind::Vector) {
            Value::Vector(v) => v,
            _ => unreachable!(),
        }
    }

    pub(crate) fn make_table(&mut self) -> &mut Table {
        match self.be(Kind::Table) {
            Value::Table(t) => t,
            _ => unreachable!(),
        }
    }

    /// Looks up a direct child by vector index (`usize`) or table key
    /// (`&str`).
    ///
    /// Never fails: kind mismatch, missing key, and out-of-range index all
    /// give `None`.
    ///
    /// ```rust
    /// use canopy::parse;
    ///
    /// let v = parse("{a=[\"x\" \"y\"]}").unwrap();
    /// assert_eq!(v.get("a").and_then(|a| a.get(1)).and_then(|x| x.as_str()), Some("y"));
    /// assert_eq!(v.get(0), None); // v is a table, not a vector
    /// ```
    #[must_use]
    pub fn get<I: TreeIndex>(&self, index: I) -> Option<&Value> {
        index.index_into(self)
    }

    /// Evaluates a dotted/indexed path like `key1.key2[3][4].key5`.
    ///
    /// `.key` descends a table, `[N]` descends a vector by non-negative
    /// base-10 index. Returns `None` on any failure (missing key or
    /// index, kind mismatch, or a malformed path) and never panics.
    ///
    /// ```rust
    /// use canopy::parse;
    ///
    /// let v = parse("{x={y={z=\"123\"}}}").unwrap();
    /// assert_eq!(v.xget("x.y.z").and_then(|z| z.as_str()), Some("123"));
    /// assert_eq!(v.xget("x.y.q"), None);
    /// assert_eq!(v.xget("x[0]"), None);
    /// ```
    #[must_use]
    pub fn xget(&self, path: &str) -> Option<&Value> {
        static XGET_SYNTAX: Syntax = Syntax::new("[].", "");

        let mut t = Tokenizer::new(path, &XGET_SYNTAX);
        let mut cur = self;
        t.next().ok()?;
        loop {
            match t.current().clone() {
                Token::End => return Some(cur),
                Token::Symbol(key) => cur = cur.get(key.as_str())?,
                Token::Syntax('[') => {
                    t.next().ok()?;
                    let index: usize = match t.current() {
                        Token::Symbol(s) => s.parse().ok()?,
                        _ => return None,
                    };
                    if t.next().ok()?.syntax() != Some(']') {
                        return None;
                    }
                    cur = cur.get(index)?;
                }
                _ => return None,
            }
            match t.next().ok()?.clone() {
                Token::End => return Some(cur),
                Token::Syntax('.') => {
                    t.next().ok()?;
                    if !matches!(t.current(), Token::Symbol(_)) {
                        return None;
                    }
                }
                Token::Syntax('[') => {}
                _ => return None,
            }
        }
    }

    /// Merges `other` into this value.
    ///
    /// When both sides are tables the merge recurses per key and `other`'s
    /// entries win; for any other kind pairing `other` fully replaces
    /// `self`. Layer defaults under overrides with this:
    ///
    /// ```rust
    /// use canopy::parse;
    ///
    /// let mut base = parse("{a=\"1\" b=\"2\"}").unwrap();
    /// base.merge(parse("{b=\"3\" c=\"4\"}").unwrap());
    /// assert_eq!(base, parse("{a=\"1\" b=\"3\" c=\"4\"}").unwrap());
    /// ```
    pub fn merge(&mut self, other: Value) -> &mut Self {
        match (&mut *self, other) {
            (Value::Table(mine), Value::Table(theirs)) => {
                for (key, value) in theirs {
                    mine.slot(key).merge(value);
                }
            }
            (mine, other) => *mine = other,
        }
        self
    }
}

/// A type usable with [`Value::get`]: `usize` for vectors, `&str` for
/// tables.
pub trait TreeIndex: private::Sealed {
    #[doc(hidden)]
    fn index_into<'v>(&self, value: &'v Value) -> Option<&'v Value>;
}

impl TreeIndex for usize {
    fn index_into<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        value.as_vector().and_then(|v| v.get(*self))
    }
}

impl TreeIndex for str {
    fn index_into<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        value.as_table().and_then(|t| t.get(self))
    }
}

impl<T: TreeIndex + ?Sized> TreeIndex for &T {
    fn index_into<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        (**self).index_into(value)
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for str {}
    impl<T: Sealed + ?Sized> Sealed for &T {}
}

impl From<Atom> for Value {
    fn from(a: Atom) -> Self {
        Value::Atom(a)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Atom(Atom::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Atom(Atom::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Vector(v)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

/// Strict parse, so `"{a=\"1\"}".parse::<Value>()` works.
impl FromStr for Value {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::parser::parse(s)
    }
}

/// The compact, fully delimited rendering; re-parses to an equal tree.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::printer::Printer::default().print_to_string(self))
    }
}

// Serde bridge: atoms are strings, scalars of other serde types become
// their text rendering (the format has no numeric kinds), vectors are
// sequences, tables are maps with validated keys.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::None => serializer.serialize_unit(),
            Value::Atom(a) => serializer.serialize_str(a.as_str()),
            Value::Vector(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for element in v {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Table(t) => {
                let mut map = serializer.serialize_map(Some(t.len()))?;
                for (k, v) in t.iter() {
                    map.serialize_entry(k.as_str(), v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any canopy value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::from(if value { "true" } else { "false" }))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::from(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::from(value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::from(value.to_string()))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::None)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::None)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(element) = seq.next_element()? {
                    vec.push(element);
                }
                Ok(Value::Vector(vec))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut table = Table::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    let key = crate::Key::new(key).map_err(de::Error::custom)?;
                    table.insert(key, value);
                }
                Ok(Value::Table(table))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn default_is_none() {
        assert_eq!(Value::default().kind(), Kind::None);
        assert!(Value::default().is_none());
    }

    #[test]
    fn be_transmutes_and_is_idempotent() {
        let mut v = Value::from("keep me");
        // same kind: payload survives
        v.be(Kind::Atom);
        assert_eq!(v.as_str(), Some("keep me"));
        // new kind: fresh default payload
        v.be(Kind::Vector);
        assert_eq!(v.as_vector().map(Vec::len), Some(0));
        v.be(Kind::None);
        assert!(v.is_none());
    }

    #[test]
    fn clone_is_deep() {
        let mut original = parse("{a={b=\"1\"}}").unwrap();
        let copy = original.clone();
        original
            .as_table_mut()
            .unwrap()
            .get_mut("a")
            .unwrap()
            .clear();
        assert_eq!(copy.xget("a.b").and_then(|v| v.as_str()), Some("1"));
    }

    #[test]
    fn get_by_index_and_key() {
        let v = parse("{list=[\"a\" \"b\"] n=\"1\"}").unwrap();
        let list = v.get("list").unwrap();
        assert_eq!(list.get(0).and_then(|x| x.as_str()), Some("a"));
        assert_eq!(list.get(2), None);
        assert_eq!(list.get("key"), None); // vector, not table
        assert_eq!(v.get(0), None); // table, not vector
    }

    #[test]
    fn xget_walks_paths() {
        let v = parse("{x={y={z=\"123\"}} list=[[\"a\"] [\"b\" \"c\"]]}").unwrap();
        assert_eq!(v.xget("x.y.z").and_then(|z| z.as_str()), Some("123"));
        assert_eq!(v.xget("list[1][0]").and_then(|z| z.as_str()), Some("b"));
        assert_eq!(v.xget("x.y.q"), None);
        assert_eq!(v.xget("x[0]"), None);
        assert_eq!(v.xget("list[one]"), None);
        assert_eq!(v.xget("x..y"), None);
        assert_eq!(v.xget(""), Some(&v));
    }

    #[test]
    fn merge_tables_recursively() {
        let mut v = parse("{a=\"1\" b=\"2\" t={x=\"1\"}}").unwrap();
        v.merge(parse("{b=\"3\" c=\"4\" t={y=\"2\"}}").unwrap());
        assert_eq!(v, parse("{a=\"1\" b=\"3\" c=\"4\" t={x=\"1\" y=\"2\"}}").unwrap());
    }

    #[test]
    fn merge_replaces_non_tables() {
        let mut v = parse("[\"a\" \"b\"]").unwrap();
        v.merge(parse("{k=\"1\"}").unwrap());
        assert_eq!(v, parse("{k=\"1\"}").unwrap());

        let mut v = parse("{k=\"1\"}").unwrap();
        v.merge(Value::from("flat"));
        assert_eq!(v.as_str(), Some("flat"));
    }

    #[test]
    fn display_round_trips() {
        let v = parse("{a=\"1\" b=[\"x\" \"?\"] c=? d={}}").unwrap();
        assert_eq!(v.to_string().parse::<Value>().unwrap(), v);
    }
}
