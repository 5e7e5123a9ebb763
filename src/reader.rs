//! Scoped traversal and typed extraction.
//!
//! A [`Reader`] is a lightweight cursor over a value tree. Beyond plain
//! path descent it keeps a stack of *scopes*: every table entered by key
//! becomes a fallback namespace, and a bare key in a query (no leading
//! `.`) searches those scopes from innermost to outermost. That makes
//! "defaults at an outer level, overrides further in" configuration
//! layouts read naturally:
//!
//! ```rust
//! use canopy::{parse, Reader};
//!
//! let root = parse("{timeout=\"30\" net={host=\"db1\"}}").unwrap();
//! let r = Reader::new(&root);
//!
//! // `net` has no timeout of its own; the bare key falls back to the
//! // outer scope
//! assert_eq!(r.get("net timeout").unwrap().to::<u32>().unwrap(), 30);
//! // a dotted key looks only in the table it names
//! assert!(r.get("net.timeout").unwrap().lost());
//! ```
//!
//! Query syntax: a bare `KEY` bounces through the scopes, `.KEY` descends
//! strictly into the current table, `[N]` indexes the current vector, and
//! `!` drops accumulated scopes when the search is lost, making the loss
//! permanent. Entries of kind `None` count as missing everywhere.
//!
//! Missing keys leave the reader [`lost`](Reader::lost) rather than
//! failing, so optional lookups stay cheap; extraction from a lost reader
//! is where errors surface. Descending *through* a non-table, or indexing
//! a non-vector, is a kind error immediately.

use crate::error::{Error, Result};
use crate::map::Table;
use crate::tokens::{Syntax, Token, Tokenizer};
use crate::value::{Kind, Value};
use std::any::type_name;
use std::str::FromStr;

static QUERY_SYNTAX: Syntax = Syntax::new("[].!", "");

/// Observer for value extraction, handy for dumping the effective
/// configuration a program actually read.
pub trait ReaderLog {
    /// A value was read at `trace`.
    fn on_value(&self, trace: &str, value: &str);
    /// An optional lookup at `trace` found nothing.
    fn on_missing(&self, trace: &str);
}

/// A cursor over a value tree with scoped lookup.
///
/// Cheap to clone; [`Reader::get`] clones and advances, leaving the
/// original in place. The trace of every step taken survives into error
/// messages, so a failed deep lookup reports where it went.
#[derive(Clone)]
pub struct Reader<'a> {
    // None marks a lost search; never points at a Value::None.
    current: Option<&'a Value>,
    // bounce scopes, innermost last
    scopes: Vec<&'a Table>,
    trace: String,
    log: Option<&'a dyn ReaderLog>,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at `root`. A root of kind `None`
    /// starts the reader lost.
    #[must_use]
    pub fn new(root: &'a Value) -> Self {
        Reader {
            current: match root {
                Value::None => None,
                other => Some(other),
            },
            scopes: Vec::new(),
            trace: String::new(),
            log: None,
        }
    }

    /// Attaches an extraction observer, inherited by readers derived
    /// from this one.
    #[must_use]
    pub fn with_logger(mut self, log: &'a dyn ReaderLog) -> Self {
        self.log = Some(log);
        self
    }

    /// True while the cursor points at data.
    #[must_use]
    pub fn found(&self) -> bool {
        self.current.is_some()
    }

    /// True once a lookup has missed.
    #[must_use]
    pub fn lost(&self) -> bool {
        self.current.is_none()
    }

    /// The kind under the cursor, or `None` when lost.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        self.current.map(Value::kind)
    }

    /// Every step this reader (and the readers it was derived from) has
    /// taken, in query syntax.
    #[must_use]
    pub fn trace(&self) -> &str {
        &self.trace
    }

    fn top(&self) -> Result<&'a Value> {
        self.current.ok_or_else(|| Error::NotFound {
            trace: self.trace.clone(),
        })
    }

    fn mismatch(&self, expected: Kind, found: Kind) -> Error {
        Error::TypeMismatch {
            expected,
            found,
            trace: self.trace.clone(),
        }
    }

    fn table(&self) -> Result<&'a Table> {
        match self.top()? {
            Value::Table(t) => Ok(t),
            other => Err(self.mismatch(Kind::Table, other.kind())),
        }
    }

    fn vector(&self) -> Result<&'a [Value]> {
        match self.top()? {
            Value::Vector(v) => Ok(v),
            other => Err(self.mismatch(Kind::Vector, other.kind())),
        }
    }

    fn atom(&self) -> Result<&'a str> {
        match self.top()? {
            Value::Atom(a) => Ok(a),
            other => Err(self.mismatch(Kind::Atom, other.kind())),
        }
    }

    // Strict descent by key: the current table becomes a scope, and only
    // it is searched. A lost reader stays lost and gains no scope.
    fn descend_key(&mut self, key: &str) -> Result<()> {
        self.trace.push('.');
        self.trace.push_str(key);
        if self.lost() {
            return Ok(());
        }
        let scope = self.table()?;
        self.scopes.push(scope);
        self.current = scope.get(key).filter(|v| !v.is_none());
        Ok(())
    }

    // Index descent. Never pushes a scope; out of range or a None entry
    // loses the search.
    fn descend_index(&mut self, index: usize) -> Result<()> {
        use std::fmt::Write;
        let _ = write!(self.trace, "[{index}]");
        if self.lost() {
            return Ok(());
        }
        let v = self.vector()?;
        self.current = v.get(index).filter(|e| !e.is_none());
        Ok(())
    }

    // Scoped lookup: search scopes innermost to outermost. A hit trims
    // the scopes inside the match but keeps the matching one. Runs even
    // when lost, so a surviving outer scope can recover the search.
    fn bounce(&mut self, key: &str) -> Result<()> {
        self.trace.push(' ');
        self.trace.push_str(key);
        if self.found() {
            let scope = self.table()?;
            self.scopes.push(scope);
        }
        for i in (0..self.scopes.len()).rev() {
            let scope: &'a Table = self.scopes[i];
            if let Some(hit) = scope.get(key).filter(|v| !v.is_none()) {
                self.scopes.truncate(i + 1);
                self.current = Some(hit);
                return Ok(());
            }
        }
        self.current = None;
        Ok(())
    }

    fn malformed(path: &str) -> Error {
        Error::MalformedQuery(path.to_string())
    }

    fn follow(&mut self, path: &str) -> Result<()> {
        let mut t = Tokenizer::new(path, &QUERY_SYNTAX);
        t.next()?;
        while !t.current().is_end() {
            match t.current().clone() {
                Token::Symbol(key) => {
                    self.bounce(&key)?;
                    t.next()?;
                }
                Token::Syntax('.') => match t.next()?.clone() {
                    Token::Symbol(key) => {
                        self.descend_key(&key)?;
                        t.next()?;
                    }
                    _ => return Err(Self::malformed(path)),
                },
                Token::Syntax('!') => {
                    if self.lost() {
                        self.scopes.clear();
                    }
                    t.next()?;
                }
                Token::Syntax('[') => {
                    let index = match t.next()?.clone() {
                        Token::Symbol(s) => {
                            s.parse::<usize>().map_err(|_| Self::malformed(path))?
                        }
                        _ => return Err(Self::malformed(path)),
                    };
                    if t.next()?.syntax() != Some(']') {
                        return Err(Self::malformed(path));
                    }
                    t.next()?;
                    self.descend_index(index)?;
                }
                _ => return Err(Self::malformed(path)),
            }
        }
        Ok(())
    }

    /// Runs a query from the current position and returns the resulting
    /// reader. A miss gives a lost reader; a malformed query or a kind
    /// error along the way fails.
    ///
    /// # Errors
    ///
    /// Failures are wrapped with the query text; the source carries the
    /// step trace.
    pub fn get(&self, path: &str) -> Result<Reader<'a>> {
        let mut next = self.clone();
        match next.follow(path) {
            Ok(()) => {
                if next.lost() {
                    tracing::debug!(path, trace = next.trace(), "query found nothing");
                }
                Ok(next)
            }
            Err(e) => Err(Error::Query {
                path: path.to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// Descends into element `i` of the current vector.
    ///
    /// # Errors
    ///
    /// Fails when the cursor is not on a vector.
    pub fn at(&self, i: usize) -> Result<Reader<'a>> {
        let mut next = self.clone();
        next.descend_index(i)?;
        Ok(next)
    }

    /// The length of the current vector.
    ///
    /// # Errors
    ///
    /// Fails when the cursor is lost or not on a vector.
    pub fn len(&self) -> Result<usize> {
        Ok(self.vector()?.len())
    }

    /// True when the cursor is on an empty vector.
    ///
    /// # Errors
    ///
    /// Fails when the cursor is lost or not on a vector.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.vector()?.is_empty())
    }

    /// The atom text under the cursor.
    ///
    /// # Errors
    ///
    /// Fails when the cursor is lost ([`Error::NotFound`] with the step
    /// trace) or on a non-atom.
    pub fn text(&self) -> Result<&'a str> {
        let text = self.atom()?;
        if let Some(log) = self.log {
            log.on_value(&self.trace, text);
        }
        Ok(text)
    }

    /// Parses the atom under the cursor as a `T`.
    ///
    /// ```rust
    /// use canopy::{parse, Reader};
    ///
    /// let root = parse("{port=\"5432\" debug=\"true\"}").unwrap();
    /// let r = Reader::new(&root);
    /// assert_eq!(r.get("port").unwrap().to::<u16>().unwrap(), 5432);
    /// assert!(r.get("debug").unwrap().to::<bool>().unwrap());
    /// ```
    ///
    /// # Errors
    ///
    /// Fails when lost, on a non-atom, or when the text does not parse
    /// as `T`.
    pub fn to<T: FromStr>(&self) -> Result<T> {
        let text = self.text()?;
        text.parse().map_err(|_| Error::Convert {
            wanted: type_name::<T>(),
            text: text.to_string(),
            trace: self.trace.clone(),
        })
    }

    /// Like [`Reader::to`], but a lost cursor yields `default` instead
    /// of an error.
    ///
    /// # Errors
    ///
    /// Kind and conversion errors still fail.
    pub fn to_or<T: FromStr>(&self, default: T) -> Result<T> {
        if self.lost() {
            if let Some(log) = self.log {
                log.on_missing(&self.trace);
            }
            return Ok(default);
        }
        self.to()
    }

    /// Parses the atom under the cursor into `slot`.
    ///
    /// # Errors
    ///
    /// Same failures as [`Reader::to`].
    pub fn set<T: FromStr>(&self, slot: &mut T) -> Result<()> {
        *slot = self.to()?;
        Ok(())
    }

    /// Parses into `slot` only when the cursor found something; reports
    /// whether the assignment happened. The usual shape for optional
    /// settings with defaults already in place.
    ///
    /// # Errors
    ///
    /// Kind and conversion errors still fail.
    pub fn set_opt<T: FromStr>(&self, slot: &mut T) -> Result<bool> {
        if self.lost() {
            if let Some(log) = self.log {
                log.on_missing(&self.trace);
            }
            return Ok(false);
        }
        self.set(slot)?;
        Ok(true)
    }

    /// Parses every element of the current vector into a collection.
    ///
    /// ```rust
    /// use canopy::{parse, Reader};
    /// use std::collections::BTreeSet;
    ///
    /// let root = parse("{primes=[\"2\" \"3\" \"5\"]}").unwrap();
    /// let r = Reader::new(&root).get("primes").unwrap();
    /// let primes: BTreeSet<u32> = r.collect().unwrap();
    /// assert!(primes.contains(&5));
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on a non-vector cursor or when any element fails to parse.
    pub fn collect<T, C>(&self) -> Result<C>
    where
        T: FromStr,
        C: FromIterator<T>,
    {
        (0..self.len()?).map(|i| self.at(i)?.to::<T>()).collect()
    }

    /// [`Reader::collect`] into a `Vec`.
    ///
    /// # Errors
    ///
    /// Same failures as [`Reader::collect`].
    pub fn to_vec<T: FromStr>(&self) -> Result<Vec<T>> {
        self.collect()
    }

    /// Parses the current vector into a fixed-size array; the element
    /// count must match exactly.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ElementCount`] on a length mismatch, plus the
    /// failures of [`Reader::collect`].
    pub fn to_array<T: FromStr, const N: usize>(&self) -> Result<[T; N]> {
        let found = self.len()?;
        if found != N {
            return Err(Error::ElementCount {
                expected: N,
                found,
                trace: self.trace.clone(),
            });
        }
        let elements: Vec<T> = self.to_vec()?;
        match elements.try_into() {
            Ok(array) => Ok(array),
            Err(_) => Err(Error::ElementCount {
                expected: N,
                found,
                trace: self.trace.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("kind", &self.kind())
            .field("scopes", &self.scopes.len())
            .field("trace", &self.trace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::cell::RefCell;

    fn nested() -> Value {
        parse("{x={y={z=\"123\"}} z=\"345\"}").unwrap()
    }

    fn layered() -> Value {
        parse("{x={t=\"f\" v={} r=\"11\" f=\"10\"}}").unwrap()
    }

    #[test]
    fn bare_keys_bounce_through_scopes() {
        let root = nested();
        let r = Reader::new(&root);
        // `x` has no `z`, so the bare key falls back to the root scope
        assert_eq!(r.get("x z").unwrap().to::<i32>().unwrap(), 345);
        // after bouncing back out to `x`, `z` again resolves at the root
        assert_eq!(r.get("x.y x z").unwrap().to::<i32>().unwrap(), 345);
    }

    #[test]
    fn dotted_keys_search_one_table_only() {
        let root = nested();
        let r = Reader::new(&root);
        assert!(r.get("x.z").unwrap().lost());
        assert_eq!(r.get("x.y.z").unwrap().to::<i32>().unwrap(), 123);
    }

    #[test]
    fn lost_searches_recover_through_surviving_scopes() {
        let root = nested();
        let r = Reader::new(&root);
        // `x.z` is lost, but the scopes from the walk survive, so the
        // next bare `x` finds its way back
        assert_eq!(r.get("x.z x.y.z").unwrap().to::<i32>().unwrap(), 123);
    }

    #[test]
    fn bouncing_off_an_atom_is_a_kind_error() {
        let root = nested();
        let r = Reader::new(&root);
        let err = r.get("x.y.z z").unwrap_err();
        assert!(err.to_string().contains("expected table"), "{err}");
    }

    #[test]
    fn scope_layering_battery() {
        let root = layered();
        let r = Reader::new(&root);
        assert_eq!(r.get("x.v r").unwrap().to::<i32>().unwrap(), 11);
        assert_eq!(r.get("x.w r").unwrap().to::<i32>().unwrap(), 11);
        assert_eq!(r.get("x.v.w r").unwrap().to::<i32>().unwrap(), 11);
        assert!(r.get("x.v.r").unwrap().lost());
    }

    #[test]
    fn bang_makes_a_loss_permanent() {
        let root = layered();
        let r = Reader::new(&root);
        // without `!`, the lost `x.w` bounces back to `x` and finds `r`
        assert_eq!(r.get("x.w r").unwrap().to::<i32>().unwrap(), 11);
        // with it, the scopes are gone and nothing can recover
        let lost = r.get("x.w! r").unwrap();
        assert!(lost.lost());
        let err = lost.text().unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn none_entries_count_as_missing() {
        let root = parse("{a=? b=[\"1\" ?]}").unwrap();
        let r = Reader::new(&root);
        assert!(r.get("a").unwrap().lost());
        assert!(r.get("b[1]").unwrap().lost());
        assert!(r.get("b[0]").unwrap().found());
    }

    #[test]
    fn reader_on_a_none_root_starts_lost() {
        let root = Value::None;
        let r = Reader::new(&root);
        assert!(r.lost());
        assert!(r.get("anything").unwrap().lost());
    }

    #[test]
    fn index_descent() {
        let root = parse("{v=[\"10\" \"20\" \"30\"]}").unwrap();
        let r = Reader::new(&root).get("v").unwrap();
        assert_eq!(r.len().unwrap(), 3);
        assert_eq!(r.at(1).unwrap().to::<i32>().unwrap(), 20);
        assert!(r.at(9).unwrap().lost());
        assert_eq!(r.get("[2]").unwrap().to::<i32>().unwrap(), 30);
    }

    #[test]
    fn malformed_queries_fail() {
        let root = nested();
        let r = Reader::new(&root);
        for path in ["x.", "[", "[]", "[x]", "x]", ".", "[1"] {
            let err = r.get(path).unwrap_err();
            assert!(matches!(err, Error::Query { .. }), "path {path:?}: {err}");
        }
    }

    #[test]
    fn typed_extraction_and_conversion_errors() {
        let root = parse("{n=\"42\" f=\"2.5\" b=\"true\" s=\"word\"}").unwrap();
        let r = Reader::new(&root);
        assert_eq!(r.get("n").unwrap().to::<u64>().unwrap(), 42);
        assert_eq!(r.get("f").unwrap().to::<f64>().unwrap(), 2.5);
        assert!(r.get("b").unwrap().to::<bool>().unwrap());
        assert_eq!(r.get("s").unwrap().text().unwrap(), "word");

        let err = r.get("s").unwrap().to::<i32>().unwrap_err();
        match err {
            Error::Convert { text, .. } => assert_eq!(text, "word"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn defaults_and_optional_sets() {
        let root = parse("{present=\"7\"}").unwrap();
        let r = Reader::new(&root);
        assert_eq!(r.get("present").unwrap().to_or(0).unwrap(), 7);
        assert_eq!(r.get("absent").unwrap().to_or(13).unwrap(), 13);

        let mut slot = 1u32;
        assert!(r.get("present").unwrap().set_opt(&mut slot).unwrap());
        assert_eq!(slot, 7);
        assert!(!r.get("absent").unwrap().set_opt(&mut slot).unwrap());
        assert_eq!(slot, 7);
    }

    #[test]
    fn container_extraction() {
        let root = parse("{v=[\"1\" \"2\" \"3\"]}").unwrap();
        let r = Reader::new(&root).get("v").unwrap();
        assert_eq!(r.to_vec::<i32>().unwrap(), vec![1, 2, 3]);
        assert_eq!(r.to_array::<i32, 3>().unwrap(), [1, 2, 3]);

        let err = r.to_array::<i32, 2>().unwrap_err();
        assert!(matches!(err, Error::ElementCount { expected: 2, found: 3, .. }));
        let err = r.to_array::<i32, 4>().unwrap_err();
        assert!(matches!(err, Error::ElementCount { expected: 4, found: 3, .. }));
    }

    struct Capture {
        values: RefCell<Vec<(String, String)>>,
        missing: RefCell<Vec<String>>,
    }

    impl ReaderLog for Capture {
        fn on_value(&self, trace: &str, value: &str) {
            self.values
                .borrow_mut()
                .push((trace.to_string(), value.to_string()));
        }
        fn on_missing(&self, trace: &str) {
            self.missing.borrow_mut().push(trace.to_string());
        }
    }

    #[test]
    fn logger_sees_reads_and_misses() {
        let root = parse("{a=\"1\"}").unwrap();
        let capture = Capture {
            values: RefCell::new(Vec::new()),
            missing: RefCell::new(Vec::new()),
        };
        let r = Reader::new(&root).with_logger(&capture);
        assert_eq!(r.get("a").unwrap().to::<i32>().unwrap(), 1);
        assert_eq!(r.get("b").unwrap().to_or(5).unwrap(), 5);

        let values = capture.values.borrow();
        assert_eq!(values.as_slice(), [(" a".to_string(), "1".to_string())]);
        let missing = capture.missing.borrow();
        assert_eq!(missing.as_slice(), [" b".to_string()]);
    }

    #[test]
    fn trace_records_every_step() {
        let root = parse("{x={v=[\"5\"]}}").unwrap();
        let r = Reader::new(&root).get("x.v[0]").unwrap();
        assert_eq!(r.trace(), " x.v[0]");
        assert_eq!(r.to::<i32>().unwrap(), 5);
    }
}
