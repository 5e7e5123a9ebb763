//! Error types for parsing, printing, and querying canopy trees.
//!
//! There are two families of failure here, and the distinction is
//! load-bearing for callers:
//!
//! - **Input errors**: malformed text, invalid keys, broken includes,
//!   malformed query paths. These carry as much location context as the
//!   parser has (file, 1-based line/column) and, for includes, the whole
//!   chain of including files.
//! - **Lookup errors**: raised by the [`Reader`](crate::reader::Reader)
//!   when a value is absent ([`Error::NotFound`], recoverable with
//!   `set_opt`/defaults) or present but of the wrong shape
//!   ([`Error::TypeMismatch`], [`Error::Convert`]; always errors).
//!
//! [`Value::get`](crate::Value::get) and [`Value::xget`](crate::Value::xget)
//! never return errors; absence is `None` there, making optional lookup the
//! default idiom.

use crate::value::Kind;
use std::fmt;
use thiserror::Error;

/// All the ways canopy operations can fail.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO failure while reading an include file.
    #[error("io error: {0}")]
    Io(String),

    /// Malformed input text, with the position of the offending token.
    #[error("{}:{line}:{column}: {msg}", file.as_deref().unwrap_or("<input>"))]
    Parse {
        file: Option<String>,
        line: usize,
        column: usize,
        msg: String,
    },

    /// A table key that fails the key grammar.
    #[error("malformed key: {0:?}")]
    InvalidKey(String),

    /// Failure inside an included file; wraps the inner error so deep
    /// failures report the full include chain.
    #[error("unable to parse include file {file}: {source}")]
    Include {
        file: String,
        #[source]
        source: Box<Error>,
    },

    /// A reader query path that does not fit the path language.
    #[error("malformed query: {0:?}")]
    MalformedQuery(String),

    /// A reader `get` that failed part-way; wraps the underlying error.
    #[error("failed to get {path:?}: {source}")]
    Query {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Materializing from a lost reader with no default supplied.
    #[error("no value found (search trace:{trace})")]
    NotFound { trace: String },

    /// Found a value, but of the wrong kind for the requested access.
    #[error("expected {expected}, found {found} (search trace:{trace})")]
    TypeMismatch {
        expected: Kind,
        found: Kind,
        trace: String,
    },

    /// Found an atom, but its text does not parse as the requested type.
    #[error("cannot parse {wanted} from {text:?} (search trace:{trace})")]
    Convert {
        wanted: &'static str,
        text: String,
        trace: String,
    },

    /// A fixed-size container extraction with the wrong element count.
    #[error("expected {expected} vector elements, found {found} (search trace:{trace})")]
    ElementCount {
        expected: usize,
        found: usize,
        trace: String,
    },
}

impl Error {
    /// Creates a parse error with line and column information.
    pub fn parse(line: usize, column: usize, msg: impl fmt::Display) -> Self {
        Error::Parse {
            file: None,
            line,
            column,
            msg: msg.to_string(),
        }
    }

    /// Creates a parse error that also names the file being parsed.
    pub fn parse_in(
        file: Option<&str>,
        line: usize,
        column: usize,
        msg: impl fmt::Display,
    ) -> Self {
        Error::Parse {
            file: file.map(str::to_owned),
            line,
            column,
            msg: msg.to_string(),
        }
    }

    /// Creates an I/O error from anything displayable.
    pub fn io(msg: impl fmt::Display) -> Self {
        Error::Io(msg.to_string())
    }

    /// Wraps an error with the include file it came from.
    pub fn include(file: impl Into<String>, source: Error) -> Self {
        Error::Include {
            file: file.into(),
            source: Box::new(source),
        }
    }

    /// True for the "absent but recoverable" case, as opposed to the
    /// "present but wrong" cases.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Query { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_displays_location() {
        let err = Error::parse(3, 14, "expecting a key symbol");
        assert_eq!(err.to_string(), "<input>:3:14: expecting a key symbol");

        let err = Error::parse_in(Some("conf/base.cfg"), 3, 14, "expecting a key symbol");
        assert_eq!(
            err.to_string(),
            "conf/base.cfg:3:14: expecting a key symbol"
        );
    }

    #[test]
    fn include_error_chains() {
        let inner = Error::parse_in(Some("b.cfg"), 2, 1, "expecting a '='");
        let outer = Error::include("a.cfg", Error::include("b.cfg", inner));
        let text = outer.to_string();
        assert!(text.contains("a.cfg"));
        assert!(text.contains("b.cfg"));
        assert!(text.contains("expecting a '='"));
    }

    #[test]
    fn not_found_is_distinguished() {
        let lost = Error::NotFound {
            trace: " x.y".into(),
        };
        assert!(lost.is_not_found());

        let mismatch = Error::TypeMismatch {
            expected: Kind::Table,
            found: Kind::Atom,
            trace: " x".into(),
        };
        assert!(!mismatch.is_not_found());
    }
}
