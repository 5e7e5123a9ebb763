//! A compact text format for hierarchical values, with a forgiving
//! configuration dialect and a scoped query engine.
//!
//! Every value is one of four kinds: the none value `?`, a text atom,
//! a vector, or a table with ordered string keys. There are no numeric
//! types in the tree; scalars are text and convert on demand at the
//! point of use.
//!
//! ```text
//! {retries="3" hosts=["db1" "db2"] log={level="debug"}}
//! ```
//!
//! # Parsing
//!
//! [`parse`] reads the strict form above: fully delimited, quoted,
//! duplicate keys rejected. [`Parser`] reads the extended configuration
//! dialect, where strings may be bare and keys are paths:
//!
//! ```rust
//! use canopy::{Parser, Value};
//!
//! let mut config = Value::None;
//! Parser::new().parse_keyvals(&mut config, r#"
//!     retries = 3
//!     hosts[+] = db1
//!     hosts[+] = db2
//!     log { level = debug }       # same as log.level = debug
//! "#).unwrap();
//! assert_eq!(config.xget("log.level").and_then(|v| v.as_str()), Some("debug"));
//! ```
//!
//! The extended dialect also supports `!include "file"` to splice
//! another file in, `!erase` to delete an entry, and `!file "path"` for
//! values that are paths relative to the including file. Later
//! assignments override earlier ones, which is what makes layered
//! configuration (defaults file, then site file, then overrides) a
//! matter of parsing into the same [`Value`] repeatedly, or of
//! [`Value::merge`].
//!
//! # Queries
//!
//! [`Value::get`] and [`Value::xget`] are plain lookups returning
//! `Option`. [`Reader`] adds scope-aware search and typed extraction:
//!
//! ```rust
//! use canopy::{parse, Reader};
//!
//! let root = parse(r#"{timeout="30" net={host="db1"}}"#).unwrap();
//! let r = Reader::new(&root);
//! // bare keys fall back through enclosing scopes
//! assert_eq!(r.get("net timeout").unwrap().to::<u32>().unwrap(), 30);
//! let host: String = r.get("net.host").unwrap().to().unwrap();
//! assert_eq!(host, "db1");
//! ```
//!
//! # Printing
//!
//! [`to_string`] gives the canonical compact form, [`to_string_pretty`]
//! an indented block layout; [`Printer`] with [`PrintOptions`] covers
//! the rest (config-file output, leaf-per-line flattening, width
//! wrapping). Printing never fails and compact output re-parses to an
//! equal tree.
//!
//! ```rust
//! use canopy::{canopy, to_string};
//!
//! let v = canopy!({ "a": "1", "b": ? });
//! assert_eq!(to_string(&v), "{a=\"1\"b=?}");
//! ```

pub mod atom;
pub mod error;
pub mod key;
mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod printer;
pub mod reader;
pub mod tokens;
pub mod value;

pub use atom::Atom;
pub use error::{Error, Result};
pub use key::Key;
pub use map::Table;
pub use options::PrintOptions;
pub use parser::{parse, Parser};
pub use printer::Printer;
pub use reader::{Reader, ReaderLog};
pub use value::{Kind, TreeIndex, Value};

use std::path::Path;

/// Parses a file in the extended configuration dialect into a fresh
/// table.
///
/// Equivalent to [`Parser::parse_file`] on a new `Parser`; relative
/// `!include` and `!file` paths resolve against the file's directory.
///
/// # Errors
///
/// IO and parse failures carry the file name and, for nested includes,
/// the chain of including files.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Value> {
    let mut value = Value::None;
    Parser::new().parse_file(&mut value, path)?;
    Ok(value)
}

/// Renders a value in the canonical compact form.
#[must_use]
pub fn to_string(value: &Value) -> String {
    Printer::default().print_to_string(value)
}

/// Renders a value as an indented block.
#[must_use]
pub fn to_string_pretty(value: &Value) -> String {
    Printer::new(PrintOptions::pretty()).print_to_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_print_round_trip() {
        let text = "{a=\"1\"b=[\"x\"\"y\"]c=?}";
        let v = parse(text).unwrap();
        assert_eq!(to_string(&v), text);
    }

    #[test]
    fn pretty_output_has_structure() {
        let v = parse("{a=\"1\"}").unwrap();
        assert_eq!(to_string_pretty(&v), "{\n    a = 1\n}");
    }

    #[test]
    fn parse_file_reads_a_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.cfg");
        std::fs::write(&path, "name = demo\nworkers = 4\n").unwrap();

        let v = parse_file(&path).unwrap();
        assert_eq!(v.get("name").and_then(|x| x.as_str()), Some("demo"));
        assert_eq!(
            Reader::new(&v).get("workers").unwrap().to::<u32>().unwrap(),
            4
        );
    }
}
