//! The strict and extended (configuration) grammars.
//!
//! Two entry styles share one recursive-descent core:
//!
//! - [`parse`], the strict grammar. One whole value, no shorthands:
//!
//!   ```text
//!   VALUE  -> ? | "STRING" | [VALUE*] | { KEYVAL* }
//!   KEYVAL -> KEY = VALUE
//!   ```
//!
//!   Reserved characters are `{ } [ ] < > = ?`, the comment leader is `#`.
//!   Duplicate keys and trailing content are errors; the whole value is
//!   built or the parse fails atomically.
//!
//! - [`Parser`], the extended superset used for configuration input. It
//!   adds bare (unquoted) strings, dotted and indexed key paths with
//!   auto-created intermediates, `[+]` append, `!include`, `!erase`,
//!   `!file`, and `{ ... }` namespace blocks after a key:
//!
//!   ```text
//!   redis.hosts[+] = cache1
//!   redis.hosts[+] = cache2
//!   logging { level = debug  sink = stderr }
//!   !include "site-overrides.cfg"
//!   ```
//!
//! The extended parser runs over three reserved-character sets, switched
//! per token by grammatical context: `.` and `=` are punctuation inside a
//! key, `?` only inside a value, and neither between assignments. They are
//! immutable statics, constructed once and passed by reference.
//!
//! [`Parser::parse_keyvals`] applies assignments incrementally: if a
//! sequence fails midway, assignments made before the failure remain
//! applied. Callers that need all-or-nothing behavior parse into a scratch
//! value and [`merge`](crate::Value::merge) on success.

use crate::error::{Error, Result};
use crate::key::Key;
use crate::map::Table;
use crate::tokens::{Syntax, Token, Tokenizer};
use crate::value::{Kind, Value};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// Reserved characters while reading a key path.
pub(crate) static KEY_SYNTAX: Syntax = Syntax::new("{}<>[]!.=", "#");
/// Reserved characters while reading a value.
pub(crate) static VALUE_SYNTAX: Syntax = Syntax::new("{}<>[]!?", "#");
/// Reserved characters between assignments.
pub(crate) static NEUTRAL_SYNTAX: Syntax = Syntax::new("{}<>[]", "#");
/// The strict grammar's single reserved set.
static STRICT_SYNTAX: Syntax = Syntax::new("{}<>[]=?", "#");

/// Hard cap on `!include` nesting. A conservative guard against include
/// loops, not true cycle detection.
const MAX_INCLUDE_DEPTH: usize = 20;

/// Hard cap on value/key nesting, so pathological input fails with an
/// error instead of exhausting the call stack.
const MAX_DEPTH: usize = 128;

/// Strictly parses one whole value.
///
/// No includes, no overrides, no bare strings, no dotted keys. Trailing
/// content after the value is an error, as is a duplicate table key.
///
/// # Examples
///
/// ```rust
/// use canopy::{parse, Kind};
///
/// let v = parse("{retries=\"3\" hosts=[\"a\" \"b\"] opt=?}").unwrap();
/// assert_eq!(v.kind(), Kind::Table);
/// assert!(parse("{a=\"1\"} junk").is_err());
/// assert!(parse("{a=\"1\" a=\"2\"}").is_err());
/// ```
///
/// # Errors
///
/// Any structural violation fails with the 1-based line/column of the
/// offending token.
pub fn parse(input: &str) -> Result<Value> {
    let mut t = Tokenizer::new(input, &STRICT_SYNTAX);
    t.next()?;
    let value = strict_value(&mut t, 0)?;
    if !t.next()?.is_end() {
        return Err(Error::parse(
            t.line(),
            t.column(),
            "extra content after the value",
        ));
    }
    Ok(value)
}

fn strict_value(t: &mut Tokenizer, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(Error::parse(t.line(), t.column(), "nesting depth exceeded"));
    }
    match t.current().clone() {
        Token::Symbol(text) | Token::String(text) => Ok(Value::from(text)),
        Token::Syntax('[') => {
            let mut vector = Vec::new();
            while t.next()?.syntax() != Some(']') {
                vector.push(strict_value(t, depth + 1)?);
            }
            Ok(Value::Vector(vector))
        }
        Token::Syntax('{') => {
            let mut table = Table::new();
            loop {
                match t.next()?.clone() {
                    Token::Syntax('}') => break,
                    Token::Symbol(text) => {
                        let key = Key::new(text)
                            .map_err(|e| Error::parse(t.line(), t.column(), e))?;
                        if table.contains_key(key.as_str()) {
                            return Err(Error::parse(
                                t.line(),
                                t.column(),
                                format!("duplicate key: {key}"),
                            ));
                        }
                        if t.next()?.syntax() != Some('=') {
                            return Err(Error::parse(t.line(), t.column(), "expecting a '='"));
                        }
                        t.next()?;
                        table.insert(key, strict_value(t, depth + 1)?);
                    }
                    _ => {
                        return Err(Error::parse(
                            t.line(),
                            t.column(),
                            "expecting a key symbol",
                        ))
                    }
                }
            }
            Ok(Value::Table(table))
        }
        Token::Syntax('?') => Ok(Value::None),
        Token::Syntax(_) => Err(Error::parse(
            t.line(),
            t.column(),
            "expecting '{' or '[' or '?'",
        )),
        _ => Err(Error::parse(
            t.line(),
            t.column(),
            "expecting '{' or '[' or '?' or string",
        )),
    }
}

/// The extended-grammar parser.
///
/// Holds the include bookkeeping (current file, include depth) that gives
/// relative `!include`/`!file` paths and error messages their context. A
/// fresh `Parser` parses strings; [`Parser::parse_file`] anchors relative
/// paths at the file's own directory.
///
/// The parser updates values rather than replacing them: parsing key-value
/// input into a value that already holds a table overlays the new
/// assignments. Call [`Value::clear`] first when that is not wanted.
#[derive(Debug, Default)]
pub struct Parser {
    include_depth: usize,
    current_file: Option<PathBuf>,
}

impl Parser {
    /// Creates a parser with no current file and zero include depth.
    #[must_use]
    pub fn new() -> Self {
        Parser::default()
    }

    /// Parses one extended-grammar value (bare strings and `!file`
    /// allowed). Trailing content after the value is an error.
    ///
    /// # Errors
    ///
    /// Fails with location context on any structural violation.
    pub fn parse(&self, input: &str) -> Result<Value> {
        let mut t = Tokenizer::new(input, &NEUTRAL_SYNTAX);
        let outcome = (|| {
            t.next_with(&VALUE_SYNTAX)?;
            let value = self.parse_value(&mut t, 0)?;
            if !t.next()?.is_end() {
                return Err(self.err(&t, "extra content after the value"));
            }
            Ok(value)
        })();
        outcome.map_err(|e| self.locate(e))
    }

    /// Parses a sequence of top-level key assignments into `value`.
    ///
    /// `value` is transmuted to a table first (existing table contents are
    /// kept and overlaid). Assignments apply incrementally: a mid-sequence
    /// failure leaves the earlier assignments from this call in place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::{Parser, Value};
    ///
    /// let mut config = Value::None;
    /// Parser::new()
    ///     .parse_keyvals(&mut config, "db.host = local\ndb.ports[+] = 5432")
    ///     .unwrap();
    /// assert_eq!(config.xget("db.ports[0]").and_then(|v| v.as_str()), Some("5432"));
    /// ```
    ///
    /// # Errors
    ///
    /// Fails with location context on any structural violation.
    pub fn parse_keyvals(&self, value: &mut Value, input: &str) -> Result<()> {
        let mut t = Tokenizer::new(input, &NEUTRAL_SYNTAX);
        value.be(Kind::Table);
        let outcome = (|| {
            while !t.next_with(&KEY_SYNTAX)?.is_end() {
                self.parse_keyvalue(value, &mut t, 0)?;
            }
            Ok(())
        })();
        outcome.map_err(|e| self.locate(e))
    }

    /// Parses the contents of a file as a key-value sequence, exactly as
    /// `!include` would: the file must be a regular file, and relative
    /// paths inside it resolve against its directory.
    ///
    /// # Errors
    ///
    /// IO and parse failures are wrapped with the file name; nested
    /// include failures carry the whole chain.
    pub fn parse_file(&self, value: &mut Value, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let sub = Parser {
            include_depth: self.include_depth + 1,
            current_file: Some(path.to_path_buf()),
        };
        sub.read_file(value, path)
    }

    // An error at the current token, tagged with the current file.
    fn err(&self, t: &Tokenizer, msg: impl std::fmt::Display) -> Error {
        Error::Parse {
            file: self.file_name(),
            line: t.line(),
            column: t.column(),
            msg: msg.to_string(),
        }
    }

    // Fills the current file into location-bearing errors that lack one
    // (those raised inside the tokenizer).
    fn locate(&self, e: Error) -> Error {
        match e {
            Error::Parse {
                file: None,
                line,
                column,
                msg,
            } => Error::Parse {
                file: self.file_name(),
                line,
                column,
                msg,
            },
            other => other,
        }
    }

    fn file_name(&self) -> Option<String> {
        self.current_file.as_ref().map(|p| p.display().to_string())
    }

    // After a '!' token: reads the special symbol ("include", "erase",
    // "file") under the neutral syntax.
    fn expect_special(&self, t: &mut Tokenizer) -> Result<String> {
        match t.next()?.clone() {
            Token::Symbol(s) => Ok(s),
            _ => Err(self.err(t, "expecting a special symbol")),
        }
    }

    fn parse_keyvalue(&self, value: &mut Value, t: &mut Tokenizer, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(self.err(t, "nesting depth exceeded"));
        }

        // check for !include before anything key-like
        if t.current().syntax() == Some('!') {
            let special = self.expect_special(t)?;
            if special != "include" {
                return Err(self.err(t, format!("unknown special token: {special}")));
            }
            t.next()?;
            return match t.current().clone() {
                Token::Symbol(name) | Token::String(name) => self.include_file(value, &name, t),
                _ => Err(self.err(t, "!include expected a string or quoted string")),
            };
        }

        let key = match t.current().clone() {
            Token::Symbol(text) => Key::new(text).map_err(|e| self.err(t, e))?,
            _ => return Err(self.err(t, "expecting a key symbol")),
        };
        let table = value.make_table();
        t.next_with(&KEY_SYNTAX)?;

        // possible special syntax for !erase
        if t.current().syntax() == Some('!') {
            let special = self.expect_special(t)?;
            if special == "erase" {
                table.remove(key.as_str());
                return Ok(());
            }
            return Err(self.err(t, format!("unknown special token: {special}")));
        }

        self.descend(table.slot(key), t, depth + 1)
    }

    // Follows the rest of a key path (`[i]`, `.k`, `{`, `=`) down to the
    // slot it addresses, then assigns or erases.
    fn descend(&self, slot: &mut Value, t: &mut Tokenizer, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(self.err(t, "nesting depth exceeded"));
        }
        match t.current().syntax() {
            Some('[') => {
                let vector = slot.make_vector();
                let offset = match t.next_with(&KEY_SYNTAX)?.clone() {
                    Token::Symbol(s) if s == "+" => vector.len(),
                    Token::Symbol(s) => s
                        .parse::<usize>()
                        .map_err(|_| self.err(t, format!("unable to parse vector index: {s:?}")))?,
                    _ => return Err(self.err(t, "expecting a vector index")),
                };
                if t.next_with(&KEY_SYNTAX)?.syntax() != Some(']') {
                    return Err(self.err(t, "expecting ']'"));
                }
                match offset.cmp(&vector.len()) {
                    Ordering::Equal => vector.push(Value::None),
                    Ordering::Greater => {
                        return Err(self.err(t, "non-contiguous vector set not allowed"))
                    }
                    Ordering::Less => {}
                }
                t.next_with(&KEY_SYNTAX)?;

                // possible special syntax for !erase
                if t.current().syntax() == Some('!') {
                    let special = self.expect_special(t)?;
                    if special == "erase" {
                        vector.remove(offset);
                        return Ok(());
                    }
                    return Err(self.err(t, format!("unknown special token: {special}")));
                }

                self.descend(&mut vector[offset], t, depth + 1)
            }
            Some('.') => {
                t.next_with(&KEY_SYNTAX)?;
                self.parse_keyvalue(slot, t, depth + 1)
            }
            Some('{') => {
                // namespace block: keys inside land under the prefix
                slot.be(Kind::Table);
                while t.next_with(&KEY_SYNTAX)?.syntax() != Some('}') {
                    self.parse_keyvalue(slot, t, depth + 1)?;
                }
                Ok(())
            }
            Some('=') => {
                t.next_with(&VALUE_SYNTAX)?;
                *slot = self.parse_value(t, depth + 1)?;
                Ok(())
            }
            _ => Err(self.err(t, "expecting '.' or '=' or '{'")),
        }
    }

    fn parse_value(&self, t: &mut Tokenizer, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(self.err(t, "nesting depth exceeded"));
        }

        // check for the special form !file
        if t.current().syntax() == Some('!') {
            let special = self.expect_special(t)?;
            if special != "file" {
                return Err(self.err(t, format!("unknown special token: {special}")));
            }
            t.next()?;
            return match t.current().clone() {
                Token::Symbol(name) | Token::String(name) => {
                    Ok(Value::from(self.resolve(&name).display().to_string()))
                }
                _ => Err(self.err(t, "!file expected a string or quoted string")),
            };
        }

        match t.current().clone() {
            Token::Symbol(text) | Token::String(text) => Ok(Value::from(text)),
            Token::Syntax('[') => {
                let mut vector = Vec::new();
                while t.next_with(&VALUE_SYNTAX)?.syntax() != Some(']') {
                    vector.push(self.parse_value(t, depth + 1)?);
                }
                Ok(Value::Vector(vector))
            }
            Token::Syntax('{') => {
                let mut value = Value::Table(Table::new());
                while t.next_with(&KEY_SYNTAX)?.syntax() != Some('}') {
                    self.parse_keyvalue(&mut value, t, depth + 1)?;
                }
                Ok(value)
            }
            Token::Syntax('?') => Ok(Value::None),
            Token::Syntax(_) => Err(self.err(t, "expecting '{' or '[' or '?'")),
            _ => Err(self.err(t, "expecting '{' or '[' or '?' or string")),
        }
    }

    // Resolves a path mentioned by `!include`/`!file` against the
    // directory of the file currently being parsed.
    fn resolve(&self, name: &str) -> PathBuf {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            return candidate.to_path_buf();
        }
        match self.current_file.as_deref().and_then(Path::parent) {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(candidate),
            _ => candidate.to_path_buf(),
        }
    }

    fn include_file(&self, value: &mut Value, name: &str, t: &Tokenizer) -> Result<()> {
        if name.is_empty() {
            return Err(self.err(t, "include filename is empty"));
        }
        if self.include_depth >= MAX_INCLUDE_DEPTH {
            return Err(self.err(t, "include depth exceeded"));
        }
        let path = self.resolve(name);
        tracing::debug!(file = %path.display(), depth = self.include_depth + 1, "including file");
        let sub = Parser {
            include_depth: self.include_depth + 1,
            current_file: Some(path.clone()),
        };
        sub.read_file(value, &path)
    }

    // Reads and parses `path` as a key-value sequence, wrapping any
    // failure with the file name so nested includes report the chain.
    fn read_file(&self, value: &mut Value, path: &Path) -> Result<()> {
        let outcome = (|| {
            // an ifstream-style open happily reads a directory as empty
            // input; reject anything that is not a regular file up front
            let meta =
                fs::metadata(path).map_err(|e| Error::io(format!("unable to stat file: {e}")))?;
            if !meta.is_file() {
                return Err(Error::io("not a regular file"));
            }
            let text = fs::read_to_string(path)
                .map_err(|e| Error::io(format!("unable to read file: {e}")))?;
            self.parse_keyvals(value, &text)
        })();
        outcome.map_err(|e| Error::include(path.display().to_string(), e))
    }
}
