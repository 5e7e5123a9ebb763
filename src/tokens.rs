//! Character-level tokenizer shared by the parsers and the query engine.
//!
//! The tokenizer turns text into a stream of typed [`Token`]s under a
//! [`Syntax`] descriptor that says which characters are punctuation and
//! which start a line comment. The quote set (`"`, `'`, and backtick) is
//! fixed across all syntaxes.
//!
//! A different syntax may be supplied per [`Tokenizer::next_with`] call.
//! The parser leans on this to switch reserved-character sets by
//! grammatical context: `.` and `=` are punctuation while reading a key,
//! but perfectly good symbol characters inside a value.
//!
//! ```rust
//! use canopy::tokens::{Syntax, Token, Tokenizer};
//!
//! static SYN: Syntax = Syntax::new("{}[]=", "#");
//!
//! let mut t = Tokenizer::new("a = \"b c\" # trailing comment", &SYN);
//! assert_eq!(t.next().unwrap(), &Token::Symbol("a".into()));
//! assert_eq!(t.next().unwrap(), &Token::Syntax('='));
//! assert_eq!(t.next().unwrap(), &Token::String("b c".into()));
//! assert_eq!(t.next().unwrap(), &Token::End);
//! ```

use crate::error::{Error, Result};
use std::fmt;

/// Quote characters, common to every syntax.
const QUOTES: &str = "\"'`";

/// A reserved-character set: which characters are single-character
/// punctuation tokens and which begin a comment running to end of line.
///
/// Syntaxes are plain immutable data, cheap to declare as statics and pass
/// by reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Syntax {
    punctuation: &'static str,
    comment: &'static str,
}

impl Syntax {
    /// Declares a syntax from its punctuation and comment-leader sets.
    #[must_use]
    pub const fn new(punctuation: &'static str, comment: &'static str) -> Self {
        Syntax {
            punctuation,
            comment,
        }
    }

    /// True if `c` is a single-character punctuation token.
    #[inline]
    #[must_use]
    pub fn is_punctuation(&self, c: char) -> bool {
        self.punctuation.contains(c)
    }

    /// True if `c` starts a line comment.
    #[inline]
    #[must_use]
    pub fn is_comment(&self, c: char) -> bool {
        self.comment.contains(c)
    }

    /// True if `c` opens (and closes) a quoted string.
    #[inline]
    #[must_use]
    pub fn is_quote(&self, c: char) -> bool {
        QUOTES.contains(c)
    }

    /// True if `c` cannot appear in a bare symbol: punctuation, quote, or
    /// comment leader.
    #[inline]
    #[must_use]
    pub fn is_reserved(&self, c: char) -> bool {
        self.is_punctuation(c) || self.is_quote(c) || self.is_comment(c)
    }
}

/// One lexical unit of input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// End of input.
    End,
    /// A single punctuation character from the active syntax.
    Syntax(char),
    /// A maximal run of non-whitespace, non-reserved characters.
    Symbol(String),
    /// A quote-delimited string, escapes resolved.
    String(String),
}

impl Token {
    /// The punctuation character, or `None` for non-punctuation tokens.
    #[must_use]
    pub fn syntax(&self) -> Option<char> {
        match self {
            Token::Syntax(c) => Some(*c),
            _ => None,
        }
    }

    /// The text of a symbol or string token.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Symbol(s) | Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// True at end of input.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Token::End)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::End => f.write_str("<end of input>"),
            Token::Syntax(c) => write!(f, "'{c}'"),
            Token::Symbol(s) => write!(f, "{s:?}"),
            Token::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Produces [`Token`]s from text, tracking 1-based line and column.
///
/// The usual loop is `while !t.next_with(&syn)?.is_end() { ... }`, matching
/// on [`Tokenizer::current`].
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    syntax: &'static Syntax,
    current: Token,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer with a default syntax for plain [`next`] calls.
    ///
    /// [`next`]: Tokenizer::next
    #[must_use]
    pub fn new(input: &'a str, syntax: &'static Syntax) -> Self {
        Tokenizer {
            input,
            pos: 0,
            line: 1,
            column: 1,
            syntax,
            current: Token::End,
        }
    }

    /// The most recently read token.
    #[must_use]
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Current line, 1-based.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column, 1-based.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Reads the next token under the constructor's syntax.
    ///
    /// # Errors
    ///
    /// Fails on an unterminated quoted string.
    pub fn next(&mut self) -> Result<&Token> {
        let syntax = self.syntax;
        self.next_with(syntax)
    }

    /// Reads the next token under the supplied syntax.
    ///
    /// # Errors
    ///
    /// Fails on an unterminated quoted string.
    pub fn next_with(&mut self, syntax: &Syntax) -> Result<&Token> {
        // mop up whitespace and comments
        loop {
            while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
                self.next_char();
            }
            match self.peek_char() {
                Some(c) if syntax.is_comment(c) => {
                    while matches!(self.peek_char(), Some(c) if c != '\n') {
                        self.next_char();
                    }
                }
                _ => break,
            }
        }

        self.current = match self.peek_char() {
            None => Token::End,
            Some(c) if syntax.is_punctuation(c) => {
                self.next_char();
                Token::Syntax(c)
            }
            Some(c) if syntax.is_quote(c) => {
                self.next_char();
                Token::String(self.read_string(c)?)
            }
            Some(c) => {
                self.next_char();
                let mut buf = String::new();
                buf.push(c);
                while let Some(c) = self.peek_char() {
                    if c.is_whitespace() || syntax.is_reserved(c) {
                        break;
                    }
                    buf.push(c);
                    self.next_char();
                }
                Token::Symbol(buf)
            }
        };
        Ok(&self.current)
    }

    // Reads up to the closing `quote`; a backslash escapes the character
    // after it (the quote and the backslash itself, in practice).
    fn read_string(&mut self, quote: char) -> Result<String> {
        let mut buf = String::new();
        let mut escaped = false;
        loop {
            match self.next_char() {
                None => {
                    return Err(Error::parse(
                        self.line,
                        self.column,
                        "unterminated string",
                    ))
                }
                Some(c) if escaped => {
                    buf.push(c);
                    escaped = false;
                }
                Some(c) if c == quote => return Ok(buf),
                Some('\\') => escaped = true,
                Some(c) => buf.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SYN: Syntax = Syntax::new("{}[]=?", "#");

    fn tokens(input: &str) -> Vec<Token> {
        let mut t = Tokenizer::new(input, &SYN);
        let mut out = Vec::new();
        loop {
            let tok = t.next().unwrap().clone();
            let end = tok.is_end();
            out.push(tok);
            if end {
                break;
            }
        }
        out
    }

    #[test]
    fn symbols_and_punctuation() {
        assert_eq!(
            tokens("{a=b}"),
            vec![
                Token::Syntax('{'),
                Token::Symbol("a".into()),
                Token::Syntax('='),
                Token::Symbol("b".into()),
                Token::Syntax('}'),
                Token::End,
            ]
        );
    }

    #[test]
    fn symbols_end_at_reserved_chars() {
        assert_eq!(
            tokens("ab#cd\nef"),
            vec![Token::Symbol("ab".into()), Token::Symbol("ef".into()), Token::End]
        );
    }

    #[test]
    fn three_quote_styles() {
        for input in ["\"x y\"", "'x y'", "`x y`"] {
            assert_eq!(
                tokens(input),
                vec![Token::String("x y".into()), Token::End],
                "input {input:?}"
            );
        }
    }

    #[test]
    fn backslash_escapes() {
        assert_eq!(
            tokens(r#""a\"b\\c""#),
            vec![Token::String(r#"a"b\c"#.into()), Token::End]
        );
        // a quote of a different flavor needs no escape
        assert_eq!(
            tokens(r#""it's""#),
            vec![Token::String("it's".into()), Token::End]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut t = Tokenizer::new("\"never closed", &SYN);
        let err = t.next().unwrap_err();
        assert!(err.to_string().contains("unterminated string"));
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            tokens("a # b c d\ne"),
            vec![Token::Symbol("a".into()), Token::Symbol("e".into()), Token::End]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let mut t = Tokenizer::new("a\n  bb", &SYN);
        t.next().unwrap();
        assert_eq!((t.line(), t.column()), (1, 2));
        t.next().unwrap();
        assert_eq!((t.line(), t.column()), (2, 5));
    }

    #[test]
    fn per_call_syntax_switch() {
        static BARE: Syntax = Syntax::new("", "");
        let mut t = Tokenizer::new("a=b", &SYN);
        // under a syntax with no punctuation, '=' is a symbol character
        assert_eq!(t.next_with(&BARE).unwrap(), &Token::Symbol("a=b".into()));
    }
}
