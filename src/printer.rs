//! Deterministic rendering of values back to text.
//!
//! A [`Printer`] holds a set of [`PrintOptions`] and renders any value
//! without mutating it. Printing never fails: every value is one of the
//! four kinds and every kind has a rendering.
//!
//! The default options give the most compact form that still re-parses:
//! everything on one line, every atom quoted, and no separators at all
//! (the quotes make them redundant). `whitespace` switches to a block
//! layout, `no_delim` drops the outermost delimiters for config-file
//! output, and `flatten` emits one `dotted.path = leaf` line per leaf.
//!
//! ```rust
//! use canopy::{parse, PrintOptions, Printer};
//!
//! let value = parse("{host=\"db1\" ports=[\"5432\" \"5433\"]}").unwrap();
//!
//! let printer = Printer::new(PrintOptions::pretty().with_no_delim(true));
//! assert_eq!(
//!     printer.print_to_string(&value),
//!     "host = db1\nports = [5432 5433]\n",
//! );
//! ```

use crate::options::PrintOptions;
use crate::parser::VALUE_SYNTAX;
use crate::value::Value;
use std::io;

// An atom can print bare only when nothing in it would confuse the
// tokenizer on the way back in.
fn requires_quotes(text: &str) -> bool {
    text.is_empty()
        || text
            .chars()
            .any(|c| VALUE_SYNTAX.is_reserved(c) || c.is_whitespace() || c == '\\')
}

fn push_atom(out: &mut String, text: &str, whitespace: bool) {
    let with_quotes = !whitespace || requires_quotes(text);
    if with_quotes {
        out.push('"');
    }
    for c in text.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    if with_quotes {
        out.push('"');
    }
}

fn push_spaces(out: &mut String, n: usize) {
    for _ in 0..n {
        out.push(' ');
    }
}

/// Renders values as text according to a set of [`PrintOptions`].
///
/// The printer is cheap to build and to clone; construct one per output
/// style. [`Value`]'s `Display` impl is a default printer.
///
/// # Examples
///
/// ```rust
/// use canopy::{parse, PrintOptions, Printer};
///
/// let value = parse("{a=\"1\" b=?}").unwrap();
/// let compact = Printer::default().print_to_string(&value);
/// assert_eq!(compact, "{a=\"1\"b=?}");
///
/// let block = Printer::new(PrintOptions::pretty()).print_to_string(&value);
/// assert_eq!(block, "{\n    a = 1\n    b = ?\n}");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Printer {
    options: PrintOptions,
}

impl Printer {
    /// Creates a printer with the given options.
    #[must_use]
    pub fn new(options: PrintOptions) -> Self {
        Printer { options }
    }

    /// The options this printer renders with.
    #[must_use]
    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    /// Renders `value` to a fresh string.
    #[must_use]
    pub fn print_to_string(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut ind = 0;
        let mut col = 0;
        self.output(value, &mut out, &mut ind, &mut col, true);
        out
    }

    /// Renders `value` to a writer.
    ///
    /// # Errors
    ///
    /// Only the write itself can fail; rendering cannot.
    pub fn print<W: io::Write>(&self, value: &Value, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.print_to_string(value).as_bytes())
    }

    // The recursive core. `ind` is the current indent level, `col` the
    // running output column used for width wrapping.
    fn output(&self, value: &Value, out: &mut String, ind: &mut usize, col: &mut usize, top: bool) {
        let delim = !(self.options.no_delim && top);
        let whitespace = self.options.whitespace;
        let width = if self.options.width == 0 {
            usize::MAX
        } else {
            self.options.width
        };
        let tab = self.options.indent;

        match value {
            Value::None => out.push('?'),
            Value::Atom(text) => {
                if delim {
                    let start = out.len();
                    push_atom(out, text, whitespace);
                    *col += out.len() - start;
                } else {
                    // undelimited top-level atoms print raw
                    out.push_str(text);
                }
            }
            Value::Vector(elements) => {
                if delim {
                    out.push('[');
                    *col += 1;
                }
                // wrapped lines re-align under the opening bracket
                let rem = *col;
                for (i, element) in elements.iter().enumerate() {
                    if whitespace && i > 0 {
                        if *col > width {
                            out.push('\n');
                            *col = rem;
                            push_spaces(out, *col);
                        } else {
                            out.push(' ');
                            *col += 1;
                        }
                    }
                    self.output(element, out, ind, col, false);
                }
                if delim {
                    out.push(']');
                    *col += 1;
                }
            }
            Value::Table(table) => {
                if delim {
                    *ind += 1;
                    out.push('{');
                    *col += 1;
                    if whitespace {
                        out.push('\n');
                    }
                }
                for (key, entry) in table.iter() {
                    if self.options.flatten {
                        self.output_flatten(key.as_str(), entry, out, *ind);
                        continue;
                    }
                    if whitespace {
                        *col = tab * *ind;
                        push_spaces(out, *col);
                    }
                    out.push_str(key.as_str());
                    *col += key.len();
                    if self.options.open_tables && entry.is_table() {
                        if whitespace {
                            out.push(' ');
                            *col += 1;
                        }
                    } else if whitespace {
                        out.push_str(" = ");
                        *col += 3;
                    } else {
                        out.push('=');
                        *col += 1;
                    }
                    self.output(entry, out, ind, col, false);
                    if whitespace {
                        out.push('\n');
                    }
                }
                if delim {
                    *ind -= 1;
                    if whitespace {
                        *col = tab * *ind;
                        push_spaces(out, *col);
                    }
                    out.push('}');
                    *col += 1;
                }
            }
        }
    }

    // One `key = leaf` line per leaf; vectors and tables extend the key
    // path instead of nesting.
    fn output_flatten(&self, key: &str, value: &Value, out: &mut String, ind: usize) {
        let whitespace = self.options.whitespace;
        match value {
            Value::Vector(elements) if !elements.is_empty() => {
                for (i, element) in elements.iter().enumerate() {
                    self.output_flatten(&format!("{key}[{i}]"), element, out, ind);
                }
            }
            Value::Table(table) if !table.is_empty() => {
                for (sub, entry) in table.iter() {
                    self.output_flatten(&format!("{key}.{sub}"), entry, out, ind);
                }
            }
            leaf => {
                if whitespace {
                    push_spaces(out, self.options.indent * ind);
                }
                out.push_str(key);
                out.push_str(if whitespace { " = " } else { "=" });
                match leaf {
                    Value::None => out.push('?'),
                    Value::Atom(text) => push_atom(out, text, whitespace),
                    Value::Vector(_) => out.push_str("[]"),
                    Value::Table(_) => out.push_str("{}"),
                }
                if whitespace {
                    out.push('\n');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, Parser};
    use crate::Value;

    fn sample() -> Value {
        parse("{a=\"1\" t={x=\"odd one\" y=?} v=[\"p\" \"q\"]}").unwrap()
    }

    #[test]
    fn compact_is_canonical_and_round_trips() {
        let v = sample();
        let text = Printer::default().print_to_string(&v);
        assert_eq!(text, "{a=\"1\"t={x=\"odd one\"y=?}v=[\"p\"\"q\"]}");
        assert_eq!(parse(&text).unwrap(), v);
    }

    #[test]
    fn pretty_block_layout() {
        let v = parse("{a=\"1\" b=\"two words\"}").unwrap();
        let text = Printer::new(PrintOptions::pretty()).print_to_string(&v);
        assert_eq!(text, "{\n    a = 1\n    b = \"two words\"\n}");
    }

    #[test]
    fn pretty_output_reparses_identically() {
        let v = sample();
        let mut root = Value::None;
        let text = Printer::new(PrintOptions::pretty().with_no_delim(true)).print_to_string(&v);
        Parser::new().parse_keyvals(&mut root, &text).unwrap();
        assert_eq!(root, v);
    }

    #[test]
    fn open_tables_drop_the_equals() {
        let v = parse("{t={x=\"1\"}}").unwrap();
        let text =
            Printer::new(PrintOptions::pretty().with_open_tables(true)).print_to_string(&v);
        assert_eq!(text, "{\n    t {\n        x = 1\n    }\n}");
    }

    #[test]
    fn quoting_only_when_needed_in_pretty_mode() {
        let cases = [
            ("plain", "plain"),
            ("two words", "\"two words\""),
            ("", "\"\""),
            ("a#b", "\"a#b\""),
            ("a[b", "\"a[b\""),
            ("back\\slash", "\"back\\\\slash\""),
            ("say \"hi\"", "\"say \\\"hi\\\"\""),
        ];
        for (input, expected) in cases {
            let mut out = String::new();
            push_atom(&mut out, input, true);
            assert_eq!(out, expected, "atom {input:?}");
        }
    }

    #[test]
    fn no_delim_atom_prints_raw() {
        let v = Value::from("a \"quoted\" atom");
        let text = Printer::new(PrintOptions::new().with_no_delim(true)).print_to_string(&v);
        assert_eq!(text, "a \"quoted\" atom");
    }

    #[test]
    fn vector_wrap_aligns_under_the_bracket() {
        let v = parse("{k=[\"aa\" \"bb\" \"cc\"]}").unwrap();
        let options = PrintOptions::pretty().with_width(10);
        let text = Printer::new(options).print_to_string(&v);
        assert_eq!(text, "{\n    k = [aa\n         bb\n         cc]\n}");
        // wrapped output still parses back to the same tree
        let reparsed = Parser::new().parse(text.trim()).unwrap();
        assert_eq!(reparsed, v);
    }

    #[test]
    fn flatten_emits_one_line_per_leaf() {
        let v = parse("{a=\"1\" e={} t={x=\"1\" y=[\"p\" \"q\"]} n=?}").unwrap();
        let options = PrintOptions::pretty().with_no_delim(true).with_flatten(true);
        let text = Printer::new(options).print_to_string(&v);
        assert_eq!(
            text,
            "a = 1\ne = {}\nn = ?\nt.x = 1\nt.y[0] = p\nt.y[1] = q\n"
        );
    }

    #[test]
    fn flatten_output_reparses_identically() {
        let v = sample();
        let options = PrintOptions::pretty().with_no_delim(true).with_flatten(true);
        let text = Printer::new(options).print_to_string(&v);
        let mut root = Value::None;
        Parser::new().parse_keyvals(&mut root, &text).unwrap();
        assert_eq!(root, v);
    }

    #[test]
    fn printing_is_idempotent() {
        let v = sample();
        for options in [
            PrintOptions::new(),
            PrintOptions::pretty(),
            PrintOptions::pretty().with_open_tables(true).with_width(12),
        ] {
            let printer = Printer::new(options);
            assert_eq!(printer.print_to_string(&v), printer.print_to_string(&v));
        }
    }

    #[test]
    fn empty_containers_and_none() {
        assert_eq!(Printer::default().print_to_string(&Value::None), "?");
        assert_eq!(
            Printer::default().print_to_string(&parse("[]").unwrap()),
            "[]"
        );
        assert_eq!(
            Printer::default().print_to_string(&parse("{}").unwrap()),
            "{}"
        );
    }
}
