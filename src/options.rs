//! Configuration options for printing values.
//!
//! [`PrintOptions`] controls the output shape of [`Printer`](crate::Printer):
//! compact one-line output by default, with builder-style switches for
//! human-oriented layouts.
//!
//! ## Examples
//!
//! ```rust
//! use canopy::{parse, PrintOptions, Printer};
//!
//! let value = parse("{a=\"1\" b=[\"x\" \"y\"]}").unwrap();
//!
//! // Compact, machine-oriented (the default); quoting makes separators
//! // redundant, so none are emitted
//! let compact = Printer::new(PrintOptions::new()).print_to_string(&value);
//! assert_eq!(compact, "{a=\"1\"b=[\"x\"\"y\"]}");
//!
//! // Block layout with one key per line
//! let options = PrintOptions::pretty().with_indent(2);
//! let pretty = Printer::new(options).print_to_string(&value);
//! assert!(pretty.contains('\n'));
//! ```

/// Configuration options for printing values.
///
/// The default prints the most compact form that still parses back: one
/// line, single-space separators, every atom quoted.
///
/// # Examples
///
/// ```rust
/// use canopy::PrintOptions;
///
/// // Default compact options
/// let options = PrintOptions::new();
/// assert_eq!(options.width, 0);
///
/// // Custom configuration
/// let options = PrintOptions::new()
///     .with_open_tables(true)
///     .with_width(78)
///     .with_indent(2);
/// ```
#[derive(Clone, Debug)]
pub struct PrintOptions {
    /// Omit the `{ }` around the top-level table, and print a top-level
    /// atom raw (unquoted, unescaped).
    pub no_delim: bool,
    /// Break tables into one key per line with indentation.
    pub whitespace: bool,
    /// With `whitespace`, put a newline before each table's `{` so the
    /// braces line up vertically.
    pub open_tables: bool,
    /// Print one `dotted.path = leaf` line per leaf instead of nested
    /// delimiters. Implies line-per-entry output.
    pub flatten: bool,
    /// Wrap long vectors at this column. `0` means unlimited.
    pub width: usize,
    /// Spaces per indent level in `whitespace` mode.
    pub indent: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            no_delim: false,
            whitespace: false,
            open_tables: false,
            flatten: false,
            width: 0,
            indent: 4,
        }
    }
}

impl PrintOptions {
    /// Creates default options (compact one-line output).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for block output: one key per line, indented.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::PrintOptions;
    ///
    /// let options = PrintOptions::pretty();
    /// assert!(options.whitespace);
    /// ```
    #[must_use]
    pub fn pretty() -> Self {
        PrintOptions {
            whitespace: true,
            ..Default::default()
        }
    }

    /// Omits the outermost table delimiters, giving config-file style
    /// output that [`Parser::parse_keyvals`](crate::Parser::parse_keyvals)
    /// reads back. A top-level atom prints raw.
    #[must_use]
    pub fn with_no_delim(mut self, no_delim: bool) -> Self {
        self.no_delim = no_delim;
        self
    }

    /// Enables line-per-key output with indentation.
    #[must_use]
    pub fn with_whitespace(mut self, whitespace: bool) -> Self {
        self.whitespace = whitespace;
        self
    }

    /// Puts each table's opening brace on its own line. Implies
    /// `whitespace`.
    #[must_use]
    pub fn with_open_tables(mut self, open_tables: bool) -> Self {
        self.open_tables = open_tables;
        if open_tables {
            self.whitespace = true;
        }
        self
    }

    /// Prints one `dotted.path = leaf` line per leaf.
    #[must_use]
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Sets the wrap column for long vectors. `0` disables wrapping.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Default is 4. Only affects `whitespace` output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
