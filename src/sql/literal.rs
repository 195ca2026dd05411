//! Value literal parser for `INSERT ... VALUES (...)` lists.
//!
//! The scanner is a three-state machine (`in_quotes`, `escape_next` and the
//! current token buffer) that splits a raw value list on top-level commas.
//! Each raw token is then classified into a [`Literal`].

use core::fmt::{self, Display};

use serde::Serialize;

/// A classified SQL value literal.
///
/// Serializes as the plain JSON value it represents, so an `InsertData`
/// payload can be handed to a JSON API unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    /// `NULL`, in any case.
    Null,
    /// `TRUE` or `FALSE`, in any case.
    Bool(bool),
    /// An integer that fits in 64 bits.
    Int(i64),
    /// A token containing a `.` that parses as a float, or an integer too
    /// large for [`Literal::Int`].
    Float(f64),
    /// A bracket-delimited token that parses as a JSON array.
    JsonArray(Vec<serde_json::Value>),
    /// Anything else, kept as raw text with one layer of quoting removed.
    String(String),
}

impl Literal {
    /// Classify a single raw token.
    ///
    /// Precedence: `NULL`/`TRUE`/`FALSE`, then JSON array, then number, then
    /// string. Failed JSON or numeric parses fall back to [`Literal::String`].
    #[must_use]
    pub fn classify(token: &str) -> Self {
        if token.eq_ignore_ascii_case("NULL") {
            return Literal::Null;
        }
        if token.eq_ignore_ascii_case("TRUE") {
            return Literal::Bool(true);
        }
        if token.eq_ignore_ascii_case("FALSE") {
            return Literal::Bool(false);
        }

        if token.starts_with('[') && token.ends_with(']') {
            return serde_json::from_str::<Vec<serde_json::Value>>(&token.replace('\'', "\""))
                .map_or_else(|_| Literal::String(token.into()), Literal::JsonArray);
        }

        if token.contains('.') {
            if let Ok(v) = token.parse::<f64>() {
                return Literal::Float(v);
            }
        } else if let Ok(v) = token.parse::<i64>() {
            return Literal::Int(v);
        } else if is_integer_text(token) {
            if let Ok(v) = token.parse::<f64>() {
                return Literal::Float(v);
            }
        }

        Literal::String(token.into())
    }

    /// Returns true if this literal is [`Literal::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

/// An optional sign followed by at least one ASCII digit and nothing else.
fn is_integer_text(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Bool(true) => write!(f, "TRUE"),
            Literal::Bool(false) => write!(f, "FALSE"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::JsonArray(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Literal::String(s) => write!(f, "{s}"),
        }
    }
}

/// Character-level scanner splitting a value list into raw tokens.
#[derive(Debug, Default)]
struct ValueScanner {
    in_quotes: bool,
    escape_next: bool,
    current: String,
    tokens: Vec<String>,
}

impl ValueScanner {
    fn feed(&mut self, c: char) {
        if self.escape_next {
            self.current.push(c);
            self.escape_next = false;
            return;
        }

        match c {
            '\\' => self.escape_next = true,
            // The quote itself is never kept.
            '\'' => self.in_quotes = !self.in_quotes,
            ',' if !self.in_quotes => {
                self.tokens.push(self.current.trim().into());
                self.current.clear();
            }
            _ => self.current.push(c),
        }
    }

    fn finish(mut self) -> Vec<String> {
        let rest = self.current.trim();
        if !rest.is_empty() {
            self.tokens.push(rest.into());
        }
        self.tokens
    }
}

/// Split a raw value list into its top-level raw tokens.
///
/// Quotes are stripped, backslash escapes are resolved, and commas inside
/// quotes do not split. Empty tokens between commas are kept; a trailing
/// empty token is not.
#[must_use]
pub fn split_values(raw: &str) -> Vec<String> {
    let mut scanner = ValueScanner::default();
    for c in raw.trim().chars() {
        scanner.feed(c);
    }
    scanner.finish()
}

/// Parse a raw `VALUES` list into classified literals.
///
/// Never fails: anything ambiguous becomes [`Literal::String`].
#[must_use]
pub fn parse_value_list(raw: &str) -> Vec<Literal> {
    split_values(raw)
        .iter()
        .map(|token| Literal::classify(token))
        .collect()
}
