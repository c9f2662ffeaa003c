//! Rendering of caller-supplied string values as SQL literals.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{NULL_MARKER, PLACEHOLDER};

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .unwrap_or_else(|e| panic!("decimal literal pattern: {e}"))
});

/// True when `value` is a plain decimal number that can be embedded unquoted.
#[must_use]
pub fn is_numeric(value: &str) -> bool {
    DECIMAL.is_match(value)
}

/// Render `value` as the literal to embed in SQL text.
///
/// - `null` / `'null'` become the bare `null` keyword,
/// - `?` / `'?'` stay a positional placeholder,
/// - decimal numbers are left unquoted,
/// - anything else is single-quoted with embedded quotes doubled.
///
/// ```rust
/// use sql_shim::encoder::encode_value;
///
/// assert_eq!(encode_value("O'Brien"), "'O''Brien'");
/// assert_eq!(encode_value("7"), "7");
/// assert_eq!(encode_value("'null'"), "null");
/// ```
#[must_use]
pub fn encode_value(value: &str) -> Cow<'_, str> {
    let value = normalize_marker(value);
    if value == NULL_MARKER || value == PLACEHOLDER || is_numeric(value) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(quote(value))
    }
}

/// Collapse the quoted markers `'null'` and `'?'` to the bare `null` keyword and `?`
/// placeholder; any other value is returned unchanged.
#[must_use]
pub fn normalize_marker(value: &str) -> &str {
    match value {
        "'null'" => NULL_MARKER,
        "'?'" => PLACEHOLDER,
        other => other,
    }
}

/// Wrap `value` in single quotes, doubling any quote it contains.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Recover the string a literal produced by [`encode_value`] stands for.
///
/// Returns `None` for the `null` keyword and for a placeholder, which have no string value.
#[must_use]
pub fn decode_literal(literal: &str) -> Option<Cow<'_, str>> {
    if literal == NULL_MARKER || literal == PLACEHOLDER {
        return None;
    }
    match literal
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) if inner.contains("''") => Some(Cow::Owned(inner.replace("''", "'"))),
        Some(inner) => Some(Cow::Borrowed(inner)),
        None => Some(Cow::Borrowed(literal)),
    }
}
