//! Escaping tables used when rendering events back to text.
//!
//! Keys are escaped more strictly than values: a key ends at the first
//! unescaped space, tab or `!`, so those must be escaped too. A value may
//! contain raw spaces and tabs, and renders an embedded newline as a line
//! continuation rather than as `\n`.

use std::borrow::Cow;

/// Replacements applied to values.
pub const VALUE_ESCAPES: &[(char, &str)] = &[
    ('#', "\\#"),
    (';', "\\;"),
    ('\u{8}', "\\b"),
    ('\u{c}', "\\f"),
    ('\n', "\\\n"),
    ('\r', "\\r"),
    ('\u{b}', "\\v"),
    ('\0', "\\0"),
];

/// Replacements applied to keys.
pub const KEY_ESCAPES: &[(char, &str)] = &[
    (' ', "\\ "),
    ('#', "\\#"),
    (';', "\\;"),
    ('\u{8}', "\\b"),
    ('\u{c}', "\\f"),
    ('\n', "\\n"),
    ('\r', "\\r"),
    ('\t', "\\t"),
    ('\u{b}', "\\v"),
    ('\0', "\\0"),
    ('!', "\\!"),
];

fn lookup(table: &'static [(char, &'static str)], c: char) -> Option<&'static str> {
    table
        .iter()
        .find_map(|&(from, to)| (from == c).then_some(to))
}

/// Return the escape sequence for `c` inside a key, if it needs one.
#[inline]
pub fn key_escape(c: char) -> Option<&'static str> {
    lookup(KEY_ESCAPES, c)
}

/// Return the escape sequence for `c` inside a value, if it needs one.
#[inline]
pub fn value_escape(c: char) -> Option<&'static str> {
    lookup(VALUE_ESCAPES, c)
}

fn escape_with<'a>(s: &'a str, table: &'static [(char, &'static str)]) -> Cow<'a, str> {
    if !s.chars().any(|c| lookup(table, c).is_some()) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match lookup(table, c) {
            Some(escaped) => result.push_str(escaped),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape a key for output.
pub fn escape_key(key: &str) -> Cow<'_, str> {
    escape_with(key, KEY_ESCAPES)
}

/// Escape a value for output.
pub fn escape_value(value: &str) -> Cow<'_, str> {
    escape_with(value, VALUE_ESCAPES)
}

/// Decode the character following a backslash.
///
/// Unknown escapes decode to the character itself. A newline is handled by
/// the parser as a line continuation and never reaches this function.
#[inline]
pub(crate) fn unescape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'b' => '\u{8}',
        'f' => '\u{c}',
        '0' => '\0',
        'v' => '\u{b}',
        other => other,
    }
}
