//! Event types for the sparse event parser.

use std::fmt;

use crate::escape::{escape_key, escape_value};

/// Events emitted by the parser.
///
/// Displaying an event renders it back to text. `NodeLeave` renders as `}`
/// regardless of its depth, since nesting is implicit in event order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event {
    /// A key with an optional value: `key value`, `key!` or `key;`.
    ///
    /// Flags and valueless keys carry an empty value.
    Field {
        /// Key after escape processing.
        key: String,
        /// Value after escape processing and whitespace normalization.
        value: String,
    },

    /// A `#` comment, without the `#` and without the line terminator.
    ///
    /// Only produced when comments are enabled in
    /// [`ParseOptions`](crate::ParseOptions).
    Comment(String),

    /// Start of a block `label {`. The label is empty for anonymous blocks.
    NodeEnter(String),

    /// End of a block `}`.
    ///
    /// Carries the depth before the block was closed, so the outermost block
    /// closes with `NodeLeave(1)`.
    NodeLeave(usize),
}

/// The kind of an [`Event`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`Event::Field`]
    Field,
    /// [`Event::Comment`]
    Comment,
    /// [`Event::NodeEnter`]
    NodeEnter,
    /// [`Event::NodeLeave`]
    NodeLeave,
}

impl Event {
    /// Create a field event.
    pub fn field(key: impl Into<String>, value: impl Into<String>) -> Self {
        Event::Field {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a field event with an empty value.
    pub fn flag(key: impl Into<String>) -> Self {
        Event::field(key, String::new())
    }

    /// Create a comment event.
    pub fn comment(text: impl Into<String>) -> Self {
        Event::Comment(text.into())
    }

    /// Create a block start event.
    pub fn node_enter(label: impl Into<String>) -> Self {
        Event::NodeEnter(label.into())
    }

    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Field { .. } => EventKind::Field,
            Event::Comment(_) => EventKind::Comment,
            Event::NodeEnter(_) => EventKind::NodeEnter,
            Event::NodeLeave(_) => EventKind::NodeLeave,
        }
    }

    /// The key of a field, or the label of a block start.
    pub fn key(&self) -> Option<&str> {
        match self {
            Event::Field { key, .. } | Event::NodeEnter(key) => Some(key.as_str()),
            _ => None,
        }
    }

    /// The value of a field.
    pub fn value(&self) -> Option<&str> {
        match self {
            Event::Field { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Field { key, value } if value.is_empty() => {
                write!(f, "{}!", escape_key(key))
            }
            Event::Field { key, value } => {
                write!(f, "{} {}", escape_key(key), escape_value(value))
            }
            Event::Comment(text) => write!(f, "#{text}"),
            Event::NodeEnter(label) => write!(f, "{label}{{"),
            Event::NodeLeave(_) => f.write_str("}"),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Field => "field",
            EventKind::Comment => "comment",
            EventKind::NodeEnter => "node-enter",
            EventKind::NodeLeave => "node-leave",
        })
    }
}
