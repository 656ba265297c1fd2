//! Parser options.

/// Options for the sparse parser.
///
/// Options are read when a [`Parser`](crate::Parser) is created or reset and
/// do not change while a document is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Emit [`Event::Comment`](crate::Event::Comment) for `#` comments
    /// instead of dropping them (default: false)
    pub read_comments: bool,

    /// Collapse runs of whitespace inside keys and values to their first
    /// character (default: true)
    pub compress_whitespace: bool,

    /// Strip trailing space, tab, CR and LF from values (default: true)
    pub trim_trailing_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            read_comments: false,
            compress_whitespace: true,
            trim_trailing_whitespace: true,
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that keep the input as written: comments are read and no
    /// whitespace is compressed or trimmed.
    pub fn verbatim() -> Self {
        Self {
            read_comments: true,
            compress_whitespace: false,
            trim_trailing_whitespace: false,
        }
    }

    /// Set whether comments are emitted.
    pub fn read_comments(mut self, yes: bool) -> Self {
        self.read_comments = yes;
        self
    }

    /// Set whether whitespace runs are compressed.
    pub fn compress_whitespace(mut self, yes: bool) -> Self {
        self.compress_whitespace = yes;
        self
    }

    /// Set whether trailing whitespace is trimmed from values.
    pub fn trim_trailing_whitespace(mut self, yes: bool) -> Self {
        self.trim_trailing_whitespace = yes;
        self
    }
}
