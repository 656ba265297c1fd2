//! Pull-based event parser for sparse documents.
//!
//! The parser is a state machine driven one step at a time. Each call to
//! [`Parser::next_event`] reads code points from a [`CodePointSource`] until
//! it can return exactly one event, the end of the document, or an error. All
//! state needed to resume lives in the [`Parser`], so a document can be parsed
//! from a source that is fed incrementally.

use std::mem;

use crate::escape::unescape;
use crate::{CharSource, CodePointSource, Error, Event, ParseOptions, Result};
#[allow(unused_imports)]
use crate::{debug, trace};

/// Pull-based event parser for sparse documents.
#[derive(Debug, Clone)]
pub struct Parser {
    options: ParseOptions,
    /// Number of open blocks.
    depth: usize,
    /// Code points read so far.
    position: usize,
    state: State,
    /// Scratch buffer for the token being read. Empty between tokens.
    buf: String,
}

/// Parser state machine states.
#[derive(Debug, Clone)]
enum State {
    /// Between tokens, expecting a key, a block boundary or a comment.
    ReadKey,
    /// A key has been read and its value (or block) follows.
    ReadValue { key: String },
    /// Inside a `#` comment. Parsing resumes at `ReadKey`.
    ReadComment,
    /// The source is exhausted.
    Eof,
    /// Poisoned by a fatal error.
    Error(Error),
}

/// The state of a [`Parser`], without the data it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    /// Expecting a key, a block boundary or a comment.
    ReadKey,
    /// Expecting the value of a key that has already been read.
    ReadValue,
    /// Inside a comment.
    ReadComment,
    /// Finished without error.
    Eof,
    /// Poisoned by a fatal error.
    Error,
}

/// Outcome of running a single state.
struct Transition {
    next: State,
    event: Option<Event>,
}

impl Transition {
    fn to(next: State) -> Self {
        Self { next, event: None }
    }

    fn emit(event: Event, next: State) -> Self {
        Self {
            next,
            event: Some(event),
        }
    }
}

/// How an accumulated key or value ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    /// An unescaped delimiter, which has been consumed.
    Delimiter(char),
    /// The source ran out.
    Eof,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl Parser {
    /// Create a new parser.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            depth: 0,
            position: 0,
            state: State::ReadKey,
            buf: String::new(),
        }
    }

    /// Reset the parser for a new document with new options.
    pub fn reset(&mut self, options: ParseOptions) {
        self.options = options;
        self.restart();
    }

    /// Reset the parser for a new document, keeping its options.
    ///
    /// This is the only way to recover a parser that returned an error.
    pub fn restart(&mut self) {
        self.depth = 0;
        self.position = 0;
        self.state = State::ReadKey;
        self.buf.clear();
    }

    /// The options this parser was created or last reset with.
    #[inline]
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Number of currently open blocks.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of code points read since the parser was created or reset.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The current state.
    pub fn state(&self) -> ParserState {
        match self.state {
            State::ReadKey => ParserState::ReadKey,
            State::ReadValue { .. } => ParserState::ReadValue,
            State::ReadComment => ParserState::ReadComment,
            State::Eof => ParserState::Eof,
            State::Error(_) => ParserState::Error,
        }
    }

    /// Whether the parser has reached the end of input or failed.
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Eof | State::Error(_))
    }

    /// Get the next event from the parser.
    ///
    /// Returns `Ok(None)` once the source is exhausted, and keeps returning it
    /// on later calls. An error is fatal: the same error is returned by every
    /// later call, without reading from the source.
    pub fn next_event<S>(&mut self, source: &mut S) -> Result<Option<Event>>
    where
        S: CodePointSource + ?Sized,
    {
        loop {
            let outcome = match mem::replace(&mut self.state, State::Eof) {
                State::ReadKey => self.read_key(source),
                State::ReadValue { key } => self.read_value(source, key),
                State::ReadComment => self.read_comment(source),
                State::Eof => return Ok(None),
                State::Error(err) => {
                    self.state = State::Error(err.clone());
                    return Err(err);
                }
            };

            match outcome {
                Ok(Transition { next, event }) => {
                    self.state = next;
                    trace!(state = ?self.state(), depth = self.depth, ?event, "step");
                    if event.is_some() {
                        return Ok(event);
                    }
                }
                Err(err) => {
                    debug!(%err, position = self.position, "parser poisoned");
                    self.buf.clear();
                    self.state = State::Error(err.clone());
                    return Err(err);
                }
            }
        }
    }

    /// Read the next code point, counting it.
    #[inline]
    fn read<S>(&mut self, source: &mut S) -> Result<Option<char>>
    where
        S: CodePointSource + ?Sized,
    {
        let c = source.read_code_point()?;
        if c.is_some() {
            self.position += 1;
        }
        Ok(c)
    }

    /// Skip spaces, tabs and line breaks, returning the first other code point.
    fn skip_whitespace<S>(&mut self, source: &mut S) -> Result<Option<char>>
    where
        S: CodePointSource + ?Sized,
    {
        loop {
            match self.read(source)? {
                Some(' ' | '\t' | '\n' | '\r') => continue,
                other => return Ok(other),
            }
        }
    }

    fn read_key<S>(&mut self, source: &mut S) -> Result<Transition>
    where
        S: CodePointSource + ?Sized,
    {
        debug_assert!(self.buf.is_empty());
        let Some(c) = self.skip_whitespace(source)? else {
            return Ok(Transition::to(State::Eof));
        };

        match c {
            '}' => self.leave(),
            '{' => Ok(self.enter(String::new())),
            '#' => Ok(Transition::to(State::ReadComment)),
            _ => {
                let end = self.accumulate(source, c, is_key_delimiter)?;
                let key = self.take_buf();
                Ok(match end {
                    End::Eof if key.is_empty() => Transition::to(State::Eof),
                    End::Eof => Transition::emit(Event::flag(key), State::Eof),
                    End::Delimiter('!' | ';') => Transition::emit(Event::flag(key), State::ReadKey),
                    End::Delimiter('#') => Transition::emit(Event::flag(key), State::ReadComment),
                    End::Delimiter('{') => self.enter(key),
                    End::Delimiter(_) => Transition::to(State::ReadValue { key }),
                })
            }
        }
    }

    fn read_value<S>(&mut self, source: &mut S, key: String) -> Result<Transition>
    where
        S: CodePointSource + ?Sized,
    {
        debug_assert!(self.buf.is_empty());
        let Some(c) = self.skip_whitespace(source)? else {
            return Ok(Transition::emit(Event::flag(key), State::Eof));
        };

        match c {
            '{' => Ok(self.enter(key)),
            '#' => Ok(Transition::emit(Event::flag(key), State::ReadComment)),
            _ => {
                let end = self.accumulate(source, c, is_value_delimiter)?;
                if self.options.trim_trailing_whitespace {
                    let len = self.buf.trim_end_matches([' ', '\t', '\r', '\n']).len();
                    self.buf.truncate(len);
                }
                let value = self.take_buf();
                let next = match end {
                    End::Eof => State::Eof,
                    End::Delimiter('#') => State::ReadComment,
                    End::Delimiter(_) => State::ReadKey,
                };
                Ok(Transition::emit(Event::field(key, value), next))
            }
        }
    }

    fn read_comment<S>(&mut self, source: &mut S) -> Result<Transition>
    where
        S: CodePointSource + ?Sized,
    {
        debug_assert!(self.buf.is_empty());
        let keep = self.options.read_comments;
        let next = loop {
            match self.read(source)? {
                Some('\n') => {
                    if self.buf.ends_with('\r') {
                        self.buf.pop();
                    }
                    break State::ReadKey;
                }
                Some(c) if keep => self.buf.push(c),
                Some(_) => {}
                None => break State::Eof,
            }
        };

        if keep {
            let text = self.take_buf();
            Ok(Transition::emit(Event::Comment(text), next))
        } else {
            Ok(Transition::to(next))
        }
    }

    fn enter(&mut self, label: String) -> Transition {
        self.depth += 1;
        Transition::emit(Event::NodeEnter(label), State::ReadKey)
    }

    fn leave(&mut self) -> Result<Transition> {
        if self.depth == 0 {
            return Err(Error::UnexpectedNodeLeave {
                position: self.position,
            });
        }
        let depth = self.depth;
        self.depth -= 1;
        Ok(Transition::emit(Event::NodeLeave(depth), State::ReadKey))
    }

    /// Read a key or value into the scratch buffer, starting with `first`.
    ///
    /// Decodes escapes, drops unescaped CR, joins continued lines and, when
    /// enabled, compresses whitespace. Stops at the first unescaped code point
    /// for which `is_delimiter` holds.
    fn accumulate<S>(
        &mut self,
        source: &mut S,
        first: char,
        is_delimiter: fn(char) -> bool,
    ) -> Result<End>
    where
        S: CodePointSource + ?Sized,
    {
        let compress = self.options.compress_whitespace;
        let mut c = first;
        let mut escaped = false;
        // Last buffered code point on the current line.
        let mut last: Option<char> = None;

        loop {
            if escaped {
                match c {
                    // `\` CR LF continues the line like `\` LF.
                    '\r' => {}
                    '\n' => {
                        escaped = false;
                        if compress {
                            trim_line_end(&mut self.buf);
                        }
                        last = None;
                    }
                    _ => {
                        escaped = false;
                        let decoded = unescape(c);
                        self.buf.push(decoded);
                        last = Some(decoded);
                    }
                }
            } else if c == '\\' {
                escaped = true;
            } else if c == '\r' {
                // Ignored outside of escapes.
            } else if is_delimiter(c) {
                return Ok(End::Delimiter(c));
            } else if compress && c.is_whitespace() && last.is_some_and(char::is_whitespace) {
                // Collapsed into the previous code point.
            } else {
                self.buf.push(c);
                last = Some(c);
            }

            c = match self.read(source)? {
                Some(c) => c,
                None => return Ok(End::Eof),
            };
        }
    }

    /// Take the scratch buffer's contents, leaving it empty.
    fn take_buf(&mut self) -> String {
        let out = self.buf.clone();
        self.buf.clear();
        out
    }
}

fn is_key_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '!' | ';' | '#' | '{')
}

fn is_value_delimiter(c: char) -> bool {
    matches!(c, '\n' | ';' | '#')
}

/// Trim whitespace from the end of the buffer, stopping at a newline.
fn trim_line_end(buf: &mut String) {
    let len = buf
        .trim_end_matches(|c: char| c != '\n' && c.is_whitespace())
        .len();
    buf.truncate(len);
}

/// Parse a whole document into a vector of events.
///
/// End of input is a normal return; the first error aborts parsing.
pub fn parse<S>(mut source: S, options: ParseOptions) -> Result<Vec<Event>>
where
    S: CodePointSource,
{
    let mut parser = Parser::new(options);
    let mut events = Vec::new();
    while let Some(event) = parser.next_event(&mut source)? {
        events.push(event);
    }
    Ok(events)
}

/// Parse a string into a vector of events.
pub fn parse_str(input: &str, options: ParseOptions) -> Result<Vec<Event>> {
    parse(CharSource::from_str(input), options)
}

#[cfg(test)]
mod tests;
