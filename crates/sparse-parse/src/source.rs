//! Code-point sources consumed by the parser.

use std::io::{self, Read};
use std::str::Chars;

/// A stream of code points.
///
/// `Ok(Some(c))` is data, `Ok(None)` is the end of the stream, and `Err` is a
/// failure of the underlying source. The parser treats any error as fatal.
pub trait CodePointSource {
    /// Read the next code point.
    fn read_code_point(&mut self) -> io::Result<Option<char>>;
}

impl<S: CodePointSource + ?Sized> CodePointSource for &mut S {
    #[inline]
    fn read_code_point(&mut self) -> io::Result<Option<char>> {
        (**self).read_code_point()
    }
}

impl<S: CodePointSource + ?Sized> CodePointSource for Box<S> {
    #[inline]
    fn read_code_point(&mut self) -> io::Result<Option<char>> {
        (**self).read_code_point()
    }
}

/// A source over any iterator of `char`s. Never fails.
#[derive(Debug, Clone)]
pub struct CharSource<I> {
    chars: I,
}

impl<I> CharSource<I>
where
    I: Iterator<Item = char>,
{
    /// Wrap an iterator of characters.
    pub fn new(chars: I) -> Self {
        Self { chars }
    }

    /// Unwrap the iterator, positioned after the last code point read.
    pub fn into_inner(self) -> I {
        self.chars
    }
}

impl<'a> CharSource<Chars<'a>> {
    /// Read the characters of a string slice.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &'a str) -> Self {
        Self::new(s.chars())
    }
}

impl<'a> From<&'a str> for CharSource<Chars<'a>> {
    fn from(s: &'a str) -> Self {
        Self::from_str(s)
    }
}

impl<I> CodePointSource for CharSource<I>
where
    I: Iterator<Item = char>,
{
    #[inline]
    fn read_code_point(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Bit that marks a byte as not representable by [`ByteSource`].
///
/// This is bit 3, not the ASCII high bit, so bytes such as `h` (0x68) and
/// `{` (0x7b) are replaced as well.
pub const BYTE_REPLACEMENT_MASK: u8 = 0x08;

/// The 8-bit fallback source: one byte is one code point.
///
/// Bytes with [`BYTE_REPLACEMENT_MASK`] set are read as U+FFFD. Callers with
/// UTF-8 input should decode it themselves and use [`CharSource`].
#[derive(Debug)]
pub struct ByteSource<R> {
    reader: R,
}

impl<R: Read> ByteSource<R> {
    /// Read bytes from `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Unwrap the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> CodePointSource for ByteSource<R> {
    fn read_code_point(&mut self) -> io::Result<Option<char>> {
        Ok(self.read_byte()?.map(|b| {
            if b & BYTE_REPLACEMENT_MASK != 0 {
                char::REPLACEMENT_CHARACTER
            } else {
                char::from(b)
            }
        }))
    }
}
