//! Immutable character stream.
//!
//! A `Stream` is a cursor over the unconsumed part of an input string.
//! It is `Copy`, so parsers hand out new views instead of mutating one:
//! a parser that fails simply drops whatever view it advanced internally,
//! and the caller still holds the original.

/// A view of the remaining input.
///
/// The lifetime `'a` refers to the source text. Peeking and dropping the
/// first character are both O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stream<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Stream<'a> {
    /// Create a stream over the whole of `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// The first unconsumed character, if any.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.as_str().chars().next()
    }

    /// Split off the first character, returning it with the rest of the stream.
    #[inline]
    pub fn split_first(self) -> Option<(char, Stream<'a>)> {
        let ch = self.peek()?;
        Some((ch, self.skip(ch.len_utf8())))
    }

    /// The unconsumed remainder.
    #[inline]
    pub fn as_str(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Byte offset of this view into the original input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Check whether all input has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Advance by `len` bytes.
    ///
    /// `len` must land on a character boundary of the remaining input.
    #[inline]
    pub(crate) fn skip(self, len: usize) -> Stream<'a> {
        debug_assert!(self.src.is_char_boundary(self.pos + len));
        Stream {
            src: self.src,
            pos: self.pos + len,
        }
    }
}

impl<'a> From<&'a str> for Stream<'a> {
    fn from(src: &'a str) -> Self {
        Stream::new(src)
    }
}
