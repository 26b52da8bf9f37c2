//! Parser combinators over a [`Stream`].
//!
//! A parser is a pure function from a stream to an optional result plus the
//! remaining stream. Failure carries no detail: `None` means "no match", and
//! because streams are immutable views the caller's position is unaffected.
//!
//! Primitives consume single characters (`literal`, `satisfy`) or fixed text
//! (`word`). Everything else composes parsers:
//!
//! ```text
//! sequence   and, eat_left, eat_right, between
//! choice     or, one_of
//! repeat     many, many1, list
//! transform  map, optional, recognize
//! ```
//!
//! Recursive grammars are tied together through a [`Forward`] slot that is
//! defined once after every rule referencing it exists.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::stream::Stream;

/// A parser producing values of type `T`.
///
/// Implemented for every closure of shape
/// `for<'a> Fn(Stream<'a>) -> Option<(T, Stream<'a>)>`; use [`from_fn`] to
/// pin that signature when writing one inline.
pub trait Parser<T> {
    /// Run the parser at the head of `input`.
    fn parse<'a>(&self, input: Stream<'a>) -> Option<(T, Stream<'a>)>;

    /// Erase the parser's type.
    fn boxed(self) -> Boxed<T>
    where
        Self: Sized + Send + Sync + 'static,
    {
        Boxed(Box::new(self))
    }
}

impl<T, F> Parser<T> for F
where
    F: for<'a> Fn(Stream<'a>) -> Option<(T, Stream<'a>)>,
{
    #[inline]
    fn parse<'a>(&self, input: Stream<'a>) -> Option<(T, Stream<'a>)> {
        self(input)
    }
}

/// Identity helper that fixes a closure's signature to the parser shape.
///
/// Without it the compiler cannot tie the returned stream's lifetime to the
/// argument's.
#[inline]
pub fn from_fn<T, F>(f: F) -> F
where
    F: for<'a> Fn(Stream<'a>) -> Option<(T, Stream<'a>)>,
{
    f
}

/// Run `parser` over `text`, returning the result and the unconsumed text.
pub fn run<'a, T, P: Parser<T> + ?Sized>(parser: &P, text: &'a str) -> Option<(T, &'a str)> {
    parser
        .parse(Stream::new(text))
        .map(|(value, rest)| (value, rest.as_str()))
}

// ============================================================================
// Type erasure and recursion
// ============================================================================

/// A type-erased, thread-safe parser.
pub struct Boxed<T>(Box<dyn Parser<T> + Send + Sync>);

impl<T> Boxed<T> {
    /// Box `parser`.
    pub fn new<P>(parser: P) -> Self
    where
        P: Parser<T> + Send + Sync + 'static,
    {
        Boxed(Box::new(parser))
    }
}

impl<T> Parser<T> for Boxed<T> {
    #[inline]
    fn parse<'a>(&self, input: Stream<'a>) -> Option<(T, Stream<'a>)> {
        self.0.parse(input)
    }
}

impl<T> std::fmt::Debug for Boxed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Boxed(..)")
    }
}

/// A write-once slot standing in for a parser that is not built yet.
///
/// Clones share the slot. Until [`Forward::define`] is called every parse
/// through the slot is a no-match; afterwards the slot is read-only.
pub struct Forward<T> {
    slot: Arc<OnceCell<Boxed<T>>>,
}

impl<T> Forward<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Forward {
            slot: Arc::new(OnceCell::new()),
        }
    }

    /// Fill the slot.
    ///
    /// Fails, handing the parser back, if the slot was already defined.
    pub fn define<P>(&self, parser: P) -> Result<(), Boxed<T>>
    where
        P: Parser<T> + Send + Sync + 'static,
    {
        self.slot.set(Boxed::new(parser))
    }

    /// Check whether the slot has been filled.
    pub fn is_defined(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T> Default for Forward<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Forward<T> {
    fn clone(&self) -> Self {
        Forward {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::fmt::Debug for Forward<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forward")
            .field("defined", &self.is_defined())
            .finish()
    }
}

impl<T> Parser<T> for Forward<T> {
    #[inline]
    fn parse<'a>(&self, input: Stream<'a>) -> Option<(T, Stream<'a>)> {
        self.slot.get()?.parse(input)
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Match exactly the character `expected`.
pub fn literal(expected: char) -> impl Parser<char> {
    from_fn(move |input| {
        let (ch, rest) = input.split_first()?;
        (ch == expected).then_some((ch, rest))
    })
}

/// Match one character accepted by `predicate`.
pub fn satisfy<F>(predicate: F) -> impl Parser<char>
where
    F: Fn(char) -> bool,
{
    from_fn(move |input| {
        let (ch, rest) = input.split_first()?;
        predicate(ch).then_some((ch, rest))
    })
}

/// Match the whole of `text`, or nothing at all.
pub fn word(text: &str) -> impl Parser<String> {
    let text = text.to_owned();
    from_fn(move |input| {
        if input.as_str().starts_with(text.as_str()) {
            Some((text.clone(), input.skip(text.len())))
        } else {
            None
        }
    })
}

/// Consume one or more bytes up to (not including) either ASCII delimiter.
///
/// Behaves like `many1(satisfy(|c| c != a && c != b))` collected into a
/// `String`, but scans with `memchr`.
pub fn take_until_either(a: u8, b: u8) -> impl Parser<String> {
    debug_assert!(a.is_ascii() && b.is_ascii());
    from_fn(move |input| {
        let rest = input.as_str();
        let len = memchr::memchr2(a, b, rest.as_bytes()).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        // An ASCII byte never occurs inside a multi-byte sequence, so `len`
        // is a character boundary.
        Some((rest[..len].to_owned(), input.skip(len)))
    })
}

// ============================================================================
// Combinators
// ============================================================================

/// Run `parser` and return the text it consumed instead of its result.
pub fn recognize<A, P>(parser: P) -> impl Parser<String>
where
    P: Parser<A>,
{
    from_fn(move |input| {
        let (_, rest) = parser.parse(input)?;
        let len = rest.offset() - input.offset();
        Some((input.as_str()[..len].to_owned(), rest))
    })
}

/// Transform a successful result.
pub fn map<A, B, P, F>(parser: P, transform: F) -> impl Parser<B>
where
    P: Parser<A>,
    F: Fn(A) -> B,
{
    from_fn(move |input| {
        let (value, rest) = parser.parse(input)?;
        Some((transform(value), rest))
    })
}

/// Run `first`, then `second` on what remains; keep both results.
pub fn and<A, B, P, Q>(first: P, second: Q) -> impl Parser<(A, B)>
where
    P: Parser<A>,
    Q: Parser<B>,
{
    from_fn(move |input| {
        let (a, rest) = first.parse(input)?;
        let (b, rest) = second.parse(rest)?;
        Some(((a, b), rest))
    })
}

/// Sequence keeping only the right result.
pub fn eat_left<A, B, P, Q>(left: P, right: Q) -> impl Parser<B>
where
    P: Parser<A>,
    Q: Parser<B>,
{
    from_fn(move |input| {
        let (_, rest) = left.parse(input)?;
        right.parse(rest)
    })
}

/// Sequence keeping only the left result.
pub fn eat_right<A, B, P, Q>(left: P, right: Q) -> impl Parser<A>
where
    P: Parser<A>,
    Q: Parser<B>,
{
    from_fn(move |input| {
        let (a, rest) = left.parse(input)?;
        let (_, rest) = right.parse(rest)?;
        Some((a, rest))
    })
}

/// Ordered choice between two parsers.
pub fn or<A, P, Q>(first: P, second: Q) -> impl Parser<A>
where
    P: Parser<A>,
    Q: Parser<A>,
{
    from_fn(move |input| first.parse(input).or_else(|| second.parse(input)))
}

/// Ordered choice over a list; the first success wins.
pub fn one_of<A, P>(parsers: Vec<P>) -> impl Parser<A>
where
    P: Parser<A>,
{
    from_fn(move |input| parsers.iter().find_map(|parser| parser.parse(input)))
}

/// Zero or more repetitions. Never fails.
pub fn many<A, P>(parser: P) -> impl Parser<Vec<A>>
where
    P: Parser<A>,
{
    from_fn(move |input| Some(repeat(&parser, input)))
}

/// One or more repetitions.
pub fn many1<A, P>(parser: P) -> impl Parser<Vec<A>>
where
    P: Parser<A>,
{
    from_fn(move |input| {
        let (items, rest) = repeat(&parser, input);
        (!items.is_empty()).then_some((items, rest))
    })
}

/// Optional match. Never fails.
pub fn optional<A, P>(parser: P) -> impl Parser<Option<A>>
where
    P: Parser<A>,
{
    from_fn(move |input| match parser.parse(input) {
        Some((value, rest)) => Some((Some(value), rest)),
        None => Some((None, input)),
    })
}

/// `open body close`, keeping only `body`.
pub fn between<A, B, C, P, Q, R>(open: P, body: Q, close: R) -> impl Parser<B>
where
    P: Parser<A>,
    Q: Parser<B>,
    R: Parser<C>,
{
    from_fn(move |input| {
        let (_, rest) = open.parse(input)?;
        let (value, rest) = body.parse(rest)?;
        let (_, rest) = close.parse(rest)?;
        Some((value, rest))
    })
}

/// One or more `item`s separated by `separator`.
///
/// Zero items is a failure: `list` never matches empty input.
pub fn list<A, S, P, Q>(item: P, separator: Q) -> impl Parser<Vec<A>>
where
    P: Parser<A>,
    Q: Parser<S>,
{
    from_fn(move |input| {
        let (first, mut rest) = item.parse(input)?;
        let mut items = vec![first];
        while let Some((value, after)) = separator
            .parse(rest)
            .and_then(|(_, after_sep)| item.parse(after_sep))
        {
            items.push(value);
            if after.offset() == rest.offset() {
                break;
            }
            rest = after;
        }
        Some((items, rest))
    })
}

/// Apply `parser` until it fails or stops making progress.
fn repeat<'a, A, P>(parser: &P, mut input: Stream<'a>) -> (Vec<A>, Stream<'a>)
where
    P: Parser<A> + ?Sized,
{
    let mut items = Vec::new();
    while let Some((item, rest)) = parser.parse(input) {
        items.push(item);
        if rest.offset() == input.offset() {
            break;
        }
        input = rest;
    }
    (items, input)
}
