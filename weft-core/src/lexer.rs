//! Markup tokenizer.
//!
//! Each rule is an ordinary [`Parser<Token>`]. The tokenizer owns an ordered
//! rule list and drives it over the input in one of two [`ScanMode`]s:
//!
//! - `EveryRule` (default): every pass tries *all* rules in order. A rule
//!   that matches appends its token and moves the position forward before
//!   the next rule is tried, so one pass can emit several tokens.
//! - `FirstMatch`: at each position only the first matching rule fires.
//!
//! With the built-in markup rules no two rules can match at the same
//! position, so both modes agree. They diverge for custom rule lists where a
//! later rule matches a longer prefix than an earlier one (see the tests).
//!
//! Scanning stops at the end of input or when no rule makes progress, e.g.
//! at a stray `<` or an unknown tag. [`Tokenizer::scan`] reports how far it
//! got.

use once_cell::sync::Lazy;
use phf::{phf_map, phf_ordered_map};

use crate::combinator::{
    and, between, eat_left, eat_right, from_fn, literal, many, map, or, satisfy,
    take_until_either, word, Boxed, Parser,
};
use crate::stream::Stream;
use crate::token::Token;

/// Fixed tag words, in rule priority order.
static FIXED_TAGS: phf::OrderedMap<&'static str, Token> = phf_ordered_map! {
    "<b>" => Token::BeginBold,
    "</b>" => Token::EndBold,
    "<i>" => Token::BeginItalic,
    "</i>" => Token::EndItalic,
    "<p>" => Token::BeginParagraph,
    "</p>" => Token::EndParagraph,
};

/// Escape sequences allowed in an `href` value, keyed by the character after `\`.
static HREF_ESCAPES: phf::Map<char, char> = phf_map! {
    '"' => '"',
    '\\' => '\\',
    '/' => '/',
    'n' => '\n',
    'r' => '\r',
    't' => '\t',
};

static MARKUP: Lazy<Tokenizer> = Lazy::new(Tokenizer::markup);

/// Tokenize `text` with the built-in markup rules.
///
/// Input after the point where no rule applies is dropped; use
/// [`Tokenizer::scan`] to find out whether that happened.
pub fn tokenize(text: &str) -> Vec<Token> {
    MARKUP.tokenize(text)
}

/// How the tokenizer applies its rules at each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Try every rule once per pass, each from where the previous one left off.
    #[default]
    EveryRule,
    /// Fire only the first rule that matches at the current position.
    FirstMatch,
}

/// Result of a tokenizer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub tokens: Vec<Token>,
    /// Bytes of input covered by `tokens`.
    pub consumed: usize,
    /// Bytes of input no rule could match.
    pub remaining: usize,
}

impl Scan {
    /// Check whether the whole input was tokenized.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// An ordered set of token rules plus a scan mode.
#[derive(Debug, Default)]
pub struct Tokenizer {
    rules: Vec<Boxed<Token>>,
    mode: ScanMode,
}

impl Tokenizer {
    /// A tokenizer with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tokenizer with the markup rules: plain text, the fixed tags,
    /// then the anchor tags.
    pub fn markup() -> Self {
        let tokenizer = Self::new().rule(plain_text());
        let tokenizer = FIXED_TAGS
            .entries()
            .fold(tokenizer, |t, (text, token)| t.rule(fixed_tag(text, token.clone())));
        tokenizer.rule(begin_anchor()).rule(end_anchor())
    }

    /// Append a rule with the lowest priority so far.
    pub fn rule<P>(mut self, rule: P) -> Self
    where
        P: Parser<Token> + Send + Sync + 'static,
    {
        self.rules.push(rule.boxed());
        self
    }

    /// Set the scan mode.
    pub fn scan_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Tokenize `text`, dropping anything after the point where scanning stopped.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.scan(text).tokens
    }

    /// Tokenize `text` and report how much of it was consumed.
    pub fn scan(&self, text: &str) -> Scan {
        let mut input = Stream::new(text);
        let mut tokens = Vec::new();

        match self.mode {
            ScanMode::EveryRule => loop {
                let start = input.offset();
                for rule in &self.rules {
                    if let Some((token, rest)) = rule.parse(input) {
                        tokens.push(token);
                        input = rest;
                    }
                }
                if input.is_empty() || input.offset() == start {
                    break;
                }
            },
            ScanMode::FirstMatch => {
                while let Some((token, rest)) =
                    self.rules.iter().find_map(|rule| rule.parse(input))
                {
                    tokens.push(token);
                    if rest.offset() == input.offset() {
                        break;
                    }
                    input = rest;
                }
            }
        }

        let remaining = input.as_str().len();
        if remaining > 0 {
            tracing::debug!(
                offset = input.offset(),
                remaining,
                mode = ?self.mode,
                "tokenizer stopped before end of input"
            );
        }

        Scan {
            tokens,
            consumed: input.offset(),
            remaining,
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Longest run of characters other than `<` and `>`.
pub fn plain_text() -> impl Parser<Token> {
    map(take_until_either(b'<', b'>'), Token::PlainText)
}

/// A tag written as fixed text.
pub fn fixed_tag(text: &str, token: Token) -> impl Parser<Token> {
    map(word(text), move |_| token.clone())
}

/// `<a href="...">`, with optional whitespace around the attribute.
pub fn begin_anchor() -> impl Parser<Token> {
    let space = || many(satisfy(char::is_whitespace));
    let escaped = eat_left(
        literal('\\'),
        from_fn(|input| {
            let (ch, rest) = input.split_first()?;
            HREF_ESCAPES.get(&ch).map(|&unescaped| (unescaped, rest))
        }),
    );
    let unescaped = satisfy(|c| c != '\\' && c != '"');
    let quoted = between(literal('"'), many(or(unescaped, escaped)), literal('"'));

    let open = and(and(word("<a"), space()), word("href="));
    let href = eat_right(eat_left(open, quoted), and(space(), literal('>')));
    map(href, |chars: Vec<char>| Token::BeginAnchor {
        href: chars.into_iter().collect(),
    })
}

/// `</a>`
pub fn end_anchor() -> impl Parser<Token> {
    fixed_tag("</a>", Token::EndAnchor)
}
