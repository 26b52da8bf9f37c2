//! Markup tokens - the flat output of the tokenizer.
//!
//! Structure is represented by begin/end pairs, the way a SAX stream
//! represents it. Nesting is only recovered later by the tree builder.
//!
//! `<p>hello <b>world</b></p>` tokenizes to:
//! ```text
//! BeginParagraph
//! PlainText("hello ")
//! BeginBold
//! PlainText("world")
//! EndBold
//! EndParagraph
//! ```

use std::fmt;

/// The four tag kinds the markup language knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `<b>...</b>`
    Bold,
    /// `<i>...</i>`
    Italic,
    /// `<p>...</p>`
    Paragraph,
    /// `<a href="...">...</a>`
    Anchor,
}

impl Tag {
    /// The tag name as written in markup.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Bold => "b",
            Tag::Italic => "i",
            Tag::Paragraph => "p",
            Tag::Anchor => "a",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name())
    }
}

/// Markup tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text between tags; never contains `<` or `>`.
    PlainText(String),

    /// `<b>`
    BeginBold,
    /// `</b>`
    EndBold,

    /// `<i>`
    BeginItalic,
    /// `</i>`
    EndItalic,

    /// `<p>`
    BeginParagraph,
    /// `</p>`
    EndParagraph,

    /// `<a href="...">`, with escapes in the attribute already resolved.
    BeginAnchor { href: String },
    /// `</a>`
    EndAnchor,
}

impl Token {
    /// The tag this token opens or closes, if any.
    pub fn tag(&self) -> Option<Tag> {
        match self {
            Token::PlainText(_) => None,
            Token::BeginBold | Token::EndBold => Some(Tag::Bold),
            Token::BeginItalic | Token::EndItalic => Some(Tag::Italic),
            Token::BeginParagraph | Token::EndParagraph => Some(Tag::Paragraph),
            Token::BeginAnchor { .. } | Token::EndAnchor => Some(Tag::Anchor),
        }
    }

    /// Check if this token opens a tag.
    pub fn is_begin(&self) -> bool {
        matches!(
            self,
            Token::BeginBold
                | Token::BeginItalic
                | Token::BeginParagraph
                | Token::BeginAnchor { .. }
        )
    }

    /// Check if this token closes a tag.
    pub fn is_end(&self) -> bool {
        matches!(
            self,
            Token::EndBold | Token::EndItalic | Token::EndParagraph | Token::EndAnchor
        )
    }
}
