//! Tree representation for markup, rebuilt from a flat token stream.
//!
//! The builder walks the tokens once with an index cursor and an explicit
//! stack, so nesting depth is bounded by heap rather than call stack. The
//! finished tree is rendered, flattened to text and dropped iteratively too.
//!
//! - Text is pushed as a finished value.
//! - An opening tag is pushed as a *marker*: the raw token, waiting for its
//!   close.
//! - A closing tag pops values back to its marker, restores document order,
//!   and pushes the tagged value. One child is wrapped directly; any other
//!   count is wrapped in a `Sequence` first.
//!
//! Malformed nesting does not stop the build. Each problem is a [`TagError`];
//! under [`MismatchPolicy::Recover`] it is logged and collected in the
//! [`Outcome`], under [`MismatchPolicy::Strict`] the first one is returned.
//!
//! # Example
//!
//! ```
//! use weft_core::tree::{parse_markup, Markup};
//!
//! let outcome = parse_markup("<b>world</b>");
//! assert_eq!(
//!     outcome.value,
//!     Markup::Sequence(vec![Markup::Bold(Box::new(Markup::PlainText("world".into())))])
//! );
//! assert!(outcome.is_clean());
//! ```

use std::fmt;

use thiserror::Error;

use crate::lexer::tokenize;
use crate::token::{Tag, Token};

// ============================================================================
// Core Types
// ============================================================================

/// A markup value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Text content.
    PlainText(String),

    /// `<b>...</b>`
    Bold(Box<Markup>),

    /// `<i>...</i>`
    Italic(Box<Markup>),

    /// `<p>...</p>`
    Paragraph(Box<Markup>),

    /// `<a href="...">...</a>`
    Anchor { href: String, body: Box<Markup> },

    /// Siblings in document order.
    Sequence(Vec<Markup>),
}

impl Markup {
    /// The tag this value represents, if any.
    pub fn tag(&self) -> Option<Tag> {
        match self {
            Markup::Bold(_) => Some(Tag::Bold),
            Markup::Italic(_) => Some(Tag::Italic),
            Markup::Paragraph(_) => Some(Tag::Paragraph),
            Markup::Anchor { .. } => Some(Tag::Anchor),
            Markup::PlainText(_) | Markup::Sequence(_) => None,
        }
    }

    /// Collect all text content under this value, in document order.
    pub fn plain_text(&self) -> String {
        let mut result = String::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Markup::PlainText(s) => result.push_str(s),
                Markup::Bold(body)
                | Markup::Italic(body)
                | Markup::Paragraph(body)
                | Markup::Anchor { body, .. } => pending.push(&**body),
                Markup::Sequence(items) => pending.extend(items.iter().rev()),
            }
        }
        result
    }

    /// Write the value back out as markup text.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Move this node's children out, leaving it a leaf.
    fn detach_children(&mut self, out: &mut Vec<Markup>) {
        match self {
            Markup::PlainText(_) => {}
            Markup::Bold(body)
            | Markup::Italic(body)
            | Markup::Paragraph(body)
            | Markup::Anchor { body, .. } => {
                if !body.is_leaf() {
                    out.push(std::mem::replace(&mut **body, Markup::Sequence(Vec::new())));
                }
            }
            Markup::Sequence(items) => out.append(items),
        }
    }

    fn is_leaf(&self) -> bool {
        match self {
            Markup::PlainText(_) => true,
            Markup::Sequence(items) => items.is_empty(),
            _ => false,
        }
    }
}

// Trees can be nested far deeper than the call stack allows, so children are
// dropped from a worklist instead of recursively.
impl Drop for Markup {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

/// A unit of rendering work.
enum Piece<'a> {
    Node(&'a Markup),
    Close(Tag),
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];
        while let Some(piece) = pending.pop() {
            let node = match piece {
                Piece::Close(tag) => {
                    write!(f, "</{}>", tag.name())?;
                    continue;
                }
                Piece::Node(node) => node,
            };
            match node {
                Markup::PlainText(s) => f.write_str(s)?,
                Markup::Bold(body) | Markup::Italic(body) | Markup::Paragraph(body) => {
                    if let Some(tag) = node.tag() {
                        write!(f, "{}", tag)?;
                        pending.push(Piece::Close(tag));
                    }
                    pending.push(Piece::Node(&**body));
                }
                Markup::Anchor { href, body } => {
                    f.write_str("<a href=\"")?;
                    for ch in href.chars() {
                        match ch {
                            '"' => f.write_str("\\\"")?,
                            '\\' => f.write_str("\\\\")?,
                            '\n' => f.write_str("\\n")?,
                            '\r' => f.write_str("\\r")?,
                            '\t' => f.write_str("\\t")?,
                            c => write!(f, "{}", c)?,
                        }
                    }
                    f.write_str("\">")?;
                    pending.push(Piece::Close(Tag::Anchor));
                    pending.push(Piece::Node(&**body));
                }
                Markup::Sequence(items) => pending.extend(items.iter().rev().map(Piece::Node)),
            }
        }
        Ok(())
    }
}

/// A nesting problem found while building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// An open tag was still pending when an outer tag closed over it.
    /// The open tag is discarded; its content is kept.
    #[error("token {index}: open {found} discarded while closing {expected}")]
    Mismatched {
        expected: Tag,
        found: Tag,
        index: usize,
    },

    /// A close tag with no open tag of its kind anywhere on the stack.
    /// The close tag is ignored.
    #[error("token {index}: close of {tag} has no matching open tag")]
    UnmatchedEnd { tag: Tag, index: usize },

    /// An open tag never closed before the tokens ran out.
    /// The open tag is dropped; its content is kept.
    #[error("token {index}: {tag} is never closed")]
    Unclosed { tag: Tag, index: usize },
}

/// What to do when a [`TagError`] comes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Log it, record it in the outcome, and carry on.
    #[default]
    Recover,
    /// Stop and return it.
    Strict,
}

/// A built tree with the problems recovered from along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Always a `Sequence` of the top-level values.
    pub value: Markup,
    pub diagnostics: Vec<TagError>,
}

impl Outcome {
    /// Check whether the tokens were well nested.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ============================================================================
// Stack
// ============================================================================

/// An entry on the build stack.
#[derive(Debug)]
enum Element {
    /// An opening token awaiting its close, with its index in the token list.
    Marker(Token, usize),
    /// A finished value.
    Value(Markup),
}

impl Element {
    fn is_marker(&self) -> bool {
        matches!(self, Element::Marker(..))
    }

    fn tag(&self) -> Option<Tag> {
        match self {
            Element::Marker(token, _) => token.tag(),
            Element::Value(value) => value.tag(),
        }
    }

    /// Project to a value. Tag markers have none.
    fn into_value(self) -> Option<Markup> {
        match self {
            Element::Value(value) => Some(value),
            Element::Marker(..) => None,
        }
    }
}

/// Last-in, first-out storage for one build.
#[derive(Debug)]
struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    fn new() -> Self {
        Stack { items: Vec::new() }
    }

    fn push(&mut self, item: T) {
        self.items.push(item);
    }

    fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    /// Drain from the bottom of the stack up.
    fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Count of markers on the stack per tag kind.
#[derive(Debug, Default)]
struct OpenTags([usize; 4]);

impl OpenTags {
    fn slot(tag: Tag) -> usize {
        match tag {
            Tag::Bold => 0,
            Tag::Italic => 1,
            Tag::Paragraph => 2,
            Tag::Anchor => 3,
        }
    }

    fn opened(&mut self, tag: Tag) {
        self.0[Self::slot(tag)] += 1;
    }

    fn closed(&mut self, tag: Tag) {
        let count = &mut self.0[Self::slot(tag)];
        *count = count.saturating_sub(1);
    }

    fn contains(&self, tag: Tag) -> bool {
        self.0[Self::slot(tag)] > 0
    }
}

/// Mutable state of one build.
#[derive(Debug)]
struct Build {
    stack: Stack<Element>,
    open: OpenTags,
    diagnostics: Vec<TagError>,
}

// ============================================================================
// TreeBuilder
// ============================================================================

/// Builds a markup tree from tokens.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    policy: MismatchPolicy,
}

impl TreeBuilder {
    /// A builder with the `Recover` policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mismatch policy.
    pub fn policy(mut self, policy: MismatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a tree from `tokens`.
    ///
    /// Only returns `Err` under [`MismatchPolicy::Strict`].
    pub fn build(&self, tokens: &[Token]) -> Result<Outcome, TagError> {
        let mut build = Build {
            stack: Stack::new(),
            open: OpenTags::default(),
            diagnostics: Vec::new(),
        };
        let mut next = 0;

        while next < tokens.len() {
            match &tokens[next] {
                Token::PlainText(s) => build.stack.push(Element::Value(Markup::PlainText(s.clone()))),
                token @ (Token::BeginBold
                | Token::BeginItalic
                | Token::BeginParagraph
                | Token::BeginAnchor { .. }) => {
                    if let Some(tag) = token.tag() {
                        build.open.opened(tag);
                    }
                    build.stack.push(Element::Marker(token.clone(), next));
                }
                Token::EndBold => self.close(&mut build, Tag::Bold, next)?,
                Token::EndItalic => self.close(&mut build, Tag::Italic, next)?,
                Token::EndParagraph => self.close(&mut build, Tag::Paragraph, next)?,
                Token::EndAnchor => self.close(&mut build, Tag::Anchor, next)?,
            }
            let top = build.stack.peek();
            tracing::trace!(
                index = next,
                depth = build.stack.len(),
                top_is_marker = top.map_or(false, Element::is_marker),
                top_tag = ?top.and_then(Element::tag),
                "applied token"
            );
            next += 1;
        }

        let Build {
            stack,
            mut diagnostics,
            ..
        } = build;
        if stack.is_empty() {
            return Ok(Outcome {
                value: Markup::Sequence(Vec::new()),
                diagnostics,
            });
        }

        let mut values = Vec::with_capacity(stack.len());
        for element in stack.into_vec() {
            if let Element::Marker(token, index) = &element {
                if let Some(tag) = token.tag() {
                    self.report(TagError::Unclosed { tag, index: *index }, &mut diagnostics)?;
                }
            }
            values.extend(element.into_value());
        }

        Ok(Outcome {
            value: Markup::Sequence(values),
            diagnostics,
        })
    }

    /// Handle the close tag for `tag` found at token `index`.
    fn close(&self, build: &mut Build, tag: Tag, index: usize) -> Result<(), TagError> {
        if !build.open.contains(tag) {
            return self.report(TagError::UnmatchedEnd { tag, index }, &mut build.diagnostics);
        }

        let mut children = Vec::new();
        let opener = loop {
            match build.stack.pop() {
                Some(Element::Value(value)) => children.push(value),
                Some(Element::Marker(token, at)) => {
                    let Some(found) = token.tag() else { continue };
                    build.open.closed(found);
                    if found == tag {
                        break token;
                    }
                    let problem = TagError::Mismatched {
                        expected: tag,
                        found,
                        index: at,
                    };
                    self.report(problem, &mut build.diagnostics)?;
                }
                // The open count guarantees a matching marker.
                None => {
                    return self.report(TagError::UnmatchedEnd { tag, index }, &mut build.diagnostics)
                }
            }
        };

        children.reverse();
        let body = if children.len() == 1 {
            children.remove(0)
        } else {
            Markup::Sequence(children)
        };
        build.stack.push(Element::Value(enclose(tag, opener, body)));
        Ok(())
    }

    fn report(&self, problem: TagError, diagnostics: &mut Vec<TagError>) -> Result<(), TagError> {
        match self.policy {
            MismatchPolicy::Strict => Err(problem),
            MismatchPolicy::Recover => {
                tracing::warn!(%problem, "recovered from malformed markup");
                diagnostics.push(problem);
                Ok(())
            }
        }
    }
}

/// Wrap `body` in the value for `tag`, taking the href from an anchor opener.
fn enclose(tag: Tag, opener: Token, body: Markup) -> Markup {
    let body = Box::new(body);
    match tag {
        Tag::Bold => Markup::Bold(body),
        Tag::Italic => Markup::Italic(body),
        Tag::Paragraph => Markup::Paragraph(body),
        Tag::Anchor => {
            let href = match opener {
                Token::BeginAnchor { href } => href,
                _ => String::new(),
            };
            Markup::Anchor { href, body }
        }
    }
}

/// Build a tree from `tokens`, recovering from any nesting problems.
pub fn build_markup_tree(tokens: &[Token]) -> Markup {
    match TreeBuilder::new().build(tokens) {
        Ok(outcome) => outcome.value,
        Err(problem) => unreachable!("recover policy returned {}", problem),
    }
}

/// Tokenize and build `text` with the default settings.
pub fn parse_markup(text: &str) -> Outcome {
    let tokens = tokenize(text);
    match TreeBuilder::new().build(&tokens) {
        Ok(outcome) => outcome,
        Err(problem) => unreachable!("recover policy returned {}", problem),
    }
}

// ============================================================================
// Tests
// ============================================================================
