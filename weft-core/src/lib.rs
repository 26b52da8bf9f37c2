//! Weft Core
//!
//! Small parser combinators over `&str`, with two grammars built on them:
//! a restricted JSON dialect and a tag-based markup language whose flat
//! token stream is folded back into a tree.
//!
//! # Architecture
//!
//! - **stream.rs** - Cursor over borrowed text
//! - **combinator.rs** - `Parser` trait, primitives, combinators, forward slots
//! - **value.rs** - JSON value types
//! - **json.rs** - JSON grammar
//! - **token.rs** - Markup tokens and tag kinds
//! - **lexer.rs** - Rule-driven markup tokenizer
//! - **tree.rs** - Stack-based tree builder for markup tokens

pub mod combinator;
pub mod json;
pub mod lexer;
pub mod stream;
pub mod token;
pub mod tree;
pub mod value;

pub use combinator::{run, Boxed, Forward, Parser};
pub use json::{parse_json, JsonError};
pub use lexer::{tokenize, Scan, ScanMode, Tokenizer};
pub use stream::Stream;
pub use token::{Tag, Token};
pub use tree::{
    build_markup_tree, parse_markup, Markup, MismatchPolicy, Outcome, TagError, TreeBuilder,
};
pub use value::{Number, Value};
