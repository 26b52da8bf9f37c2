//! JSON grammar built from the combinators in [`crate::combinator`].
//!
//! ```text
//! value     := null | true | false | number | string | array | object
//! number    := '-'? digit+ ('.' digit+)?
//! string    := '"' [A-Za-z \t_-]+ '"'
//! array     := '[' value (',' value)* ']'
//! object    := '{' key_value (',' key_value)* '}'
//! key_value := string ':' value
//! ```
//!
//! This is a deliberately small dialect. There is no whitespace between
//! tokens, no escapes in strings, and no exponents. `list` needs at least one
//! element, so `[]`, `{}` and `""` are all rejected.
//!
//! The grammar refers to itself through a [`Forward`] slot. It is built once,
//! on first use, and shared read-only by every caller afterwards. Nesting
//! depth costs call-stack depth: each level of `[`/`{` adds a handful of
//! frames.

use std::str::FromStr;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::combinator::{
    and, between, eat_left, eat_right, from_fn, list, literal, many1, map, one_of, optional,
    recognize, run, satisfy, word, Boxed, Forward, Parser,
};
use crate::value::{Number, Value};

static GRAMMAR: Lazy<Forward<Value>> = Lazy::new(|| {
    tracing::debug!("building JSON grammar");
    grammar()
});

/// Error from a whole-input JSON parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    /// The input does not start with a value.
    #[error("no JSON value at start of input")]
    NoMatch,

    /// A value was read but input remains after it.
    #[error("unexpected input after JSON value at byte {offset}")]
    TrailingInput { offset: usize },
}

/// Parse one JSON value from the start of `text`.
///
/// Returns the value and whatever text follows it. Whether leftover text is
/// an error is up to the caller; see [`from_str`] for the strict version.
pub fn parse_json(text: &str) -> Option<(Value, &str)> {
    run(value_parser(), text)
}

/// Parse `text` as exactly one JSON value.
pub fn from_str(text: &str) -> Result<Value, JsonError> {
    let (value, rest) = parse_json(text).ok_or(JsonError::NoMatch)?;
    if rest.is_empty() {
        Ok(value)
    } else {
        Err(JsonError::TrailingInput {
            offset: text.len() - rest.len(),
        })
    }
}

/// The shared value parser, for embedding JSON in other grammars.
pub fn value_parser() -> &'static Forward<Value> {
    &GRAMMAR
}

impl FromStr for Value {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_str(s)
    }
}

fn grammar() -> Forward<Value> {
    let value = Forward::new();
    let rules: Vec<Boxed<Value>> = vec![
        null().boxed(),
        boolean(true).boxed(),
        boolean(false).boxed(),
        number().boxed(),
        string().boxed(),
        array(value.clone()).boxed(),
        object(value.clone()).boxed(),
    ];
    if value.define(one_of(rules)).is_err() {
        unreachable!("fresh slot is already defined");
    }
    value
}

fn null() -> impl Parser<Value> {
    map(word("null"), |_| Value::Null)
}

fn boolean(b: bool) -> impl Parser<Value> {
    map(word(if b { "true" } else { "false" }), move |_| Value::Bool(b))
}

fn number() -> impl Parser<Value> {
    let digits = || many1(satisfy(|c| c.is_ascii_digit()));
    let lexeme = recognize(and(
        and(optional(literal('-')), digits()),
        optional(eat_left(literal('.'), digits())),
    ));
    from_fn(move |input| {
        let (text, rest) = lexeme.parse(input)?;
        let number = Number::from_lexeme(&text)?;
        Some((Value::Number(number), rest))
    })
}

fn quoted_string() -> impl Parser<String> {
    let letter = satisfy(|c| c.is_ascii_alphabetic() || matches!(c, ' ' | '\t' | '_' | '-'));
    let body = map(many1(letter), |chars: Vec<char>| chars.into_iter().collect::<String>());
    between(literal('"'), body, literal('"'))
}

fn string() -> impl Parser<Value> {
    map(quoted_string(), Value::String)
}

fn array(value: Forward<Value>) -> impl Parser<Value> {
    let items = list(value, literal(','));
    map(between(literal('['), items, literal(']')), Value::Array)
}

fn object(value: Forward<Value>) -> impl Parser<Value> {
    let key_value = and(eat_right(quoted_string(), literal(':')), value);
    let members = list(key_value, literal(','));
    map(between(literal('{'), members, literal('}')), |pairs: Vec<(String, Value)>| {
        Value::Object(pairs.into_iter().collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Value> {
        match parse_json(text) {
            Some((value, "")) => Some(value),
            _ => None,
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("null"), Some(Value::Null));
        assert_eq!(parse("true"), Some(Value::Bool(true)));
        assert_eq!(parse("false"), Some(Value::Bool(false)));
        assert_eq!(parse("nul"), None);
        assert_eq!(parse("True"), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("42"), Some(Value::Number(Number::Int(42))));
        assert_eq!(parse("-123.34"), Some(Value::Number(Number::Double(-123.34))));
        assert_eq!(parse("0.5"), Some(Value::Number(Number::Double(0.5))));
        assert_eq!(parse("-"), None);
    }

    #[test]
    fn test_number_leaves_unmatched_suffix() {
        assert_eq!(
            parse_json("1.x"),
            Some((Value::Number(Number::Int(1)), ".x"))
        );
        assert_eq!(
            parse_json("12e3"),
            Some((Value::Number(Number::Int(12)), "e3"))
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse("\"name\""), Some(Value::from("name")));
        assert_eq!(parse("\"Swift on iOS\""), Some(Value::from("Swift on iOS")));
        assert_eq!(parse("\"tab\there_and-dash\""), Some(Value::from("tab\there_and-dash")));
    }

    #[test]
    fn test_string_alphabet_is_restricted() {
        assert_eq!(parse("\"\""), None);
        assert_eq!(parse("\"abc1\""), None);
        assert_eq!(parse("\"a\\\"b\""), None);
        assert_eq!(parse("\"héllo\""), None);
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            parse("[1,null,\"x\"]"),
            Some(Value::Array(vec![
                Value::from(1i64),
                Value::Null,
                Value::from("x"),
            ]))
        );
        assert_eq!(
            parse("[[true],[false]]"),
            Some(Value::Array(vec![
                Value::Array(vec![Value::Bool(true)]),
                Value::Array(vec![Value::Bool(false)]),
            ]))
        );
    }

    #[test]
    fn test_empty_containers_are_rejected() {
        assert_eq!(parse_json("[]"), None);
        assert_eq!(parse_json("{}"), None);
        assert_eq!(parse_json("[[]]"), None);
    }

    #[test]
    fn test_whitespace_is_not_accepted() {
        assert_eq!(parse_json("[1, 2]"), None);
        assert_eq!(parse_json(" 1"), None);
        assert_eq!(parse_json("1 "), Some((Value::from(1i64), " ")));
    }

    #[test]
    fn test_object() {
        let value = parse("{\"name\":\"NIX\",\"age\":18}").unwrap();
        assert_eq!(value.get("name").and_then(Value::as_str), Some("NIX"));
        assert_eq!(value.get("age").and_then(Value::as_i64), Some(18));
        assert_eq!(value.as_object().map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_duplicate_keys_keep_last() {
        let value = parse("{\"k\":1,\"k\":2}").unwrap();
        assert_eq!(value.as_object().map(|m| m.len()), Some(1));
        assert_eq!(value.get("k").and_then(Value::as_i64), Some(2));
    }

    #[test]
    fn test_nested_document() {
        let text = "{\"name\":\"NIX\",\"age\":18,\"detail\":{\"skills\":[\"Swift on iOS\",\"C on Linux\"],\"projects\":[{\"name\":\"coolie\",\"intro\":\"Generate models from a JSON file\"},{\"name\":\"parser\",\"intro\":null}]}}";
        let value = parse(text).unwrap();

        let detail = value.get("detail").unwrap();
        let skills = detail.get("skills").and_then(Value::as_array).unwrap();
        assert_eq!(skills, &[Value::from("Swift on iOS"), Value::from("C on Linux")]);

        let projects = detail.get("projects").and_then(Value::as_array).unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects[1].get("intro").unwrap().is_null());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("[1,2]".parse::<Value>().ok(), parse("[1,2]"));
        assert_eq!(from_str("{}"), Err(JsonError::NoMatch));
        assert_eq!(from_str("1,2"), Err(JsonError::TrailingInput { offset: 1 }));
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 64;
        let text = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        let mut value = parse(&text).unwrap();
        for _ in 0..depth {
            value = match value {
                Value::Array(mut items) => items.remove(0),
                other => panic!("expected array, got {:?}", other),
            };
        }
        assert_eq!(value, Value::from(1i64));
    }

    #[test]
    fn test_shared_across_threads() {
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4i64)
                .map(|i| s.spawn(move || from_str(&format!("[{},{}]", i, i + 1))))
                .collect();
            for (i, handle) in handles.into_iter().enumerate() {
                let i = i as i64;
                assert_eq!(
                    handle.join().unwrap(),
                    Ok(Value::Array(vec![Value::from(i), Value::from(i + 1)]))
                );
            }
        });
    }

    #[test]
    fn test_display_reads_back() {
        let text = "{\"a\":[1,-2.5,true],\"b\":{\"c\":null}}";
        let value = parse(text).unwrap();
        assert_eq!(value.to_string(), text);
        assert_eq!(parse(&value.to_string()), Some(value));
    }
}
