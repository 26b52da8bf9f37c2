//! JSON value types.
//!
//! These are the output of the JSON grammar in [`crate::json`]. The grammar
//! produces them directly from characters, with no intermediate token layer.

use std::collections::BTreeMap;
use std::fmt;

/// A JSON number, keeping integers and doubles apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A lexeme with no fractional part that fits in `i64`.
    Int(i64),
    /// Anything else.
    Double(f64),
}

impl Number {
    /// Classify a numeric lexeme: `-?[0-9]+(\.[0-9]+)?`.
    ///
    /// Returns `None` if the lexeme is not of that shape.
    pub fn from_lexeme(lexeme: &str) -> Option<Number> {
        let (negative, rest) = match lexeme.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, lexeme),
        };

        let (whole, fraction) = match rest.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (rest, None),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        match fraction {
            None => Self::try_parse_decimal(negative, whole.as_bytes())
                .map(Number::Int)
                .or_else(|| lexeme.parse().ok().map(Number::Double)),
            Some(fraction) => {
                if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                lexeme.parse().ok().map(Number::Double)
            }
        }
    }

    /// The number as a double, converting integers.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Double(d) => d,
        }
    }

    fn try_parse_decimal(negative: bool, bytes: &[u8]) -> Option<i64> {
        // Accumulate negatively so that i64::MIN is representable.
        let mut result: i64 = 0;
        for &b in bytes {
            result = result.checked_mul(10)?.checked_sub((b - b'0') as i64)?;
        }
        if negative {
            Some(result)
        } else {
            result.checked_neg()
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Double(d) if !d.is_finite() => f.write_str("null"),
            // Keep a fractional part so the text reads back as a double.
            Number::Double(d) if d.fract() == 0.0 => write!(f, "{:.1}", d),
            Number::Double(d) => write!(f, "{}", d),
        }
    }
}

/// A JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,

    /// `true` or `false`
    Bool(bool),

    /// `42`, `-123.34`
    Number(Number),

    /// `"quoted text"`
    String(String),

    /// `{"key":value,...}`; a later duplicate key replaces an earlier one.
    Object(BTreeMap<String, Value>),

    /// `[value,...]`
    Array(Vec<Value>),
}

impl Value {
    /// Check if this is `null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer. Doubles are not converted.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(Number::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as double, converting integers.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Try to get as string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as array.
    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get as object.
    #[inline]
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Int(i))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Number(Number::Double(d))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// Compact JSON text, with no whitespace between tokens.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write_quoted(f, s),
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ":{}", value)?;
                }
                f.write_str("}")
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}
