//! Fixture loading from YAML files

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// A markup test case: input text, the tokens it should produce, and
/// optionally the rendered tree, its plain text and the recovered problems.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkupCase {
    pub id: String,
    pub desc: String,
    pub input: String,
    pub tokens: Vec<ExpectedToken>,
    #[serde(default)]
    pub render: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Number of bytes the tokenizer could not match.
    #[serde(default)]
    pub remaining: usize,
    /// Expected diagnostic messages, in order.
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

/// Expected token - either a bare name or [name, content]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpectedToken {
    /// Tag token with no payload (BeginBold, EndAnchor, etc.)
    Bare(String),
    /// Token with a payload [PlainText, "..."] or [BeginAnchor, "href"]
    WithContent(String, String),
}

/// A JSON test case. `value` is the compact rendering of the parsed value,
/// or absent when the input must be rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonCase {
    pub id: String,
    pub desc: String,
    pub input: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Text left after the value.
    #[serde(default)]
    pub rest: String,
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name<T: DeserializeOwned>(name: &str) -> Vec<T> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    load_fixtures(&path)
}
