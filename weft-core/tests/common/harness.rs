//! Runs fixture cases and reports mismatches

use crate::common::{ExpectedToken, JsonCase, MarkupCase};
use weft_core::{parse_json, Token, Tokenizer, TreeBuilder};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub errors: Vec<String>,
}

/// Format token for comparison
fn format_token(token: &Token) -> String {
    match token {
        Token::PlainText(text) => format!("PlainText {:?}", text),
        Token::BeginAnchor { href } => format!("BeginAnchor {:?}", href),
        other => format!("{:?}", other),
    }
}

/// Format expected token for comparison
fn format_expected(token: &ExpectedToken) -> String {
    match token {
        ExpectedToken::Bare(name) => name.clone(),
        ExpectedToken::WithContent(name, content) => format!("{} {:?}", name, content),
    }
}

fn compare<T: PartialEq + std::fmt::Debug>(what: &str, expected: T, actual: T, errors: &mut Vec<String>) {
    if expected != actual {
        errors.push(format!("{}: expected {:?}, got {:?}", what, expected, actual));
    }
}

/// Run a markup case through the tokenizer and the tree builder
pub fn run_markup_case(case: &MarkupCase) -> TestResult {
    let scan = Tokenizer::markup().scan(&case.input);

    let actual: Vec<String> = scan.tokens.iter().map(format_token).collect();
    let expected: Vec<String> = case.tokens.iter().map(format_expected).collect();

    let mut errors = Vec::new();

    if actual.len() != expected.len() {
        errors.push(format!(
            "Token count mismatch: expected {}, got {}",
            expected.len(),
            actual.len()
        ));
    }
    for (i, (act, exp)) in actual.iter().zip(expected.iter()).enumerate() {
        if act != exp {
            errors.push(format!("Token {}: expected '{}', got '{}'", i, exp, act));
        }
    }
    compare("remaining", case.remaining, scan.remaining, &mut errors);

    match TreeBuilder::new().build(&scan.tokens) {
        Ok(outcome) => {
            if let Some(render) = &case.render {
                compare("render", render.clone(), outcome.value.render(), &mut errors);
            }
            if let Some(text) = &case.text {
                compare("plain text", text.clone(), outcome.value.plain_text(), &mut errors);
            }
            let diagnostics: Vec<String> =
                outcome.diagnostics.iter().map(ToString::to_string).collect();
            compare("diagnostics", case.diagnostics.clone(), diagnostics, &mut errors);
        }
        Err(e) => errors.push(format!("Recovering build failed: {}", e)),
    }

    TestResult {
        passed: errors.is_empty(),
        input: case.input.clone(),
        expected,
        actual,
        errors,
    }
}

/// Run a JSON case through the shared grammar
pub fn run_json_case(case: &JsonCase) -> TestResult {
    let result = parse_json(&case.input);

    let actual: Vec<String> = result
        .iter()
        .map(|(value, rest)| format!("{} rest {:?}", value, rest))
        .collect();
    let expected: Vec<String> = case
        .value
        .iter()
        .map(|value| format!("{} rest {:?}", value, case.rest))
        .collect();

    let mut errors = Vec::new();
    if actual != expected {
        errors.push("Parse result mismatch".to_string());
    }

    TestResult {
        passed: errors.is_empty(),
        input: case.input.clone(),
        expected,
        actual,
        errors,
    }
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("\nInput:");
        eprintln!("{}", self.input);
        eprintln!("\nExpected:");
        for (i, e) in self.expected.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nActual:");
        for (i, e) in self.actual.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
