//! Tokenize markup, build the tree, and print every stage.
//!
//! Run with: RUST_LOG=trace cargo run --example markup_demo -- '<b>hi</b>'

use tracing_subscriber::EnvFilter;
use weft_core::{MismatchPolicy, Tokenizer, TreeBuilder};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "<p>hello <b>world</b><i>!</i></p>".to_string());

    let scan = Tokenizer::markup().scan(&input);
    println!("Input: {:?}\n", input);
    println!("Tokens:");
    for token in &scan.tokens {
        println!("  {:?}", token);
    }
    if !scan.is_complete() {
        println!("  ({} bytes not tokenized)", scan.remaining);
    }

    let outcome = match TreeBuilder::new()
        .policy(MismatchPolicy::Recover)
        .build(&scan.tokens)
    {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    println!("\nTree:\n  {:#?}", outcome.value);
    println!("\nRendered:   {}", outcome.value);
    println!("Plain text: {}", outcome.value.plain_text());
    for problem in &outcome.diagnostics {
        println!("warning: {}", problem);
    }
}
