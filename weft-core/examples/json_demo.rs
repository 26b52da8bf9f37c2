//! Parse JSON from stdin (or a built-in sample) and print what was read.
//!
//! Run with: RUST_LOG=debug cargo run --example json_demo < doc.json

use std::io::{IsTerminal, Read};

use tracing_subscriber::EnvFilter;
use weft_core::json::{from_str, parse_json};

const SAMPLE: &str = "{\"name\":\"NIX\",\"age\":18,\"detail\":{\"skills\":[\"Swift on iOS\",\"C on Linux\"],\"projects\":[{\"name\":\"coolie\",\"intro\":\"Generate models from a JSON file\"},{\"name\":\"parser\",\"intro\":null}]}}";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut input = String::new();
    if std::io::stdin().is_terminal() {
        input.push_str(SAMPLE);
    } else {
        std::io::stdin()
            .read_to_string(&mut input)
            .expect("failed to read stdin");
    }
    let input = input.trim_end();

    match from_str(input) {
        Ok(value) => {
            println!("{}", value);
            if let Some(object) = value.as_object() {
                println!("\n{} top-level keys:", object.len());
                for key in object.keys() {
                    println!("  {}", key);
                }
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some((value, rest)) = parse_json(input) {
                eprintln!("  read {} before {:?}", value, rest);
            }
            std::process::exit(1);
        }
    }
}
