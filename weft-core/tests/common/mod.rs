//! Test infrastructure for the weft grammars
//!
//! Provides fixture loading and comparison helpers.

mod harness;
mod loader;

pub use harness::{run_json_case, run_markup_case};
pub use loader::{load_fixtures_by_name, ExpectedToken, JsonCase, MarkupCase};
