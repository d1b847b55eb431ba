pub mod catalogs;
pub mod dialect;
pub mod error;
pub mod ffi;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod types;

pub use catalogs::GENERATOR_VERSION;
pub use dialect::{Dialect, MySql, Source};
pub use error::{ParseError, Result};
pub use ffi::{build_to_json, parse_to_json};
pub use generator::{generate, Generator};
pub use parser::{parse, parse_value};
pub use types::*;

/// Parse a YASQL document and render its SQL in one step.
pub fn build(content: &str, indent: Option<i64>) -> Result<String> {
    let model = parse(content)?;
    Ok(generate(&model, indent))
}
