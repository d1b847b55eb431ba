//! YASQL WASM bindings.
//!
//! JavaScript-callable wrappers around the JSON API. Each returns
//! `{ success: boolean, data?: ..., error?: string, kind?: string }` as a string.

use yasql_core::{build_to_json, parse_to_json};
use wasm_bindgen::prelude::*;

/// Parse a YASQL document and return the schema model as JSON.
///
/// @param content - YASQL (YAML) text
/// @returns JSON string with `{ success: boolean, data?: SchemaModel, error?: string }`
#[wasm_bindgen(js_name = "parse")]
pub fn wasm_parse(content: &str) -> String {
    parse_to_json(content)
}

/// Generate MySQL DDL from a YASQL document.
///
/// @param content - YASQL (YAML) text
/// @param options_json - JSON options `{ indent?: number }`, may be empty
/// @returns JSON string with `{ success: boolean, data?: string, error?: string }`
#[wasm_bindgen(js_name = "build")]
pub fn wasm_build(content: &str, options_json: &str) -> String {
    build_to_json(content, options_json)
}
