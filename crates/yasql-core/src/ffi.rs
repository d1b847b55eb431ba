//! FFI-oriented JSON API for cross-language bindings.
//!
//! All functions take string inputs and return JSON strings,
//! minimizing the FFI surface area.

use crate::error::ParseError;
use crate::types::SchemaModel;
use crate::{generate, parse};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Options types (deserialized from JSON input)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildOptions {
    /// Spaces per indentation level. Anything but a non-negative integer
    /// falls back to the default.
    #[serde(default)]
    pub indent: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Result types (serialized to JSON output)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct FfiResult<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl<T: Serialize> FfiResult<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }
}

impl FfiResult<()> {
    fn err(message: String, kind: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            kind: Some(kind.to_string()),
        }
    }
}

fn to_json<T: Serialize>(result: std::thread::Result<Result<T, ParseError>>) -> String {
    match result {
        Ok(Ok(data)) => serde_json::to_string(&FfiResult::ok(data)).unwrap_or_else(|e| {
            failure_json(format!("JSON serialization error: {e}"), "Serialization")
        }),
        Ok(Err(e)) => failure_json(e.to_string(), e.kind()),
        Err(_) => failure_json("Internal parser panic".to_string(), "Panic"),
    }
}

fn failure_json(message: String, kind: &str) -> String {
    serde_json::to_string(&FfiResult::err(message, kind))
        .unwrap_or_else(|_| r#"{"success":false,"error":"JSON serialization error"}"#.to_string())
}

// ---------------------------------------------------------------------------
// Public FFI functions
// ---------------------------------------------------------------------------

/// Parse a YASQL document and return the schema model as JSON.
///
/// Output: `{ "success": true, "data": <model> }` or
/// `{ "success": false, "error": "...", "kind": "<error kind>" }`
pub fn parse_to_json(content: &str) -> String {
    let result = std::panic::catch_unwind(|| parse(content));
    to_json::<SchemaModel>(result)
}

/// Parse a YASQL document and return the generated SQL as a JSON string.
///
/// Input: YASQL text + options JSON (`{ "indent": 4 }`, may be empty)
/// Output: `{ "success": true, "data": "<sql>" }` or an error object
pub fn build_to_json(content: &str, options_json: &str) -> String {
    let opts: BuildOptions = if options_json.trim().is_empty() {
        BuildOptions::default()
    } else {
        match serde_json::from_str(options_json) {
            Ok(o) => o,
            Err(e) => return failure_json(format!("Invalid options JSON: {e}"), "InvalidOptions"),
        }
    };
    let indent = opts.indent.as_ref().and_then(serde_json::Value::as_i64);

    let result = std::panic::catch_unwind(|| parse(content).map(|model| generate(&model, indent)));
    to_json(result)
}
