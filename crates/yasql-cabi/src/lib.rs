//! C ABI bindings for YASQL.
//!
//! All functions use C-compatible string types:
//! - Input: `*const c_char` (null-terminated C string)
//! - Output: `*mut c_char` (caller must free with `yasql_free_string`)
//!
//! This crate builds as a cdylib for use via P/Invoke (C#), ctypes (Python), etc.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use yasql_core::{build_to_json, parse_to_json};

static VERSION: &CStr = match CStr::from_bytes_with_nul(
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes(),
) {
    Ok(v) => v,
    Err(_) => c"unknown",
};

/// Parse a YASQL document and return the schema model as JSON.
///
/// # Safety
/// - `content` must be a valid null-terminated UTF-8 string.
/// - The returned pointer must be freed with `yasql_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn yasql_parse(content: *const c_char) -> *mut c_char {
    let content = unsafe { CStr::from_ptr(content) };

    let content_str = match content.to_str() {
        Ok(s) => s,
        Err(_) => return to_c_string(r#"{"success":false,"error":"Invalid UTF-8 in content"}"#),
    };

    to_c_string(&parse_to_json(content_str))
}

/// Generate SQL from a YASQL document. The SQL is the `data` field of the
/// returned JSON.
///
/// # Safety
/// - `content` must be a valid null-terminated UTF-8 string.
/// - `options_json` must be a valid null-terminated UTF-8 string (`{"indent": 4}`
///   or empty).
/// - The returned pointer must be freed with `yasql_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn yasql_build(
    content: *const c_char,
    options_json: *const c_char,
) -> *mut c_char {
    let content = unsafe { CStr::from_ptr(content) };
    let options_json = unsafe { CStr::from_ptr(options_json) };

    let content_str = match content.to_str() {
        Ok(s) => s,
        Err(_) => return to_c_string(r#"{"success":false,"error":"Invalid UTF-8 in content"}"#),
    };
    let options_str = match options_json.to_str() {
        Ok(s) => s,
        Err(_) => {
            return to_c_string(r#"{"success":false,"error":"Invalid UTF-8 in options_json"}"#)
        }
    };

    to_c_string(&build_to_json(content_str, options_str))
}

/// Library version as a static string. Do not free.
#[unsafe(no_mangle)]
pub extern "C" fn yasql_version() -> *const c_char {
    VERSION.as_ptr()
}

/// Free a string previously returned by `yasql_parse` or `yasql_build`.
///
/// # Safety
/// - `ptr` must be a pointer previously returned by one of the yasql_* functions,
///   or null (in which case this is a no-op).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn yasql_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s)
        .unwrap_or_else(|_| CString::new("").unwrap())
        .into_raw()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_build(content: &str, options: &str) -> String {
        let content = CString::new(content).unwrap();
        let options = CString::new(options).unwrap();
        let ptr = unsafe { yasql_build(content.as_ptr(), options.as_ptr()) };
        let out = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { yasql_free_string(ptr) };
        out
    }

    #[test]
    fn build_round_trip_through_c_strings() {
        let out = call_build("database:\n  name: db", "");
        assert!(out.starts_with(r#"{"success":true"#));
        assert!(out.contains("CREATE DATABASE IF NOT EXISTS `db`"));
    }

    #[test]
    fn build_reports_error_kind() {
        let out = call_build("database: {}", "");
        assert!(out.contains(r#""success":false"#));
        assert!(out.contains(r#""kind":"MissingDatabaseName""#));
    }

    #[test]
    fn version_matches_package() {
        let v = unsafe { CStr::from_ptr(yasql_version()) };
        assert_eq!(v.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn free_null_is_noop() {
        unsafe { yasql_free_string(std::ptr::null_mut()) };
    }
}
