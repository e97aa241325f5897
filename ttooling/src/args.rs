//! JSON argument parsing helpers for function and trait-based tools.
//!
//! ```rust
//! use ttooling::{optional_bool, parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"query":"balance"}"#).expect("object should parse");
//! let query = required_string(&args, "query").expect("query should be present");
//! assert_eq!(query, "balance");
//! assert_eq!(optional_bool(&args, "include_pending").expect("absent is fine"), None);
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

/// Parses an argument payload that must be a JSON object. A blank payload
/// is read as `{}`, which is what models send for argument-less calls.
pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    if args_json.trim().is_empty() {
        return Ok(Map::new());
    }

    match parse_json_value(args_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments(
            "expected JSON object arguments",
        )),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn required_bool(args: &Map<String, Value>, key: &str) -> Result<bool, ToolError> {
    args.get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required boolean: '{key}'")))
}

pub fn required_i64(args: &Map<String, Value>, key: &str) -> Result<i64, ToolError> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required integer: '{key}'")))
}

pub fn optional_bool(args: &Map<String, Value>, key: &str) -> Result<Option<bool>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "argument '{key}' must be a boolean"
        ))),
    }
}
