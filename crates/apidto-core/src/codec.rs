//! # JSON Codec
//!
//! Thin wrapper over `serde_json` for the text forms of serialized mappings.
//! Key order is preserved (`serde_json` is built with `preserve_order`), so
//! `encode` emits fields in declaration order.

use serde_json::{Map, Value};

use crate::construct::json_kind;
use crate::error::DtoError;

/// Encode a mapping as compact JSON text.
///
/// # Errors
///
/// Returns `DtoError::Encode` if serialization fails.
pub fn encode(map: &Map<String, Value>) -> Result<String, DtoError> {
    serde_json::to_string(map).map_err(|e| DtoError::Encode(e.to_string()))
}

/// Decode JSON text that must hold an object.
///
/// # Errors
///
/// Returns `DtoError::MalformedInput` for invalid JSON and
/// `DtoError::TypeMismatch` for valid JSON that is not an object.
pub fn decode(text: &str) -> Result<Map<String, Value>, DtoError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DtoError::MalformedInput(e.to_string()))?;
    expect_object(value)
}

/// Require a top-level JSON object.
///
/// # Errors
///
/// Returns `DtoError::TypeMismatch` at path `$` for any other JSON kind.
pub fn expect_object(value: Value) -> Result<Map<String, Value>, DtoError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DtoError::TypeMismatch {
            path: "$".to_string(),
            expected: "object".to_string(),
            found: json_kind(&other).to_string(),
        }),
    }
}
