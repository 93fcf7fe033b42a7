//! # Enum Coercion
//!
//! Lenient mapping of a raw JSON value onto an enumeration:
//!
//! 1. `null` maps to no member.
//! 2. A value equal to a member's underlying value selects that member.
//! 3. Text matching a member *name*, ignoring case, selects that member.
//! 4. Anything else fails with [`DtoError::EnumCoercion`].
//!
//! Only fields whose declared type is directly an enumeration (possibly
//! nullable) are coerced this way. Enums inside sequences or mappings are
//! matched by exact underlying value during structural construction.

use std::sync::Arc;

use serde_json::Value;

use crate::error::DtoError;
use crate::schema::{EnumType, EnumValue};

/// Coerce `value` to a member of `target`.
///
/// # Errors
///
/// Returns `DtoError::EnumCoercion` if `value` matches no member by value or
/// by case-insensitive name.
pub fn coerce_enum(value: &Value, target: &Arc<EnumType>) -> Result<Option<EnumValue>, DtoError> {
    if value.is_null() {
        return Ok(None);
    }
    if let Some(member) = target.from_value(value) {
        return Ok(Some(member));
    }
    if let Some(member) = value.as_str().and_then(|s| target.from_name_ignore_case(s)) {
        return Ok(Some(member));
    }
    Err(DtoError::EnumCoercion {
        value: value.to_string(),
        enum_name: target.name().to_string(),
    })
}
