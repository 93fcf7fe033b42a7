//! # Structural Construction
//!
//! Materializes a [`DtoInstance`] from a JSON mapping, driven by the DTO's
//! declared schema. For each declared field, in order:
//!
//! - a present key whose field type is directly an enumeration goes through
//!   [`coerce_enum`];
//! - any other present key is mapped structurally onto its declared type;
//! - an absent key takes the field default, or fails with
//!   [`DtoError::MissingField`] when the field has none.
//!
//! Keys the schema does not declare are ignored.
//!
//! Structural failures report a path rooted at the DTO type name, e.g.
//! `Order.items[2].sku`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::coerce::coerce_enum;
use crate::dto::DtoType;
use crate::error::DtoError;
use crate::schema::{FieldType, ScalarKind};
use crate::value::{DtoInstance, FieldValue};

/// Build an instance of `ty` from `data`.
///
/// # Errors
///
/// Returns `DtoError::TypeMismatch`, `DtoError::EnumCoercion`, or
/// `DtoError::MissingField` when `data` does not fit the schema.
pub fn materialize(ty: &Arc<DtoType>, data: &Map<String, Value>) -> Result<DtoInstance, DtoError> {
    materialize_at(ty, data, ty.name())
}

fn materialize_at(
    ty: &Arc<DtoType>,
    data: &Map<String, Value>,
    prefix: &str,
) -> Result<DtoInstance, DtoError> {
    let mut values = IndexMap::with_capacity(ty.schema().len());
    for field in ty.schema().fields() {
        let path = format!("{prefix}.{}", field.name);
        let value = match data.get(&field.name) {
            Some(raw) => match field.ty.direct_enum() {
                // `null` is only a valid enum input when the field is nullable.
                Some(target) if !raw.is_null() || field.ty.is_nullable() => {
                    coerce_enum(raw, target)?.map_or(FieldValue::Null, FieldValue::Enum)
                }
                _ => build_value(&field.ty, raw, &path)?,
            },
            None => match &field.default {
                Some(default) => default.clone(),
                None => return Err(DtoError::MissingField { path }),
            },
        };
        values.insert(field.name.clone(), value);
    }
    Ok(DtoInstance::from_parts(Arc::clone(ty), values))
}

fn build_value(ty: &FieldType, raw: &Value, path: &str) -> Result<FieldValue, DtoError> {
    let mismatch = || DtoError::TypeMismatch {
        path: path.to_string(),
        expected: ty.to_string(),
        found: json_kind(raw).to_string(),
    };

    match ty {
        FieldType::Nullable(inner) => match raw {
            Value::Null => Ok(FieldValue::Null),
            _ => build_value(inner, raw, path).map_err(|err| match err {
                // Report the declared type, which also admits `null`.
                DtoError::TypeMismatch { path: at, found, .. } if at == path => {
                    DtoError::TypeMismatch {
                        path: at,
                        expected: ty.to_string(),
                        found,
                    }
                }
                other => other,
            }),
        },
        FieldType::Scalar(kind) => match (kind, raw) {
            (ScalarKind::Any, _) => Ok(FieldValue::from(raw)),
            (ScalarKind::Bool, Value::Bool(b)) => Ok(FieldValue::Bool(*b)),
            (ScalarKind::Text, Value::String(s)) => Ok(FieldValue::Text(s.clone())),
            (ScalarKind::Int, Value::Number(n)) => n.as_i64().map(FieldValue::Int).ok_or_else(mismatch),
            (ScalarKind::Float, Value::Number(n)) => {
                n.as_f64().map(FieldValue::Float).ok_or_else(mismatch)
            }
            _ => Err(mismatch()),
        },
        FieldType::Enum(target) => target
            .from_value(raw)
            .map(FieldValue::Enum)
            .ok_or_else(mismatch),
        FieldType::Dto(nested) => match raw {
            Value::Object(map) => materialize_at(nested, map, path).map(FieldValue::Dto),
            _ => Err(mismatch()),
        },
        FieldType::Sequence(item) => match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| build_value(item, v, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::Sequence),
            _ => Err(mismatch()),
        },
        FieldType::Mapping(key_ty, value_ty) => match raw {
            Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, v) in map {
                    let entry_path = format!("{path}.{key}");
                    check_key(key_ty, key, &entry_path)?;
                    out.insert(key.clone(), build_value(value_ty, v, &entry_path)?);
                }
                Ok(FieldValue::Mapping(out))
            }
            _ => Err(mismatch()),
        },
        // Rejected when the type is built; unreachable for a built type.
        FieldType::Set(_) => Err(mismatch()),
    }
}

fn check_key(key_ty: &FieldType, key: &str, path: &str) -> Result<(), DtoError> {
    if key_ty.accepts_key(key) {
        Ok(())
    } else {
        Err(DtoError::TypeMismatch {
            path: path.to_string(),
            expected: format!("key of type {key_ty}"),
            found: format!("key '{key}'"),
        })
    }
}

/// Short name for a JSON value's kind.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
