//! # Field Normalizer
//!
//! Rewrites a schema into its canonical nullable form:
//!
//! 1. Any set type in a field's declaration is rejected with
//!    [`DtoError::UnsupportedType`]. Sets have no canonical JSON form.
//! 2. Every field type not already nullable is wrapped as `nullable<T>`.
//! 3. Every field without a default gets one: an empty sequence for
//!    `sequence<T>`, an empty mapping for `mapping<K, V>`, otherwise `null`.
//!
//! Normalization is a pure function applied once, when a DTO type is built.
//! It is idempotent: normalizing a normalized schema returns an equal schema.

use indexmap::IndexMap;

use crate::error::DtoError;
use crate::schema::{FieldDef, FieldType, Schema};
use crate::value::FieldValue;

/// Knobs for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Give sequence and mapping fields empty-collection defaults instead of `null`.
    pub auto_collections: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            auto_collections: true,
        }
    }
}

/// Reject set-typed fields.
///
/// # Errors
///
/// Returns `DtoError::UnsupportedType` naming the first offending field.
pub fn check_supported(owner: &str, schema: &Schema) -> Result<(), DtoError> {
    match schema.fields().iter().find(|f| f.ty.contains_set()) {
        Some(field) => Err(DtoError::UnsupportedType {
            dto: owner.to_string(),
            field: field.name.clone(),
            ty: field.ty.to_string(),
        }),
        None => Ok(()),
    }
}

/// Normalize `schema`, owned by the DTO type named `owner`.
///
/// # Errors
///
/// Returns `DtoError::UnsupportedType` if any field declares a set.
pub fn normalize(owner: &str, schema: &Schema, options: NormalizeOptions) -> Result<Schema, DtoError> {
    check_supported(owner, schema)?;

    let fields = schema
        .fields()
        .iter()
        .map(|field| FieldDef {
            name: field.name.clone(),
            ty: FieldType::nullable(field.ty.clone()),
            default: Some(
                field
                    .default
                    .clone()
                    .unwrap_or_else(|| default_for(&field.ty, options)),
            ),
        })
        .collect();

    Ok(Schema::new(fields))
}

/// The implicit default for a field of type `ty`.
pub fn default_for(ty: &FieldType, options: NormalizeOptions) -> FieldValue {
    if !options.auto_collections {
        return FieldValue::Null;
    }
    match ty.unwrap_nullable() {
        FieldType::Sequence(_) => FieldValue::Sequence(Vec::new()),
        FieldType::Mapping(..) => FieldValue::Mapping(IndexMap::new()),
        _ => FieldValue::Null,
    }
}
