//! # DTO Types
//!
//! A [`DtoType`] is a named, validated schema. Types are assembled with
//! [`DtoType::builder`]; building checks for duplicate fields and set types
//! and, unless `optional(false)` is requested, normalizes the schema once.
//! The result is shared as `Arc<DtoType>` and never modified afterwards, so
//! there is no need to detect repeated processing.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::DtoError;
use crate::normalize::{check_supported, normalize, NormalizeOptions};
use crate::schema::{FieldDef, FieldType, Schema};
use crate::value::FieldValue;

/// Per-type build options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtoOptions {
    /// Normalize fields to nullable with defaults.
    pub optional: bool,
    /// Use empty collections as implicit defaults for sequence/mapping fields.
    pub auto_collections: bool,
}

impl Default for DtoOptions {
    fn default() -> Self {
        Self {
            optional: true,
            auto_collections: true,
        }
    }
}

/// A named DTO schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DtoType {
    name: String,
    schema: Schema,
    options: DtoOptions,
}

impl DtoType {
    /// Start declaring a DTO type.
    pub fn builder(name: impl Into<String>) -> DtoTypeBuilder {
        DtoTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
            options: DtoOptions::default(),
        }
    }

    /// Type name; used as the audit owner label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The (normalized, unless built with `optional(false)`) schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Look up a field.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.schema.get(name)
    }

    /// Options the type was built with.
    pub fn options(&self) -> DtoOptions {
        self.options
    }
}

/// Builder returned by [`DtoType::builder`].
#[derive(Debug, Clone)]
pub struct DtoTypeBuilder {
    name: String,
    fields: Vec<FieldDef>,
    options: DtoOptions,
}

impl DtoTypeBuilder {
    /// Declare a field without an explicit default.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    /// Declare a field with an explicit default.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        default: impl Into<FieldValue>,
    ) -> Self {
        self.fields
            .push(FieldDef::with_default(name, ty, default.into()));
        self
    }

    /// Whether to normalize fields to nullable with defaults (default true).
    pub fn optional(mut self, optional: bool) -> Self {
        self.options.optional = optional;
        self
    }

    /// Whether collections default to empty rather than `null` (default true).
    pub fn auto_collections(mut self, auto_collections: bool) -> Self {
        self.options.auto_collections = auto_collections;
        self
    }

    /// Validate and freeze the type.
    ///
    /// # Errors
    ///
    /// Returns `DtoError::DuplicateField` if a name is declared twice,
    /// `DtoError::UnsupportedType` if any field declares a set, and
    /// `DtoError::TypeMismatch` if an explicit default does not fit its field.
    pub fn build(self) -> Result<Arc<DtoType>, DtoError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(DtoError::DuplicateField {
                    dto: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let declared = Schema::new(self.fields);
        let schema = if self.options.optional {
            let options = NormalizeOptions {
                auto_collections: self.options.auto_collections,
            };
            normalize(&self.name, &declared, options)?
        } else {
            check_supported(&self.name, &declared)?;
            declared
        };

        for field in schema.fields() {
            if let Some(default) = &field.default {
                if !field.ty.accepts(default) {
                    return Err(DtoError::TypeMismatch {
                        path: format!("{}.{}", self.name, field.name),
                        expected: field.ty.to_string(),
                        found: default.kind().to_string(),
                    });
                }
            }
        }

        Ok(Arc::new(DtoType {
            name: self.name,
            schema,
            options: self.options,
        }))
    }
}
