//! # Serialization Engine
//!
//! Converts DTO instances to plain mappings and JSON text and back.
//!
//! ## Serialization
//!
//! `to_dict` expands the instance into a fresh `serde_json` mapping (nested
//! DTOs become mappings, enum members their underlying value), then runs the
//! sensitive-field audit over the instance tree with the instance's type
//! name as the owner label. In strict mode an audit hit aborts the call and
//! no mapping is returned.
//!
//! ## Deserialization
//!
//! `from_dict` materializes an instance from a mapping, applying enum
//! coercion to directly enum-typed fields. `from_json` and
//! `from_http_request` decode text or a request body first.
//!
//! The engine holds its auditor configuration behind an `Arc`; engines are
//! cheap to clone and share across threads.

use std::sync::Arc;

use apidto_audit::{AuditReport, SensitiveFields};
use serde_json::{Map, Value};

use crate::codec;
use crate::construct::materialize;
use crate::dto::DtoType;
use crate::error::DtoError;
use crate::request::JsonRequest;
use crate::value::DtoInstance;

/// Audited serializer/deserializer for DTO instances.
#[derive(Debug, Clone)]
pub struct DtoEngine {
    config: Arc<SensitiveFields>,
}

impl Default for DtoEngine {
    fn default() -> Self {
        Self::new(Arc::new(SensitiveFields::default()))
    }
}

impl DtoEngine {
    /// Create an engine using the given auditor configuration.
    pub fn new(config: Arc<SensitiveFields>) -> Self {
        Self { config }
    }

    /// The auditor configuration in use.
    pub fn config(&self) -> &Arc<SensitiveFields> {
        &self.config
    }

    /// Serialize to a mapping.
    ///
    /// # Errors
    ///
    /// Returns `DtoError::SensitiveField` when strict-mode auditing flags a field.
    pub fn to_dict(&self, instance: &DtoInstance) -> Result<Map<String, Value>, DtoError> {
        self.to_dict_audited(instance).map(|(map, _)| map)
    }

    /// Serialize to a mapping, also returning the warn-mode audit report.
    ///
    /// # Errors
    ///
    /// Returns `DtoError::SensitiveField` when strict-mode auditing flags a field.
    pub fn to_dict_audited(
        &self,
        instance: &DtoInstance,
    ) -> Result<(Map<String, Value>, AuditReport), DtoError> {
        let map = instance.to_json_map();
        let report = self.config.audit(instance.type_name(), instance.iter())?;
        Ok((map, report))
    }

    /// Serialize to JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DtoError::SensitiveField` in strict mode, or
    /// `DtoError::Encode` if the text cannot be produced.
    pub fn to_json(&self, instance: &DtoInstance) -> Result<String, DtoError> {
        codec::encode(&self.to_dict(instance)?)
    }

    /// Build an instance of `ty` from a mapping.
    ///
    /// # Errors
    ///
    /// Returns `DtoError::TypeMismatch`, `DtoError::EnumCoercion`, or
    /// `DtoError::MissingField` when `data` does not fit the schema.
    pub fn from_dict(
        &self,
        ty: &Arc<DtoType>,
        data: &Map<String, Value>,
    ) -> Result<DtoInstance, DtoError> {
        tracing::debug!(dto = %ty.name(), keys = data.len(), "materializing dto");
        materialize(ty, data)
    }

    /// Build an instance of `ty` from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DtoError::MalformedInput` for invalid JSON, plus every error
    /// [`from_dict`](Self::from_dict) can return.
    pub fn from_json(&self, ty: &Arc<DtoType>, text: &str) -> Result<DtoInstance, DtoError> {
        let data = codec::decode(text)?;
        self.from_dict(ty, &data)
    }

    /// Build an instance of `ty` from a request body.
    ///
    /// # Errors
    ///
    /// Returns `DtoError::InvalidRequest` when `request` is `None`,
    /// `DtoError::MalformedInput` when the body is not valid JSON, plus every
    /// error [`from_dict`](Self::from_dict) can return.
    pub async fn from_http_request<R: JsonRequest>(
        &self,
        ty: &Arc<DtoType>,
        request: Option<R>,
    ) -> Result<DtoInstance, DtoError> {
        let Some(request) = request else {
            return Err(DtoError::InvalidRequest(format!(
                "no request supplied for '{}'",
                ty.name()
            )));
        };
        let body = request.read_json().await.map_err(|e| {
            tracing::debug!(dto = %ty.name(), error = %e, "request body is not valid JSON");
            DtoError::MalformedInput(e.to_string())
        })?;
        let data = codec::expect_object(body)?;
        self.from_dict(ty, &data)
    }
}
