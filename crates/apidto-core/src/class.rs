//! # DTO Class
//!
//! [`DtoClass`] pairs a built [`DtoType`] with the engine that serializes it,
//! giving the familiar per-type surface: `new_instance`, `to_dict`,
//! `to_json`, `from_dict`, `from_json`, and `from_http_request`.

use std::sync::Arc;

use apidto_audit::SensitiveFields;
use serde_json::{Map, Value};

use crate::dto::DtoType;
use crate::engine::DtoEngine;
use crate::error::DtoError;
use crate::request::JsonRequest;
use crate::value::DtoInstance;

/// A DTO type bound to a serialization engine.
#[derive(Debug, Clone)]
pub struct DtoClass {
    ty: Arc<DtoType>,
    engine: DtoEngine,
}

impl DtoClass {
    /// Bind `ty` to `engine`.
    pub fn new(ty: Arc<DtoType>, engine: DtoEngine) -> Self {
        Self { ty, engine }
    }

    /// Bind `ty` to an engine using `config`.
    pub fn with_config(ty: Arc<DtoType>, config: Arc<SensitiveFields>) -> Self {
        Self::new(ty, DtoEngine::new(config))
    }

    /// The bound type.
    pub fn dto_type(&self) -> &Arc<DtoType> {
        &self.ty
    }

    /// The bound engine.
    pub fn engine(&self) -> &DtoEngine {
        &self.engine
    }

    /// A fresh instance with every field at its default.
    pub fn new_instance(&self) -> DtoInstance {
        DtoInstance::new(&self.ty)
    }

    /// See [`DtoEngine::to_dict`].
    ///
    /// # Errors
    ///
    /// Returns `DtoError::TypeMismatch` for an instance of another type and
    /// `DtoError::SensitiveField` when strict-mode auditing flags a field.
    pub fn to_dict(&self, instance: &DtoInstance) -> Result<Map<String, Value>, DtoError> {
        self.check_instance(instance)?;
        self.engine.to_dict(instance)
    }

    /// See [`DtoEngine::to_json`].
    ///
    /// # Errors
    ///
    /// Returns `DtoError::TypeMismatch` for an instance of another type,
    /// `DtoError::SensitiveField` in strict mode, or `DtoError::Encode`.
    pub fn to_json(&self, instance: &DtoInstance) -> Result<String, DtoError> {
        self.check_instance(instance)?;
        self.engine.to_json(instance)
    }

    /// See [`DtoEngine::from_dict`].
    ///
    /// # Errors
    ///
    /// Returns a structural or enum coercion error when `data` does not fit.
    pub fn from_dict(&self, data: &Map<String, Value>) -> Result<DtoInstance, DtoError> {
        self.engine.from_dict(&self.ty, data)
    }

    /// See [`DtoEngine::from_json`].
    ///
    /// # Errors
    ///
    /// Returns `DtoError::MalformedInput` for invalid JSON, or a structural error.
    pub fn from_json(&self, text: &str) -> Result<DtoInstance, DtoError> {
        self.engine.from_json(&self.ty, text)
    }

    /// See [`DtoEngine::from_http_request`].
    ///
    /// # Errors
    ///
    /// Returns `DtoError::InvalidRequest` for a missing request,
    /// `DtoError::MalformedInput` for a bad body, or a structural error.
    pub async fn from_http_request<R: JsonRequest>(
        &self,
        request: Option<R>,
    ) -> Result<DtoInstance, DtoError> {
        self.engine.from_http_request(&self.ty, request).await
    }

    fn check_instance(&self, instance: &DtoInstance) -> Result<(), DtoError> {
        if Arc::ptr_eq(instance.dto_type(), &self.ty) || instance.type_name() == self.ty.name() {
            return Ok(());
        }
        Err(DtoError::TypeMismatch {
            path: "$".to_string(),
            expected: self.ty.name().to_string(),
            found: instance.type_name().to_string(),
        })
    }
}
