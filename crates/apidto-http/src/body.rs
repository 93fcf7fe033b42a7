//! # Request Body Adapter
//!
//! Adapts an `axum` request to the [`JsonRequest`] collaborator expected by
//! the serialization engine. The body is buffered up to
//! [`DEFAULT_BODY_LIMIT`] bytes and parsed as JSON.

use apidto_core::{BodyError, JsonRequest};
use axum::extract::Request;
use serde_json::Value;

/// Largest body, in bytes, that will be buffered (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// An inbound `axum` request whose body carries a JSON DTO.
#[derive(Debug)]
pub struct HttpJsonRequest(pub Request);

impl From<Request> for HttpJsonRequest {
    fn from(request: Request) -> Self {
        Self(request)
    }
}

impl JsonRequest for HttpJsonRequest {
    async fn read_json(self) -> Result<Value, BodyError> {
        let bytes = axum::body::to_bytes(self.0.into_body(), DEFAULT_BODY_LIMIT)
            .await
            .map_err(|e| BodyError::new(format!("cannot read request body: {e}")))?;
        if bytes.is_empty() {
            return Err(BodyError::new("request body is empty"));
        }
        serde_json::from_slice(&bytes).map_err(|e| BodyError::new(e.to_string()))
    }
}
