//! # Request Provider
//!
//! The inbound-request collaborator is anything that can asynchronously
//! yield its body as parsed JSON. The engine consumes the request, so a
//! provider reads its body at most once.
//!
//! Buffered bodies (`String`, `Vec<u8>`) implement the trait directly; the
//! `apidto-http` crate adapts `axum` requests.

use std::future::Future;

use serde_json::Value;

use crate::error::BodyError;

/// Source of a JSON request body.
pub trait JsonRequest: Send {
    /// Read and parse the body.
    fn read_json(self) -> impl Future<Output = Result<Value, BodyError>> + Send;
}

impl JsonRequest for String {
    async fn read_json(self) -> Result<Value, BodyError> {
        serde_json::from_str(&self).map_err(|e| BodyError::new(e.to_string()))
    }
}

impl JsonRequest for Vec<u8> {
    async fn read_json(self) -> Result<Value, BodyError> {
        if self.is_empty() {
            return Err(BodyError::new("request body is empty"));
        }
        serde_json::from_slice(&self).map_err(|e| BodyError::new(e.to_string()))
    }
}
