//! # DTO Extractor
//!
//! [`DtoPayload`] extracts a [`DtoInstance`] from the request body using the
//! [`DtoClass`] found in router state. [`dto_response`] renders an instance
//! as an audited JSON response.

use apidto_core::{DtoClass, DtoInstance};
use axum::extract::{FromRef, FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::body::HttpJsonRequest;
use crate::error::ApiError;

/// A DTO instance read from the request body.
///
/// Must be the last extractor of a handler, since it consumes the body.
#[derive(Debug)]
pub struct DtoPayload(pub DtoInstance);

impl<S> FromRequest<S> for DtoPayload
where
    DtoClass: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let class = DtoClass::from_ref(state);
        let instance = class
            .from_http_request(Some(HttpJsonRequest::from(req)))
            .await?;
        Ok(Self(instance))
    }
}

/// Serialize `instance` through `class` and wrap it in a JSON response.
///
/// # Errors
///
/// Returns `ApiError::Internal` when strict-mode auditing rejects a field.
pub fn dto_response(
    class: &DtoClass,
    instance: &DtoInstance,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let map = class.to_dict(instance)?;
    Ok((status, Json(Value::Object(map))).into_response())
}
