#![deny(missing_docs)]

//! # apidto-http — Axum Integration
//!
//! Connects DTO classes to `axum` handlers:
//!
//! - [`HttpJsonRequest`] adapts an `axum` request to the engine's
//!   request-provider trait.
//! - [`DtoPayload`] is a `FromRequest` extractor that materializes a
//!   [`apidto_core::DtoInstance`] using the [`apidto_core::DtoClass`] held in
//!   router state.
//! - [`dto_response`] renders an instance as an audited JSON response.
//! - [`ApiError`] maps [`apidto_core::DtoError`] to status codes: decode
//!   failures are 400, schema mismatches 422, and everything else 500 with
//!   a generic message.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/accounts", post(create))
//!     .with_state(account_class);
//!
//! async fn create(
//!     State(class): State<DtoClass>,
//!     DtoPayload(account): DtoPayload,
//! ) -> Result<Response, ApiError> {
//!     dto_response(&class, &account, StatusCode::CREATED)
//! }
//! ```

pub mod body;
pub mod error;
pub mod extract;

pub use body::{HttpJsonRequest, DEFAULT_BODY_LIMIT};
pub use error::{ApiError, ErrorBody, ErrorDetail};
pub use extract::{dto_response, DtoPayload};
