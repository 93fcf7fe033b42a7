#![deny(missing_docs)]

//! # apidto-core — Data Transfer Objects
//!
//! Declares DTO types, normalizes their fields, and moves instances between
//! typed form, plain `serde_json` mappings, and JSON text.
//!
//! ## Pipeline
//!
//! ```text
//! DtoType::builder ──build──▶ normalize ──▶ Arc<DtoType>
//!
//! DtoInstance ──to_dict──▶ Map ──audit──▶ Map / JSON text
//! Map / JSON text / request ──from_dict──▶ coerce + materialize ──▶ DtoInstance
//! ```
//!
//! Field normalization happens exactly once, when a type is built: every
//! field becomes nullable, and fields without defaults get an empty
//! collection (sequences, mappings) or `null`. Set-typed fields are rejected
//! at that point.
//!
//! Serialization audits the produced tree for sensitive field names using the
//! [`apidto_audit::SensitiveFields`] configuration held by the [`DtoEngine`].
//!
//! ## Crate Policy
//!
//! - No global state; the auditor configuration is injected.
//! - No `.unwrap()` outside tests.
//! - Every error carries the DTO, field path, or value involved.

pub mod class;
pub mod codec;
pub mod coerce;
pub mod construct;
pub mod dto;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod request;
pub mod schema;
pub mod value;

pub use class::DtoClass;
pub use coerce::coerce_enum;
pub use construct::materialize;
pub use dto::{DtoOptions, DtoType, DtoTypeBuilder};
pub use engine::DtoEngine;
pub use error::{BodyError, DtoError};
pub use normalize::{normalize, NormalizeOptions};
pub use request::JsonRequest;
pub use schema::{EnumMember, EnumType, EnumValue, FieldDef, FieldType, ScalarKind, Schema};
pub use value::{DtoInstance, FieldValue};
