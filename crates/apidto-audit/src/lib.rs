#![deny(missing_docs)]

//! # apidto-audit — Sensitive-Field Auditing
//!
//! The leaf crate of the workspace. It owns the auditor configuration and the
//! recursive walk that flags sensitive field names while a DTO is being
//! serialized. It depends on no other `apidto-*` crate.
//!
//! ## Matching Rule
//!
//! A field name is sensitive when its lower-cased form is one of the
//! configured names, or ends with one of the configured suffixes. Names and
//! suffixes are stored lower-cased, so both rules are case-insensitive.
//!
//! ## Modes
//!
//! - **warn** — every hit is logged with `tracing::warn!` and recorded in the
//!   returned [`AuditReport`]; serialization proceeds.
//! - **strict** — the first hit is logged with `tracing::error!` and returned
//!   as a [`SensitiveFieldError`], aborting serialization.
//!
//! ## Crate Policy
//!
//! - No global state. A [`SensitiveFields`] value is built explicitly and
//!   shared (usually behind an `Arc`) by whoever serializes.
//! - No `.unwrap()` outside tests.

pub mod audit;
pub mod config;
pub mod error;

pub use audit::{AuditNode, AuditReport, SensitiveFieldHit};
pub use config::{
    is_sensitive_field, LogMode, SensitiveFields, SensitiveFieldsOptions,
    DEFAULT_SENSITIVE_NAMES, DEFAULT_SENSITIVE_SUFFIXES,
};
pub use error::{ConfigError, SensitiveFieldError};
