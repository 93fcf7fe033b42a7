//! # Error Hierarchy
//!
//! Structured errors for schema construction, deserialization, and
//! serialization, built with `thiserror`. Every variant carries the context
//! needed to diagnose the failure without re-running: the DTO and field
//! involved, the path inside the input, and the offending value.

use apidto_audit::SensitiveFieldError;
use thiserror::Error;

/// Top-level error type for DTO operations.
#[derive(Error, Debug)]
pub enum DtoError {
    /// The schema declares an unordered-set field. Raised when the type is built.
    #[error("field '{field}' of '{dto}' uses set ({ty}), which has no canonical JSON form and is not supported")]
    UnsupportedType {
        /// DTO type name.
        dto: String,
        /// Offending field.
        field: String,
        /// The declared type, rendered.
        ty: String,
    },

    /// The same field name was declared twice.
    #[error("field '{field}' is declared more than once on '{dto}'")]
    DuplicateField {
        /// DTO type name.
        dto: String,
        /// Repeated field name.
        field: String,
    },

    /// A value was assigned to a field the type does not declare.
    #[error("'{dto}' has no field named '{field}'")]
    UnknownField {
        /// DTO type name.
        dto: String,
        /// The unknown field.
        field: String,
    },

    /// Input lacked a field that has no default.
    #[error("missing value for field '{path}'")]
    MissingField {
        /// Dotted path of the missing field.
        path: String,
    },

    /// A value could not be mapped onto its declared type.
    #[error("wrong type for '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Dotted/indexed path of the value.
        path: String,
        /// The declared type, rendered.
        expected: String,
        /// The JSON kind actually received.
        found: String,
    },

    /// A value matched no enum member by value or by name.
    #[error("cannot map value {value} to enum {enum_name}")]
    EnumCoercion {
        /// The rejected value, as JSON.
        value: String,
        /// Target enum type name.
        enum_name: String,
    },

    /// Input text or request body was not valid JSON.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The request object was absent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The serialized mapping could not be encoded as text.
    #[error("encode error: {0}")]
    Encode(String),

    /// Strict-mode audit rejected a sensitive field.
    #[error("sensitive field error: {0}")]
    SensitiveField(#[from] SensitiveFieldError),
}

/// A request provider could not produce a parsed JSON body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BodyError(pub String);

impl BodyError {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
