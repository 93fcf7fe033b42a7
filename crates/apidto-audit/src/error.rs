//! # Error Types
//!
//! Errors raised by the auditor and by configuration loading.

use thiserror::Error;

/// A sensitive field was serialized while the auditor runs in strict mode.
///
/// Carries the owner label (the DTO type name the walk was attributed to)
/// and the offending key, so the failure can be diagnosed without re-running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid field name for serialization: '{owner}.{field}'")]
pub struct SensitiveFieldError {
    /// Type name the field was attributed to.
    pub owner: String,
    /// The offending key, as it appears in the mapping.
    pub field: String,
}

/// Errors while building auditor options from external sources.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `log_mode` was neither `warn` nor `strict`.
    #[error("invalid log mode \"{0}\" (expected \"warn\" or \"strict\")")]
    InvalidLogMode(String),

    /// A boolean environment flag could not be parsed.
    #[error("invalid value for {var}: \"{value}\" (expected true/false)")]
    InvalidFlag {
        /// Environment variable name.
        var: String,
        /// The rejected value.
        value: String,
    },

    /// The options document could not be parsed.
    #[error("cannot parse auditor options: {0}")]
    Parse(String),
}
