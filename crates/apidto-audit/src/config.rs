//! # Auditor Configuration
//!
//! [`SensitiveFields`] holds the enable flag, the log mode, and the two
//! sets of sensitive names and suffixes. It is an ordinary value: build it
//! once at startup, wrap it in an `Arc`, and hand it to every serializer that
//! should honour it. Tests build their own instances instead of mutating a
//! shared one.
//!
//! [`SensitiveFieldsOptions`] is the single initialization surface. It can be
//! assembled in code, parsed from YAML/JSON, or read from the environment.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Field names flagged by default.
pub const DEFAULT_SENSITIVE_NAMES: &[&str] = &["api_key", "session_id", "password", "token"];

/// Name suffixes flagged by default.
pub const DEFAULT_SENSITIVE_SUFFIXES: &[&str] = &["_id", "_key"];

const ENV_ENABLED: &str = "APIDTO_AUDIT_ENABLED";
const ENV_LOG_MODE: &str = "APIDTO_AUDIT_LOG_MODE";
const ENV_NAMES: &str = "APIDTO_SENSITIVE_NAMES";
const ENV_SUFFIXES: &str = "APIDTO_SENSITIVE_SUFFIXES";
const ENV_REPLACE: &str = "APIDTO_AUDIT_REPLACE";

/// What the auditor does when it finds a sensitive field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Log a warning and keep serializing.
    #[default]
    Warn,
    /// Log an error and abort serialization.
    Strict,
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => f.write_str("warn"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for LogMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "strict" => Ok(Self::Strict),
            _ => Err(ConfigError::InvalidLogMode(s.to_string())),
        }
    }
}

/// Initialization options for [`SensitiveFields`].
///
/// `sensitive_names` and `sensitive_suffixes` accept either a single string
/// or a list when deserialized. An empty list leaves the corresponding set
/// untouched; a non-empty one is merged in, or replaces the set when
/// `replace` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensitiveFieldsOptions {
    /// Whether auditing runs at all.
    pub enabled: bool,
    /// Exact field names to flag.
    #[serde(deserialize_with = "one_or_many")]
    pub sensitive_names: Vec<String>,
    /// Name suffixes to flag.
    #[serde(deserialize_with = "one_or_many")]
    pub sensitive_suffixes: Vec<String>,
    /// Replace the current sets instead of merging into them.
    pub replace: bool,
    /// Warn or strict.
    pub log_mode: LogMode,
}

impl Default for SensitiveFieldsOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitive_names: Vec::new(),
            sensitive_suffixes: Vec::new(),
            replace: false,
            log_mode: LogMode::Warn,
        }
    }
}

impl SensitiveFieldsOptions {
    /// Options equivalent to the defaults: enabled, warn mode, no changes to the sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enable flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the exact names to merge or replace.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the suffixes to merge or replace.
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the sets rather than merging.
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Set the log mode.
    pub fn with_log_mode(mut self, log_mode: LogMode) -> Self {
        self.log_mode = log_mode;
        self
    }

    /// Parse options from a YAML (or JSON) document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed documents, unknown keys,
    /// or an unrecognized `log_mode`.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read options from the process environment.
    ///
    /// Recognized variables: `APIDTO_AUDIT_ENABLED`, `APIDTO_AUDIT_LOG_MODE`,
    /// `APIDTO_SENSITIVE_NAMES` and `APIDTO_SENSITIVE_SUFFIXES` (comma
    /// separated), `APIDTO_AUDIT_REPLACE`. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a flag or the log mode cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        if let Some(value) = lookup(ENV_ENABLED) {
            options.enabled = parse_flag(ENV_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_MODE) {
            options.log_mode = value.parse()?;
        }
        if let Some(value) = lookup(ENV_NAMES) {
            options.sensitive_names = parse_list(&value);
        }
        if let Some(value) = lookup(ENV_SUFFIXES) {
            options.sensitive_suffixes = parse_list(&value);
        }
        if let Some(value) = lookup(ENV_REPLACE) {
            options.replace = parse_flag(ENV_REPLACE, &value)?;
        }
        Ok(options)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The auditor configuration.
///
/// # Invariants
///
/// - Every stored name and suffix is lower-case and non-empty.
/// - The only mutation after construction is [`initialize`](Self::initialize).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveFields {
    enabled: bool,
    log_mode: LogMode,
    names: BTreeSet<String>,
    suffixes: BTreeSet<String>,
}

impl Default for SensitiveFields {
    fn default() -> Self {
        Self {
            enabled: true,
            log_mode: LogMode::Warn,
            names: DEFAULT_SENSITIVE_NAMES.iter().map(|s| s.to_string()).collect(),
            suffixes: DEFAULT_SENSITIVE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SensitiveFields {
    /// Default configuration: enabled, warn mode, default names and suffixes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that never flags anything.
    pub fn disabled() -> Self {
        Self::with_options(SensitiveFieldsOptions::new().with_enabled(false))
    }

    /// Default configuration with `options` applied on top.
    pub fn with_options(options: SensitiveFieldsOptions) -> Self {
        let mut fields = Self::default();
        fields.initialize(options);
        fields
    }

    /// Re-initialize from `options`.
    ///
    /// `enabled` and `log_mode` are always taken from `options`. Each
    /// non-empty list is merged into its set, or replaces it when
    /// `options.replace` is set. Entries are lower-cased on the way in.
    pub fn initialize(&mut self, options: SensitiveFieldsOptions) {
        self.enabled = options.enabled;
        self.log_mode = options.log_mode;
        apply_list(&mut self.names, options.sensitive_names, options.replace);
        apply_list(&mut self.suffixes, options.sensitive_suffixes, options.replace);
    }

    /// Whether auditing is active.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Current log mode.
    pub fn log_mode(&self) -> LogMode {
        self.log_mode
    }

    /// Configured exact names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Configured suffixes, sorted.
    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }

    /// Apply the name/suffix rule, ignoring the enable flag.
    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.names.contains(&lower) || self.suffixes.iter().any(|s| lower.ends_with(s.as_str()))
    }

    /// True iff auditing is enabled and `name` matches the rule.
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.enabled && self.matches(name)
    }
}

fn apply_list(set: &mut BTreeSet<String>, incoming: Vec<String>, replace: bool) {
    let incoming: Vec<String> = incoming
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if incoming.is_empty() {
        return;
    }
    if replace {
        *set = incoming.into_iter().collect();
    } else {
        set.extend(incoming);
    }
}

/// Standalone predicate: is `name` sensitive under `config`?
pub fn is_sensitive_field(config: &SensitiveFields, name: &str) -> bool {
    config.is_sensitive(name)
}
