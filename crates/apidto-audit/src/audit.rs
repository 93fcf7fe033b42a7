//! # Recursive Sensitive-Field Audit
//!
//! Walks a mapping and flags every key that matches the configured rule.
//!
//! ## Walk Rules
//!
//! For each `(key, value)` pair of a mapping:
//!
//! 1. The key is checked against the rule. In warn mode a hit is logged and
//!    recorded; in strict mode it is logged and returned as an error.
//! 2. If the value is itself a mapping, it is walked with the same owner label.
//! 3. If the value is a sequence, each element that is a DTO instance is
//!    walked under its own type name; each element that is a plain mapping is
//!    walked under the current label; everything else is skipped.
//!
//! The walk is generic over [`AuditNode`] so the same rules apply to raw
//! `serde_json` trees and to typed DTO value trees.

use std::fmt;

use serde_json::{Map, Value};

use crate::config::{LogMode, SensitiveFields};
use crate::error::SensitiveFieldError;

/// A node in a tree the auditor can walk.
pub trait AuditNode: Sized {
    /// The key/value pairs of this node when it is a mapping, in order.
    fn entries(&self) -> Option<Vec<(&str, &Self)>>;

    /// The elements of this node when it is a sequence.
    fn elements(&self) -> Option<&[Self]>;

    /// The node's own type name when it is a DTO instance.
    ///
    /// Used as the owner label when the node is found inside a sequence.
    fn dto_label(&self) -> Option<&str> {
        None
    }
}

impl AuditNode for Value {
    fn entries(&self) -> Option<Vec<(&str, &Self)>> {
        self.as_object()
            .map(|map| map.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }

    fn elements(&self) -> Option<&[Self]> {
        self.as_array().map(Vec::as_slice)
    }
}

/// One flagged field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveFieldHit {
    /// Type name the field was attributed to.
    pub owner: String,
    /// The flagged key.
    pub field: String,
}

impl SensitiveFieldHit {
    /// `owner.field`, the form used in logs and errors.
    pub fn path(&self) -> String {
        format!("{}.{}", self.owner, self.field)
    }
}

impl fmt::Display for SensitiveFieldHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.field)
    }
}

/// Hits recorded by a warn-mode audit, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    hits: Vec<SensitiveFieldHit>,
}

impl AuditReport {
    /// Number of hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// True if nothing was flagged.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// All hits.
    pub fn hits(&self) -> &[SensitiveFieldHit] {
        &self.hits
    }

    /// True if `owner.field` was flagged.
    pub fn contains(&self, path: &str) -> bool {
        self.hits.iter().any(|h| h.path() == path)
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hit) in self.hits.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {hit}")?;
        }
        Ok(())
    }
}

impl SensitiveFields {
    /// Audit the entries of a mapping attributed to `owner`.
    ///
    /// Returns an empty report when auditing is disabled.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `SensitiveFieldError` for the first hit.
    pub fn audit<'a, N, I>(&self, owner: &str, entries: I) -> Result<AuditReport, SensitiveFieldError>
    where
        N: AuditNode + 'a,
        I: IntoIterator<Item = (&'a str, &'a N)>,
    {
        let mut report = AuditReport::default();
        if self.enabled() {
            walk(self, owner, entries, &mut report)?;
        }
        Ok(report)
    }

    /// Audit a plain JSON mapping.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `SensitiveFieldError` for the first hit.
    pub fn audit_mapping(
        &self,
        owner: &str,
        mapping: &Map<String, Value>,
    ) -> Result<AuditReport, SensitiveFieldError> {
        self.audit(owner, mapping.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

fn walk<'a, N, I>(
    config: &SensitiveFields,
    owner: &str,
    entries: I,
    report: &mut AuditReport,
) -> Result<(), SensitiveFieldError>
where
    N: AuditNode + 'a,
    I: IntoIterator<Item = (&'a str, &'a N)>,
{
    for (key, value) in entries {
        if config.matches(key) {
            flag(config.log_mode(), owner, key, report)?;
        }

        if let Some(children) = value.entries() {
            walk(config, owner, children, report)?;
        } else if let Some(items) = value.elements() {
            for item in items {
                let Some(children) = item.entries() else {
                    continue;
                };
                let label = item.dto_label().unwrap_or(owner);
                walk(config, label, children, report)?;
            }
        }
    }
    Ok(())
}

fn flag(
    mode: LogMode,
    owner: &str,
    key: &str,
    report: &mut AuditReport,
) -> Result<(), SensitiveFieldError> {
    match mode {
        LogMode::Warn => {
            tracing::warn!(owner = %owner, field = %key, "serializing sensitive field '{}.{}'", owner, key);
            report.hits.push(SensitiveFieldHit {
                owner: owner.to_string(),
                field: key.to_string(),
            });
            Ok(())
        }
        LogMode::Strict => {
            tracing::error!(owner = %owner, field = %key, "serializing sensitive field '{}.{}'", owner, key);
            Err(SensitiveFieldError {
                owner: owner.to_string(),
                field: key.to_string(),
            })
        }
    }
}
