//! # DTO Values
//!
//! [`DtoInstance`] is a value conforming to a [`DtoType`]. It owns its field
//! values, including nested instances, so an instance is always a tree.
//!
//! [`FieldValue::to_json`] is the raw expansion into `serde_json` form used
//! by the serialization engine: enum members become their underlying value,
//! nested instances become mappings, and containers expand element-wise.

use std::sync::Arc;

use apidto_audit::AuditNode;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::dto::DtoType;
use crate::error::DtoError;
use crate::schema::EnumValue;

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Text.
    Text(String),
    /// Enum member.
    Enum(EnumValue),
    /// Nested DTO instance.
    Dto(DtoInstance),
    /// Sequence.
    Sequence(Vec<FieldValue>),
    /// Mapping with string keys, in insertion order.
    Mapping(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// Text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// True for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Expand into plain JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::Number((*n).into()),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
            Self::Enum(e) => e.value().clone(),
            Self::Dto(inst) => Value::Object(inst.to_json_map()),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// A short name for the value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Enum(_) => "enum",
            Self::Dto(_) => "dto",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }
}

impl From<&Value> for FieldValue {
    /// Untyped conversion, used for `any` fields.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<EnumValue> for FieldValue {
    fn from(e: EnumValue) -> Self {
        Self::Enum(e)
    }
}

impl From<DtoInstance> for FieldValue {
    fn from(inst: DtoInstance) -> Self {
        Self::Dto(inst)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl AuditNode for FieldValue {
    fn entries(&self) -> Option<Vec<(&str, &Self)>> {
        match self {
            Self::Mapping(map) => Some(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            Self::Dto(inst) => Some(inst.iter().collect()),
            _ => None,
        }
    }

    fn elements(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    fn dto_label(&self) -> Option<&str> {
        match self {
            Self::Dto(inst) => Some(inst.type_name()),
            _ => None,
        }
    }
}

/// An instance of a [`DtoType`].
#[derive(Debug, Clone)]
pub struct DtoInstance {
    ty: Arc<DtoType>,
    values: IndexMap<String, FieldValue>,
}

impl DtoInstance {
    /// A fresh instance with every field at its default.
    ///
    /// Fields declared without a default (only possible with
    /// `optional(false)`) start as `null`.
    pub fn new(ty: &Arc<DtoType>) -> Self {
        let values = ty
            .schema()
            .fields()
            .iter()
            .map(|f| {
                (
                    f.name.clone(),
                    f.default.clone().unwrap_or(FieldValue::Null),
                )
            })
            .collect();
        Self {
            ty: Arc::clone(ty),
            values,
        }
    }

    pub(crate) fn from_parts(ty: Arc<DtoType>, values: IndexMap<String, FieldValue>) -> Self {
        Self { ty, values }
    }

    /// The instance's type.
    pub fn dto_type(&self) -> &Arc<DtoType> {
        &self.ty
    }

    /// The instance's type name.
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Current value of a field.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Assign a field.
    ///
    /// # Errors
    ///
    /// Returns `DtoError::UnknownField` if the type does not declare `field`
    /// and `DtoError::TypeMismatch` if `value` does not fit its declared type.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), DtoError> {
        let Some(def) = self.ty.field(field) else {
            return Err(DtoError::UnknownField {
                dto: self.type_name().to_string(),
                field: field.to_string(),
            });
        };
        let value = value.into();
        if !def.ty.accepts(&value) {
            return Err(DtoError::TypeMismatch {
                path: format!("{}.{field}", self.type_name()),
                expected: def.ty.to_string(),
                found: value.kind().to_string(),
            });
        }
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// Builder form of [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Result<Self, DtoError> {
        self.set(field, value)?;
        Ok(self)
    }

    /// Field names and values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Raw expansion to a JSON mapping, without auditing.
    pub(crate) fn to_json_map(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

impl PartialEq for DtoInstance {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name() && self.values == other.values
    }
}
