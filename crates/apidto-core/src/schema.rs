//! # Schema Model
//!
//! Declared field types for DTOs. A [`Schema`] is an ordered list of
//! [`FieldDef`]s; each field has a [`FieldType`] and an optional default.
//!
//! Field types form a small closed algebra: scalars, enumerations, nested
//! DTOs, sequences, mappings, unordered sets (declarable, but rejected when a
//! type is built), and the nullable wrapper.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::dto::DtoType;
use crate::value::FieldValue;

/// Scalar field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// JSON boolean.
    Bool,
    /// Integral JSON number (fits `i64`).
    Int,
    /// Any JSON number.
    Float,
    /// JSON string.
    Text,
    /// Any JSON value, kept as-is.
    Any,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Any => "any",
        };
        f.write_str(s)
    }
}

/// The declared type of a DTO field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A scalar.
    Scalar(ScalarKind),
    /// An enumeration.
    Enum(Arc<EnumType>),
    /// A nested DTO.
    Dto(Arc<DtoType>),
    /// Sequence of the inner type.
    Sequence(Box<FieldType>),
    /// Mapping from key type to value type. JSON keys are always strings;
    /// the key type constrains what those strings may contain.
    Mapping(Box<FieldType>, Box<FieldType>),
    /// Unordered set of the inner type.
    Set(Box<FieldType>),
    /// The inner type or `null`.
    Nullable(Box<FieldType>),
}

impl FieldType {
    /// `bool`.
    pub fn bool() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    /// `int`.
    pub fn int() -> Self {
        Self::Scalar(ScalarKind::Int)
    }

    /// `float`.
    pub fn float() -> Self {
        Self::Scalar(ScalarKind::Float)
    }

    /// `text`.
    pub fn text() -> Self {
        Self::Scalar(ScalarKind::Text)
    }

    /// `any`.
    pub fn any() -> Self {
        Self::Scalar(ScalarKind::Any)
    }

    /// An enumeration field.
    pub fn enumeration(ty: &Arc<EnumType>) -> Self {
        Self::Enum(Arc::clone(ty))
    }

    /// A nested DTO field.
    pub fn dto(ty: &Arc<DtoType>) -> Self {
        Self::Dto(Arc::clone(ty))
    }

    /// `sequence<item>`.
    pub fn sequence_of(item: FieldType) -> Self {
        Self::Sequence(Box::new(item))
    }

    /// `mapping<key, value>`.
    pub fn mapping_of(key: FieldType, value: FieldType) -> Self {
        Self::Mapping(Box::new(key), Box::new(value))
    }

    /// `set<item>`.
    pub fn set_of(item: FieldType) -> Self {
        Self::Set(Box::new(item))
    }

    /// `nullable<inner>`. Already-nullable types are returned unchanged.
    pub fn nullable(inner: FieldType) -> Self {
        match inner {
            Self::Nullable(_) => inner,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// True for the nullable wrapper.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// The type under any nullable wrappers.
    pub fn unwrap_nullable(&self) -> &FieldType {
        let mut ty = self;
        while let Self::Nullable(inner) = ty {
            ty = &**inner;
        }
        ty
    }

    /// The enum type when the unwrapped type is exactly an enumeration.
    ///
    /// Containers of enums return `None`.
    pub fn direct_enum(&self) -> Option<&Arc<EnumType>> {
        match self.unwrap_nullable() {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// True if `value` fits this type.
    ///
    /// Enum members and nested instances must belong to the declared enum or
    /// DTO type (matched by name). `any` accepts plain JSON-shaped values
    /// only, so that the value survives a round trip through JSON.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Self::Nullable(inner), _) => value.is_null() || inner.accepts(value),
            (Self::Scalar(ScalarKind::Any), _) => is_plain(value),
            (Self::Scalar(ScalarKind::Bool), FieldValue::Bool(_))
            | (Self::Scalar(ScalarKind::Int), FieldValue::Int(_))
            | (Self::Scalar(ScalarKind::Float), FieldValue::Float(_))
            | (Self::Scalar(ScalarKind::Text), FieldValue::Text(_)) => true,
            (Self::Enum(e), FieldValue::Enum(v)) => v.enum_type().name() == e.name(),
            (Self::Dto(d), FieldValue::Dto(inst)) => inst.type_name() == d.name(),
            (Self::Sequence(item), FieldValue::Sequence(items)) => {
                items.iter().all(|v| item.accepts(v))
            }
            (Self::Mapping(key, val), FieldValue::Mapping(map)) => map
                .iter()
                .all(|(k, v)| key.accepts_key(k) && val.accepts(v)),
            _ => false,
        }
    }

    /// True if the mapping key `key` fits this (key) type.
    ///
    /// JSON keys are always strings; the key type constrains which strings
    /// are acceptable.
    pub fn accepts_key(&self, key: &str) -> bool {
        match self.unwrap_nullable() {
            Self::Scalar(ScalarKind::Text | ScalarKind::Any) => true,
            Self::Scalar(ScalarKind::Int) => key.parse::<i64>().is_ok(),
            Self::Scalar(ScalarKind::Float) => key.parse::<f64>().is_ok(),
            Self::Scalar(ScalarKind::Bool) => matches!(key, "true" | "false"),
            Self::Enum(e) => e.from_value(&Value::String(key.to_string())).is_some(),
            _ => false,
        }
    }

    /// True if a set appears anywhere in this type.
    ///
    /// Nested DTO types are not descended into: they were checked when built.
    pub fn contains_set(&self) -> bool {
        match self {
            Self::Set(_) => true,
            Self::Sequence(inner) | Self::Nullable(inner) => inner.contains_set(),
            Self::Mapping(key, value) => key.contains_set() || value.contains_set(),
            Self::Scalar(_) | Self::Enum(_) | Self::Dto(_) => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Enum(e) => f.write_str(e.name()),
            Self::Dto(d) => f.write_str(d.name()),
            Self::Sequence(inner) => write!(f, "sequence<{inner}>"),
            Self::Mapping(key, value) => write!(f, "mapping<{key}, {value}>"),
            Self::Set(inner) => write!(f, "set<{inner}>"),
            Self::Nullable(inner) => write!(f, "nullable<{inner}>"),
        }
    }
}

fn is_plain(value: &FieldValue) -> bool {
    match value {
        FieldValue::Enum(_) | FieldValue::Dto(_) => false,
        FieldValue::Sequence(items) => items.iter().all(is_plain),
        FieldValue::Mapping(map) => map.values().all(is_plain),
        _ => true,
    }
}

/// JSON equality, except that numbers compare by numeric value (`1 == 1.0`).
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// A named enum member with its underlying JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    name: String,
    value: Value,
}

impl EnumMember {
    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// An enumeration: a name and an ordered list of members.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    name: String,
    members: Vec<EnumMember>,
}

impl EnumType {
    /// Define an enumeration from `(member name, underlying value)` pairs.
    pub fn new<N, V>(name: impl Into<String>, members: impl IntoIterator<Item = (N, V)>) -> Arc<Self>
    where
        N: Into<String>,
        V: Into<Value>,
    {
        Arc::new(Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(n, v)| EnumMember {
                    name: n.into(),
                    value: v.into(),
                })
                .collect(),
        })
    }

    /// Enum type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member named exactly `name`.
    pub fn member(self: &Arc<Self>, name: &str) -> Option<EnumValue> {
        self.position(|m| m.name == name)
    }

    /// The member whose underlying value equals `value`.
    ///
    /// Numbers compare numerically, so `1.0` selects a member valued `1`.
    pub fn from_value(self: &Arc<Self>, value: &Value) -> Option<EnumValue> {
        self.position(|m| same_value(&m.value, value))
    }

    /// The member whose name equals `name`, ignoring case.
    pub fn from_name_ignore_case(self: &Arc<Self>, name: &str) -> Option<EnumValue> {
        let lower = name.to_lowercase();
        self.position(|m| m.name.to_lowercase() == lower)
    }

    fn position(self: &Arc<Self>, pred: impl Fn(&EnumMember) -> bool) -> Option<EnumValue> {
        self.members.iter().position(pred).map(|index| EnumValue {
            ty: Arc::clone(self),
            index,
        })
    }
}

/// A member of a specific enumeration.
#[derive(Debug, Clone)]
pub struct EnumValue {
    ty: Arc<EnumType>,
    index: usize,
}

impl EnumValue {
    /// The enumeration this member belongs to.
    pub fn enum_type(&self) -> &Arc<EnumType> {
        &self.ty
    }

    fn member(&self) -> &EnumMember {
        &self.ty.members[self.index]
    }

    /// Member name.
    pub fn name(&self) -> &str {
        self.member().name()
    }

    /// Underlying value; this is what the member serializes to.
    pub fn value(&self) -> &Value {
        self.member().value()
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name == other.ty.name && self.index == other.index
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ty.name, self.name())
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name; also the mapping key.
    pub name: String,
    /// Declared type.
    pub ty: FieldType,
    /// Value used when input omits the field.
    pub default: Option<FieldValue>,
}

impl FieldDef {
    /// A field without a default.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// A field with an explicit default.
    pub fn with_default(name: impl Into<String>, ty: FieldType, default: FieldValue) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default),
        }
    }
}

/// Ordered field declarations of a DTO type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Build from field definitions, in order.
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// Field definitions in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if every field is nullable and has a default.
    pub fn is_normalized(&self) -> bool {
        self.fields
            .iter()
            .all(|f| f.ty.is_nullable() && f.default.is_some())
    }
}
