//! Schema-agnostic datum values.

use indexmap::IndexMap;

use crate::promotion::Kind;

/// A decoded (or to-be-encoded) datum.
///
/// Values carry no schema: enums are ordinals into the schema's symbol list,
/// records are ordered `(field name, value)` pairs, and unions remember the
/// branch index they were read from.
///
/// Equality is structural with two refinements: map entries compare without
/// regard to insertion order, and floating point values compare by bit
/// pattern (`-0.0 != 0.0`, identical NaN payloads are equal).
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    Str(String),
    Fixed(Vec<u8>),
    Enum(usize),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
    Record(Vec<(String, Value)>),
    Union { index: usize, value: Box<Value> },
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Int(_) => Kind::Int,
            Value::Long(_) => Kind::Long,
            Value::Float(_) => Kind::Float,
            Value::Double(_) => Kind::Double,
            Value::Bytes(_) => Kind::Bytes,
            Value::Str(_) => Kind::String,
            Value::Fixed(_) => Kind::Fixed,
            Value::Enum(_) => Kind::Enum,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Map,
            Value::Record(_) => Kind::Record,
            Value::Union { .. } => Kind::Union,
        }
    }

    /// Builds a record from `(name, value)` pairs.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a map from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn union(index: usize, value: Value) -> Self {
        Value::Union {
            index,
            value: Box::new(value),
        }
    }

    /// Looks up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Strips any union wrappers.
    pub fn branch(&self) -> &Value {
        match self {
            Value::Union { value, .. } => value.branch(),
            other => other,
        }
    }

    /// Branch index when this value is a union.
    pub fn union_index(&self) -> Option<usize> {
        match self {
            Value::Union { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Fixed(a), Value::Fixed(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            // IndexMap equality is order-insensitive.
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (
                Value::Union {
                    index: ia,
                    value: va,
                },
                Value::Union {
                    index: ib,
                    value: vb,
                },
            ) => ia == ib && va == vb,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Double(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
