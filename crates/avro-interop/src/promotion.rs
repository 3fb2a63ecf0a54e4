//! Value kinds and the numeric promotion lattice.
//!
//! The lattice is a chain `int → long → float → double`. Every other kind
//! (including `boolean`) is only compatible with itself, so a boolean can
//! never land in a numeric union branch and vice versa.

use std::fmt;

use crate::value::Value;

/// Kind of a schema or of a datum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Fixed,
    Enum,
    Array,
    Map,
    Record,
    Union,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Int => "int",
            Kind::Long => "long",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::Bytes => "bytes",
            Kind::String => "string",
            Kind::Fixed => "fixed",
            Kind::Enum => "enum",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Record => "record",
            Kind::Union => "union",
        }
    }

    /// Position in the numeric chain, `None` for non-numeric kinds.
    fn numeric_rank(self) -> Option<u8> {
        match self {
            Kind::Int => Some(0),
            Kind::Long => Some(1),
            Kind::Float => Some(2),
            Kind::Double => Some(3),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a value of kind `from` may be written where `to` is declared.
///
/// Reflexive for every kind; otherwise true only for strictly upward steps
/// in the numeric chain.
pub fn promotable(from: Kind, to: Kind) -> bool {
    if from == to {
        return true;
    }
    match (from.numeric_rank(), to.numeric_rank()) {
        (Some(a), Some(b)) => a < b,
        _ => false,
    }
}

/// Converts a numeric scalar to the representation of `to`.
///
/// Returns `None` for non-numeric values and for downward conversions.
/// Widening into `float` may round (`long → float` keeps 24 bits of
/// mantissa), which is the same conversion every other runtime performs.
pub fn widen(value: &Value, to: Kind) -> Option<Value> {
    if !promotable(value.kind(), to) || !to.is_numeric() {
        return None;
    }
    let widened = match (value, to) {
        (Value::Int(n), Kind::Int) => Value::Int(*n),
        (Value::Int(n), Kind::Long) => Value::Long(i64::from(*n)),
        (Value::Int(n), Kind::Float) => Value::Float(*n as f32),
        (Value::Int(n), Kind::Double) => Value::Double(f64::from(*n)),
        (Value::Long(n), Kind::Long) => Value::Long(*n),
        (Value::Long(n), Kind::Float) => Value::Float(*n as f32),
        (Value::Long(n), Kind::Double) => Value::Double(*n as f64),
        (Value::Float(x), Kind::Float) => Value::Float(*x),
        (Value::Float(x), Kind::Double) => Value::Double(f64::from(*x)),
        (Value::Double(x), Kind::Double) => Value::Double(*x),
        _ => return None,
    };
    Some(widened)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Kind; 14] = [
        Kind::Null,
        Kind::Boolean,
        Kind::Int,
        Kind::Long,
        Kind::Float,
        Kind::Double,
        Kind::Bytes,
        Kind::String,
        Kind::Fixed,
        Kind::Enum,
        Kind::Array,
        Kind::Map,
        Kind::Record,
        Kind::Union,
    ];

    #[test]
    fn lattice_is_reflexive() {
        for kind in ALL {
            assert!(promotable(kind, kind), "{kind} should accept itself");
        }
    }

    #[test]
    fn numeric_chain_only_goes_up() {
        let chain = [Kind::Int, Kind::Long, Kind::Float, Kind::Double];
        for (i, from) in chain.iter().enumerate() {
            for (j, to) in chain.iter().enumerate() {
                assert_eq!(promotable(*from, *to), i <= j, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn boolean_and_null_never_promote() {
        for kind in ALL {
            if kind != Kind::Boolean {
                assert!(!promotable(Kind::Boolean, kind), "boolean -> {kind}");
                assert!(!promotable(kind, Kind::Boolean), "{kind} -> boolean");
            }
            if kind != Kind::Null {
                assert!(!promotable(Kind::Null, kind), "null -> {kind}");
                assert!(!promotable(kind, Kind::Null), "{kind} -> null");
            }
        }
    }

    #[test]
    fn bytes_and_string_are_not_numeric_peers() {
        assert!(!promotable(Kind::String, Kind::Bytes));
        assert!(!promotable(Kind::Bytes, Kind::String));
        assert!(!promotable(Kind::Fixed, Kind::Bytes));
    }

    #[test]
    fn widen_converts_to_target_width() {
        assert_eq!(widen(&Value::Int(7), Kind::Long), Some(Value::Long(7)));
        assert_eq!(widen(&Value::Int(7), Kind::Float), Some(Value::Float(7.0)));
        assert_eq!(widen(&Value::Int(-3), Kind::Double), Some(Value::Double(-3.0)));
        assert_eq!(widen(&Value::Long(1 << 40), Kind::Double), Some(Value::Double((1u64 << 40) as f64)));
        assert_eq!(widen(&Value::Float(0.5), Kind::Double), Some(Value::Double(0.5)));
        assert_eq!(widen(&Value::Double(0.5), Kind::Double), Some(Value::Double(0.5)));
    }

    #[test]
    fn widen_refuses_narrowing_and_non_numeric() {
        assert_eq!(widen(&Value::Long(1), Kind::Int), None);
        assert_eq!(widen(&Value::Double(1.0), Kind::Float), None);
        assert_eq!(widen(&Value::Bool(false), Kind::Double), None);
        assert_eq!(widen(&Value::Null, Kind::Int), None);
        assert_eq!(widen(&Value::Int(1), Kind::String), None);
        assert_eq!(widen(&Value::Str("1".into()), Kind::Long), None);
    }

    #[test]
    fn widen_long_into_float_rounds_like_a_cast() {
        let big = (1i64 << 24) + 1;
        assert_eq!(widen(&Value::Long(big), Kind::Float), Some(Value::Float(16_777_216.0)));
    }

    #[test]
    fn widen_preserves_negative_zero() {
        match widen(&Value::Float(-0.0), Kind::Double) {
            Some(Value::Double(x)) => assert_eq!(x.to_bits(), (-0.0f64).to_bits()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
