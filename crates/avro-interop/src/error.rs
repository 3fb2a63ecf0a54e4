//! Error types for schema construction, encoding and decoding.

use avro_interop_buffers::BufferError;

use crate::promotion::Kind;

/// Malformed or self-inconsistent schema definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(String),
    #[error("unknown type: {0}")]
    UnknownType(String),
    #[error("missing attribute `{attr}` in {context}")]
    MissingAttribute { attr: &'static str, context: String },
    #[error("invalid attribute `{attr}` in {context}: {reason}")]
    InvalidAttribute {
        attr: &'static str,
        context: String,
        reason: String,
    },
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    #[error("named type defined more than once: {0}")]
    DuplicateName(String),
    #[error("unresolved type reference: {0}")]
    UnresolvedReference(String),
    #[error("duplicate field `{field}` in record {record}")]
    DuplicateField { record: String, field: String },
    #[error("enum {0} declares no symbols")]
    EmptyEnum(String),
    #[error("duplicate symbol `{symbol}` in enum {name}")]
    DuplicateSymbol { name: String, symbol: String },
    #[error("default symbol `{symbol}` is not declared by enum {name}")]
    UnknownDefaultSymbol { name: String, symbol: String },
    #[error("union declares no branches")]
    EmptyUnion,
    #[error("union directly contains another union")]
    NestedUnion,
    #[error("union declares branch `{0}` more than once")]
    DuplicateUnionBranch(String),
}

/// Failure while encoding a value against a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("no union branch accepts a {kind} value (branches: {branches:?})")]
    NoMatchingUnionBranch { kind: Kind, branches: Vec<String> },
    #[error("fixed size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("string content is not valid UTF-8")]
    InvalidUtf8,
    #[error("type mismatch: expected {expected}, found {found} value")]
    TypeMismatch { expected: String, found: Kind },
    #[error("enum ordinal {ordinal} out of range for {symbols} symbols")]
    UnknownSymbol { ordinal: usize, symbols: usize },
    #[error("record field `{0}` is missing and does not admit null")]
    MissingField(String),
    #[error("record value carries undeclared field `{0}`")]
    UnknownField(String),
    #[error("union branch {index} out of range for {branches} branches")]
    InvalidUnionBranch { index: usize, branches: usize },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Failure while decoding bytes against a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("input ended in the middle of a value")]
    TruncatedInput,
    #[error("variable-length integer overflows its target width")]
    Overflow,
    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBoolean(u8),
    #[error("enum ordinal {ordinal} out of range for {symbols} symbols")]
    UnknownSymbol { ordinal: i64, symbols: usize },
    #[error("union branch {index} out of range for {branches} branches")]
    InvalidUnionBranch { index: i64, branches: usize },
    #[error("string content is not valid UTF-8")]
    InvalidUtf8,
    #[error("negative length {0}")]
    NegativeLength(i64),
    #[error("{what} of {len} exceeds the configured limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        len: u64,
        limit: usize,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<BufferError> for DecodeError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => DecodeError::TruncatedInput,
            BufferError::Io { message, .. } => DecodeError::Io(message),
        }
    }
}

/// Failure converting between JSON and datum values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonError {
    #[error("at {path}: expected {expected}, found {found}")]
    Mismatch {
        path: String,
        expected: String,
        found: String,
    },
    #[error("at {path}: {message}")]
    Invalid { path: String, message: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
