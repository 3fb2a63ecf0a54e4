//! Avro schema model: the schema tree, the named type registry, and the
//! JSON schema format.

mod names;
mod parser;
mod printer;
mod types;

pub use names::Names;
pub use types::{EnumSchema, FixedSchema, Name, RecordField, RecordSchema, Schema};
