//! Schema-driven Avro binary encoding.
//!
//! A [`Schema`] describes the shape of a datum; [`Value`] is the datum
//! itself. Encoding writes the canonical Avro binary form, with union
//! branches chosen by exact kind first and by numeric promotion
//! (`int → long → float → double`) second. Decoding reads the bytes back
//! using only the schema.
//!
//! ```
//! use avro_interop::{from_avro_datum, to_avro_datum, Schema, Value};
//!
//! let schema = Schema::parse(r#"["long", "int"]"#).unwrap();
//! let bytes = to_avro_datum(&schema, &Value::Int(0)).unwrap();
//! assert_eq!(bytes, [0x02, 0x00]);
//! assert_eq!(from_avro_datum(&schema, &bytes).unwrap(), Value::union(1, Value::Int(0)));
//! ```

pub mod cli;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod json;
pub mod promotion;
pub mod resolver;
pub mod schema;
pub mod schema_decoder;
pub mod schema_encoder;
pub mod value;

pub use avro_interop_buffers::{BufferError, ByteSink, ByteSource, IoSink, IoSource, Reader, Writer};
pub use config::{CodecConfig, ConfigError, DecoderConfig, EncoderConfig};
pub use decoder::AvroDecoder;
pub use encoder::AvroEncoder;
pub use error::{DecodeError, EncodeError, JsonError, SchemaError};
pub use json::{value_from_json, value_to_json};
pub use promotion::{promotable, widen, Kind};
pub use schema::{EnumSchema, FixedSchema, Name, Names, RecordField, RecordSchema, Schema};
pub use schema_decoder::SchemaDecoder;
pub use schema_encoder::SchemaEncoder;
pub use value::Value;

/// Encodes `value` against `schema` into `sink`.
pub fn encode<S: ByteSink>(schema: &Schema, value: &Value, sink: S) -> Result<(), EncodeError> {
    SchemaEncoder::new(schema)?.encode(value, sink)
}

/// Decodes one datum written with `schema` from `source`.
pub fn decode<S: ByteSource>(schema: &Schema, source: S) -> Result<Value, DecodeError> {
    SchemaDecoder::new(schema)?.decode(source)
}

pub fn to_avro_datum(schema: &Schema, value: &Value) -> Result<Vec<u8>, EncodeError> {
    SchemaEncoder::new(schema)?.encode_to_vec(value)
}

pub fn from_avro_datum(schema: &Schema, bytes: &[u8]) -> Result<Value, DecodeError> {
    SchemaDecoder::new(schema)?.decode_slice(bytes)
}
