//! Schema-aware Avro encoder.

use avro_interop_buffers::ByteSink;

use crate::config::EncoderConfig;
use crate::encoder::AvroEncoder;
use crate::error::{EncodeError, SchemaError};
use crate::promotion::widen;
use crate::resolver::select_branch;
use crate::schema::{Names, RecordSchema, Schema};
use crate::value::Value;

/// Encodes [`Value`]s against one validated schema.
///
/// The schema is checked once on construction; the encoder itself is
/// immutable and can be shared between threads.
pub struct SchemaEncoder<'s> {
    schema: &'s Schema,
    names: Names<'s>,
    block_size: Option<usize>,
}

impl<'s> SchemaEncoder<'s> {
    pub fn new(schema: &'s Schema) -> Result<Self, SchemaError> {
        Self::with_config(schema, &EncoderConfig::default())
    }

    /// A `block_size` of zero is treated as unset.
    pub fn with_config(schema: &'s Schema, config: &EncoderConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            schema,
            names: Names::new(schema)?,
            block_size: config.block_size.filter(|&n| n > 0),
        })
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Writes `value` to `sink`.
    ///
    /// On error the sink may hold a partially written datum.
    pub fn encode<S: ByteSink>(&self, value: &Value, sink: S) -> Result<(), EncodeError> {
        let mut enc = AvroEncoder::with_sink(sink);
        self.write_value(&mut enc, value, self.schema)
    }

    pub fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.encode(value, &mut out)?;
        Ok(out)
    }

    fn write_value<S: ByteSink>(
        &self,
        enc: &mut AvroEncoder<S>,
        value: &Value,
        schema: &Schema,
    ) -> Result<(), EncodeError> {
        let schema = self.names.resolve(schema)?;
        match (schema, value) {
            (Schema::Union(branches), _) => {
                let index = select_branch(value, branches, &self.names)?;
                enc.write_len(index)?;
                let inner = match value {
                    Value::Union { value, .. } => value.as_ref(),
                    bare => bare,
                };
                self.write_value(enc, inner, &branches[index])
            }
            (Schema::Null, Value::Null) => enc.write_null(),
            (Schema::Boolean, Value::Bool(b)) => enc.write_boolean(*b),
            (Schema::Int | Schema::Long | Schema::Float | Schema::Double, _) => {
                self.write_number(enc, value, schema)
            }
            (Schema::Bytes, Value::Bytes(b)) => enc.write_bytes(b),
            (Schema::String, Value::Str(s)) => enc.write_str(s),
            (Schema::String, Value::Bytes(b)) => {
                std::str::from_utf8(b).map_err(|_| EncodeError::InvalidUtf8)?;
                enc.write_bytes(b)
            }
            (Schema::Fixed(fixed), Value::Fixed(b)) => enc.write_fixed(b, fixed.size),
            (Schema::Enum(e), Value::Enum(ordinal)) => {
                if *ordinal >= e.symbols.len() {
                    return Err(EncodeError::UnknownSymbol {
                        ordinal: *ordinal,
                        symbols: e.symbols.len(),
                    });
                }
                enc.write_len(*ordinal)
            }
            (Schema::Array(items_schema), Value::Array(items)) => {
                let block = self.block_size.unwrap_or(items.len()).max(1);
                for chunk in items.chunks(block) {
                    tracing::trace!(items = chunk.len(), "array block");
                    enc.write_len(chunk.len())?;
                    for item in chunk {
                        self.write_value(enc, item, items_schema)?;
                    }
                }
                enc.write_len(0)
            }
            (Schema::Map(values_schema), Value::Map(entries)) => {
                let entries: Vec<_> = entries.iter().collect();
                let block = self.block_size.unwrap_or(entries.len()).max(1);
                for chunk in entries.chunks(block) {
                    tracing::trace!(entries = chunk.len(), "map block");
                    enc.write_len(chunk.len())?;
                    for (key, item) in chunk {
                        enc.write_str(key)?;
                        self.write_value(enc, item, values_schema)?;
                    }
                }
                enc.write_len(0)
            }
            (Schema::Record(record), Value::Record(fields)) => {
                self.write_record(enc, record, fields)
            }
            _ => Err(mismatch(schema, value)),
        }
    }

    /// Writes a numeric value, widening it to the declared width.
    fn write_number<S: ByteSink>(
        &self,
        enc: &mut AvroEncoder<S>,
        value: &Value,
        schema: &Schema,
    ) -> Result<(), EncodeError> {
        let target = schema.kind().ok_or_else(|| mismatch(schema, value))?;
        match widen(value, target) {
            Some(Value::Int(n)) => enc.write_int(n),
            Some(Value::Long(n)) => enc.write_long(n),
            Some(Value::Float(x)) => enc.write_float(x),
            Some(Value::Double(x)) => enc.write_double(x),
            _ => Err(mismatch(schema, value)),
        }
    }

    fn write_record<S: ByteSink>(
        &self,
        enc: &mut AvroEncoder<S>,
        record: &RecordSchema,
        fields: &[(String, Value)],
    ) -> Result<(), EncodeError> {
        if let Some((name, _)) = fields
            .iter()
            .find(|(name, _)| !record.fields.iter().any(|f| &f.name == name))
        {
            return Err(EncodeError::UnknownField(name.clone()));
        }
        for field in &record.fields {
            match fields.iter().find(|(name, _)| name == &field.name) {
                Some((_, value)) => self.write_value(enc, value, &field.schema)?,
                None if self.names.admits_null(&field.schema)? => {
                    self.write_value(enc, &Value::Null, &field.schema)?
                }
                None => return Err(EncodeError::MissingField(field.name.clone())),
            }
        }
        Ok(())
    }
}

fn mismatch(schema: &Schema, value: &Value) -> EncodeError {
    EncodeError::TypeMismatch {
        expected: schema.type_name(),
        found: value.kind(),
    }
}
