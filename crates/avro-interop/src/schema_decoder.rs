//! Schema-aware Avro decoder.

use avro_interop_buffers::{ByteSource, Reader};
use indexmap::IndexMap;

use crate::config::DecoderConfig;
use crate::decoder::AvroDecoder;
use crate::error::{DecodeError, SchemaError};
use crate::schema::{Names, Schema};
use crate::value::Value;

/// Decodes datums written with one validated schema.
pub struct SchemaDecoder<'s> {
    schema: &'s Schema,
    names: Names<'s>,
    config: DecoderConfig,
}

impl<'s> SchemaDecoder<'s> {
    pub fn new(schema: &'s Schema) -> Result<Self, SchemaError> {
        Self::with_config(schema, &DecoderConfig::default())
    }

    pub fn with_config(schema: &'s Schema, config: &DecoderConfig) -> Result<Self, SchemaError> {
        Ok(Self {
            schema,
            names: Names::new(schema)?,
            config: config.clone(),
        })
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Reads one datum from `source`.
    ///
    /// Pass `&mut source` to read several consecutive datums from the same
    /// stream.
    pub fn decode<S: ByteSource>(&self, source: S) -> Result<Value, DecodeError> {
        let mut dec = AvroDecoder::new(source).with_max_bytes_len(self.config.max_bytes_len);
        self.read_value(&mut dec, self.schema, 0)
    }

    pub fn decode_slice(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        self.decode(Reader::new(bytes))
    }

    /// Reads datums until `source` is exhausted.
    pub fn decode_all<S: ByteSource>(&self, mut source: S) -> Result<Vec<Value>, DecodeError> {
        let mut values = Vec::new();
        while !source.is_exhausted()? {
            values.push(self.decode(&mut source)?);
        }
        Ok(values)
    }

    fn read_value<S: ByteSource>(
        &self,
        dec: &mut AvroDecoder<S>,
        schema: &Schema,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let schema = self.names.resolve(schema)?;
        let value = match schema {
            Schema::Null => Value::Null,
            Schema::Boolean => Value::Bool(dec.read_boolean()?),
            Schema::Int => Value::Int(dec.read_int()?),
            Schema::Long => Value::Long(dec.read_long()?),
            Schema::Float => Value::Float(dec.read_float()?),
            Schema::Double => Value::Double(dec.read_double()?),
            Schema::Bytes => Value::Bytes(dec.read_bytes()?),
            Schema::String => Value::Str(dec.read_string()?),
            Schema::Fixed(fixed) => Value::Fixed(dec.read_fixed(fixed.size)?),
            Schema::Enum(e) => {
                let ordinal = dec.read_long()?;
                match usize::try_from(ordinal) {
                    Ok(i) if i < e.symbols.len() => Value::Enum(i),
                    _ => {
                        return Err(DecodeError::UnknownSymbol {
                            ordinal,
                            symbols: e.symbols.len(),
                        })
                    }
                }
            }
            Schema::Array(items_schema) => {
                let depth = self.enter(depth)?;
                let mut items = Vec::new();
                self.read_blocks(dec, |dec| {
                    items.push(self.read_value(dec, items_schema, depth)?);
                    Ok(())
                })?;
                Value::Array(items)
            }
            Schema::Map(values_schema) => {
                let depth = self.enter(depth)?;
                let mut entries = IndexMap::new();
                self.read_blocks(dec, |dec| {
                    let key = dec.read_string()?;
                    let value = self.read_value(dec, values_schema, depth)?;
                    entries.insert(key, value);
                    Ok(())
                })?;
                Value::Map(entries)
            }
            Schema::Record(record) => {
                let depth = self.enter(depth)?;
                let mut fields = Vec::with_capacity(record.fields.len());
                for field in &record.fields {
                    let value = self.read_value(dec, &field.schema, depth)?;
                    fields.push((field.name.clone(), value));
                }
                Value::Record(fields)
            }
            Schema::Union(branches) => {
                let depth = self.enter(depth)?;
                let index = dec.read_long()?;
                let branch = usize::try_from(index)
                    .ok()
                    .filter(|&i| i < branches.len())
                    .ok_or(DecodeError::InvalidUnionBranch {
                        index,
                        branches: branches.len(),
                    })?;
                let value = self.read_value(dec, &branches[branch], depth)?;
                Value::union(branch, value)
            }
            Schema::Ref(name) => {
                return Err(SchemaError::UnresolvedReference(name.fullname()).into())
            }
        };
        Ok(value)
    }

    fn enter(&self, depth: usize) -> Result<usize, DecodeError> {
        let depth = depth + 1;
        if depth > self.config.max_depth {
            return Err(DecodeError::LimitExceeded {
                what: "nesting depth",
                len: depth as u64,
                limit: self.config.max_depth,
            });
        }
        Ok(depth)
    }

    /// Reads array/map blocks until the terminating zero count, calling
    /// `read_item` once per item.
    fn read_blocks<S, F>(&self, dec: &mut AvroDecoder<S>, mut read_item: F) -> Result<(), DecodeError>
    where
        S: ByteSource,
        F: FnMut(&mut AvroDecoder<S>) -> Result<(), DecodeError>,
    {
        let limit = self.config.max_collection_len;
        let mut total: u64 = 0;
        loop {
            let count = dec.read_block_len()?;
            if count == 0 {
                return Ok(());
            }
            total = total.saturating_add(count);
            if total > limit as u64 {
                return Err(DecodeError::LimitExceeded {
                    what: "collection length",
                    len: total,
                    limit,
                });
            }
            tracing::trace!(count, "block");
            for _ in 0..count {
                read_item(dec)?;
            }
        }
    }
}
