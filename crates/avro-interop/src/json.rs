//! Schema-guided conversion between JSON documents and datum values.
//!
//! Follows the Avro JSON conventions: bytes and fixed are strings with one
//! character per byte (code points 0-255), enums are symbol names, and
//! unions are either wrapped as `{"<branch type>": value}` or given bare.
//! Bare union values are classified and resolved with the same rules the
//! binary encoder uses. Output always prints unions unwrapped.

use indexmap::IndexMap;
use serde_json::{json, Map, Number, Value as JsonValue};

use crate::error::JsonError;
use crate::promotion::Kind;
use crate::resolver::select_branch;
use crate::schema::{Names, RecordSchema, Schema};
use crate::value::Value;

/// Builds a datum for `schema` from its JSON form.
pub fn value_from_json(json: &JsonValue, schema: &Schema) -> Result<Value, JsonError> {
    let names = Names::new(schema)?;
    Bridge { names: &names }.from_json(json, schema, "$")
}

/// Renders a datum written against `schema` as JSON.
pub fn value_to_json(value: &Value, schema: &Schema) -> Result<JsonValue, JsonError> {
    let names = Names::new(schema)?;
    Bridge { names: &names }.to_json(value, schema, "$")
}

static JSON_NULL: JsonValue = JsonValue::Null;

struct Bridge<'n, 's> {
    names: &'n Names<'s>,
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn mismatch(path: &str, schema: &Schema, found: impl Into<String>) -> JsonError {
    JsonError::Mismatch {
        path: path.to_string(),
        expected: schema.type_name(),
        found: found.into(),
    }
}

fn invalid(path: &str, message: impl Into<String>) -> JsonError {
    JsonError::Invalid {
        path: path.to_string(),
        message: message.into(),
    }
}

fn bytes_from_json(text: &str, path: &str) -> Result<Vec<u8>, JsonError> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| invalid(path, format!("character {c:?} is not a byte"))))
        .collect()
}

fn bytes_to_json(bytes: &[u8]) -> JsonValue {
    JsonValue::String(bytes.iter().map(|&b| char::from(b)).collect())
}

fn float_from_json(json: &JsonValue) -> Option<f64> {
    match json {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

fn float_to_json(x: f64) -> JsonValue {
    match Number::from_f64(x) {
        Some(n) => JsonValue::Number(n),
        None if x.is_nan() => json!("NaN"),
        None if x > 0.0 => json!("Infinity"),
        None => json!("-Infinity"),
    }
}

impl Bridge<'_, '_> {
    fn from_json(&self, json: &JsonValue, schema: &Schema, path: &str) -> Result<Value, JsonError> {
        let schema = self.names.resolve(schema)?;
        let found = || json_kind(json);
        let value = match (schema, json) {
            (Schema::Null, JsonValue::Null) => Value::Null,
            (Schema::Boolean, JsonValue::Bool(b)) => Value::Bool(*b),
            (Schema::Int, JsonValue::Number(n)) => {
                let n = n.as_i64().ok_or_else(|| mismatch(path, schema, n.to_string()))?;
                Value::Int(i32::try_from(n).map_err(|_| invalid(path, format!("{n} does not fit in an int")))?)
            }
            (Schema::Long, JsonValue::Number(n)) => {
                Value::Long(n.as_i64().ok_or_else(|| mismatch(path, schema, n.to_string()))?)
            }
            (Schema::Float, _) => match float_from_json(json) {
                Some(x) => Value::Float(x as f32),
                None => return Err(mismatch(path, schema, found())),
            },
            (Schema::Double, _) => match float_from_json(json) {
                Some(x) => Value::Double(x),
                None => return Err(mismatch(path, schema, found())),
            },
            (Schema::Bytes, JsonValue::String(s)) => Value::Bytes(bytes_from_json(s, path)?),
            (Schema::String, JsonValue::String(s)) => Value::Str(s.clone()),
            (Schema::Fixed(fixed), JsonValue::String(s)) => {
                let bytes = bytes_from_json(s, path)?;
                if bytes.len() != fixed.size {
                    return Err(invalid(
                        path,
                        format!("expected {} bytes, got {}", fixed.size, bytes.len()),
                    ));
                }
                Value::Fixed(bytes)
            }
            (Schema::Enum(e), JsonValue::String(symbol)) => {
                let ordinal = e
                    .symbols
                    .iter()
                    .position(|s| s == symbol)
                    .ok_or_else(|| invalid(path, format!("unknown symbol {symbol:?}")))?;
                Value::Enum(ordinal)
            }
            (Schema::Array(items), JsonValue::Array(elements)) => Value::Array(
                elements
                    .iter()
                    .enumerate()
                    .map(|(i, e)| self.from_json(e, items, &format!("{path}[{i}]")))
                    .collect::<Result<_, _>>()?,
            ),
            (Schema::Map(values), JsonValue::Object(obj)) => {
                let mut entries = IndexMap::with_capacity(obj.len());
                for (key, v) in obj {
                    entries.insert(key.clone(), self.from_json(v, values, &format!("{path}.{key}"))?);
                }
                Value::Map(entries)
            }
            (Schema::Record(record), JsonValue::Object(obj)) => self.record_from_json(record, obj, path)?,
            (Schema::Union(branches), _) => self.union_from_json(json, branches, path)?,
            _ => return Err(mismatch(path, schema, found())),
        };
        Ok(value)
    }

    fn record_from_json(
        &self,
        record: &RecordSchema,
        obj: &Map<String, JsonValue>,
        path: &str,
    ) -> Result<Value, JsonError> {
        if let Some(key) = obj.keys().find(|k| !record.fields.iter().any(|f| &f.name == *k)) {
            return Err(invalid(path, format!("unknown field {key:?}")));
        }
        let mut fields = Vec::with_capacity(record.fields.len());
        for field in &record.fields {
            let field_path = format!("{path}.{}", field.name);
            let json = match (obj.get(&field.name), &field.default) {
                (Some(json), _) => json,
                (None, Some(default)) => default,
                (None, None) if self.names.admits_null(&field.schema)? => &JSON_NULL,
                (None, None) => return Err(invalid(&field_path, "missing field")),
            };
            fields.push((field.name.clone(), self.from_json(json, &field.schema, &field_path)?));
        }
        Ok(Value::Record(fields))
    }

    fn union_from_json(&self, json: &JsonValue, branches: &[Schema], path: &str) -> Result<Value, JsonError> {
        // Wrapped form: {"<branch type>": value}.
        if let JsonValue::Object(obj) = json {
            if let (1, Some((key, inner))) = (obj.len(), obj.iter().next()) {
                let wrapped = branches.iter().enumerate().find(|(_, b)| {
                    b.type_name() == *key || b.name().is_some_and(|n| n.name == *key)
                });
                if let Some((index, branch)) = wrapped {
                    let value = self.from_json(inner, branch, &format!("{path}.{key}"))?;
                    return Ok(Value::union(index, value));
                }
            }
        }

        let bare = match json {
            JsonValue::Null => Some(Value::Null),
            JsonValue::Bool(b) => Some(Value::Bool(*b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Some(i32::try_from(i).map_or(Value::Long(i), Value::Int)),
                None => n.as_f64().map(Value::Double),
            },
            _ => None,
        };
        if let Some(bare) = bare {
            let index = match select_branch(&bare, branches, self.names) {
                Ok(index) => index,
                // JSON has no single precision literal, so a fractional
                // number may still be meant for a float branch.
                Err(err) => branches
                    .iter()
                    .position(|b| {
                        matches!(bare, Value::Double(_))
                            && self.names.kind_of(b) == Ok(Kind::Float)
                    })
                    .ok_or_else(|| invalid(path, err.to_string()))?,
            };
            let value = self.from_json(json, &branches[index], path)?;
            return Ok(Value::union(index, value));
        }

        for (index, branch) in branches.iter().enumerate() {
            if let Ok(value) = self.from_json(json, branch, path) {
                return Ok(Value::union(index, value));
            }
        }
        Err(JsonError::Mismatch {
            path: path.to_string(),
            expected: format!(
                "one of [{}]",
                branches.iter().map(Schema::type_name).collect::<Vec<_>>().join(", ")
            ),
            found: json_kind(json).to_string(),
        })
    }

    fn to_json(&self, value: &Value, schema: &Schema, path: &str) -> Result<JsonValue, JsonError> {
        let schema = self.names.resolve(schema)?;
        let found = || value.kind().to_string();
        let json = match (schema, value) {
            (Schema::Union(branches), _) => {
                let index = select_branch(value, branches, self.names)
                    .map_err(|e| invalid(path, e.to_string()))?;
                let inner = match value {
                    Value::Union { value, .. } => value.as_ref(),
                    bare => bare,
                };
                return self.to_json(inner, &branches[index], path);
            }
            (Schema::Null, Value::Null) => JsonValue::Null,
            (Schema::Boolean, Value::Bool(b)) => JsonValue::Bool(*b),
            (Schema::Int | Schema::Long | Schema::Float | Schema::Double, Value::Int(n)) => json!(n),
            (Schema::Long | Schema::Float | Schema::Double, Value::Long(n)) => json!(n),
            // Shortest decimal form of the f32, not of its f64 widening.
            (Schema::Float | Schema::Double, Value::Float(x)) => {
                float_to_json(x.to_string().parse::<f64>().unwrap_or(f64::from(*x)))
            }
            (Schema::Double, Value::Double(x)) => float_to_json(*x),
            (Schema::Bytes | Schema::Fixed(_), Value::Bytes(b) | Value::Fixed(b)) => bytes_to_json(b),
            (Schema::String, Value::Str(s)) => JsonValue::String(s.clone()),
            (Schema::String, Value::Bytes(b)) => match std::str::from_utf8(b) {
                Ok(s) => JsonValue::String(s.to_string()),
                Err(_) => return Err(invalid(path, "string content is not valid UTF-8")),
            },
            (Schema::Enum(e), Value::Enum(ordinal)) => match e.symbols.get(*ordinal) {
                Some(symbol) => JsonValue::String(symbol.clone()),
                None => return Err(invalid(path, format!("enum ordinal {ordinal} out of range"))),
            },
            (Schema::Array(items), Value::Array(elements)) => JsonValue::Array(
                elements
                    .iter()
                    .enumerate()
                    .map(|(i, e)| self.to_json(e, items, &format!("{path}[{i}]")))
                    .collect::<Result<_, _>>()?,
            ),
            (Schema::Map(values), Value::Map(entries)) => {
                let mut obj = Map::with_capacity(entries.len());
                for (key, v) in entries {
                    obj.insert(key.clone(), self.to_json(v, values, &format!("{path}.{key}"))?);
                }
                JsonValue::Object(obj)
            }
            (Schema::Record(record), Value::Record(fields)) => {
                let mut obj = Map::with_capacity(fields.len());
                for (name, v) in fields {
                    let field = record
                        .fields
                        .iter()
                        .find(|f| &f.name == name)
                        .ok_or_else(|| invalid(path, format!("unknown field {name:?}")))?;
                    obj.insert(name.clone(), self.to_json(v, &field.schema, &format!("{path}.{name}"))?);
                }
                JsonValue::Object(obj)
            }
            _ => return Err(mismatch(path, schema, found())),
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(text: &str) -> Schema {
        Schema::parse(text).unwrap()
    }

    #[test]
    fn bare_union_numbers_use_the_resolver() {
        let s = schema(r#"["long", "int"]"#);
        assert_eq!(value_from_json(&json!(0), &s), Ok(Value::union(1, Value::Int(0))));
        assert_eq!(
            value_from_json(&json!(1_i64 << 40), &s),
            Ok(Value::union(0, Value::Long(1 << 40)))
        );
        let s = schema(r#"["boolean", "double", {"type": "array", "items": "bytes"}]"#);
        assert_eq!(value_from_json(&json!(false), &s), Ok(Value::union(0, Value::Bool(false))));
        assert_eq!(value_from_json(&json!(1.0), &s), Ok(Value::union(1, Value::Double(1.0))));
        assert_eq!(
            value_from_json(&json!(["\u{1}\u{2}"]), &s),
            Ok(Value::union(2, Value::Array(vec![Value::Bytes(vec![1, 2])])))
        );
    }

    #[test]
    fn fractional_numbers_fit_a_float_only_union() {
        let s = schema(r#"["null", "float"]"#);
        assert_eq!(value_from_json(&json!(1.5), &s), Ok(Value::union(1, Value::Float(1.5))));
        assert_eq!(value_from_json(&json!(null), &s), Ok(Value::union(0, Value::Null)));
        // An integer is promoted into the float branch as usual.
        assert_eq!(value_from_json(&json!(2), &s), Ok(Value::union(1, Value::Float(2.0))));

        let s = schema(r#"{"type": "record", "name": "R", "fields": [{"name": "f", "type": ["null", "float"]}]}"#);
        assert_eq!(
            value_from_json(&json!({"f": 0.25}), &s),
            Ok(Value::record([("f", Value::union(1, Value::Float(0.25)))]))
        );

        // A double branch still wins when there is one.
        let s = schema(r#"["float", "double"]"#);
        assert_eq!(value_from_json(&json!(1.5), &s), Ok(Value::union(1, Value::Double(1.5))));

        let s = schema(r#"["null", "int"]"#);
        assert!(matches!(value_from_json(&json!(1.5), &s), Err(JsonError::Invalid { .. })));
    }

    #[test]
    fn wrapped_union_form() {
        let s = schema(r#"["null", "long", {"type": "enum", "name": "ns.Kind", "symbols": ["A"]}]"#);
        assert_eq!(value_from_json(&json!({"long": 3}), &s), Ok(Value::union(1, Value::Long(3))));
        assert_eq!(value_from_json(&json!({"ns.Kind": "A"}), &s), Ok(Value::union(2, Value::Enum(0))));
        assert_eq!(value_from_json(&json!(null), &s), Ok(Value::union(0, Value::Null)));
    }

    #[test]
    fn record_defaults_fill_missing_fields() {
        let s = schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": "int", "default": 7},
                {"name": "b", "type": ["null", "string"]},
                {"name": "c", "type": "string"}
            ]}"#,
        );
        assert_eq!(
            value_from_json(&json!({"c": "x"}), &s),
            Ok(Value::record([
                ("a", Value::Int(7)),
                ("b", Value::union(0, Value::Null)),
                ("c", Value::from("x")),
            ]))
        );
        assert_eq!(
            value_from_json(&json!({}), &s),
            Err(JsonError::Invalid {
                path: "$.c".into(),
                message: "missing field".into()
            })
        );
        assert!(matches!(
            value_from_json(&json!({"c": "x", "d": 1}), &s),
            Err(JsonError::Invalid { .. })
        ));
    }

    #[test]
    fn mismatches_carry_a_path() {
        let s = schema(r#"{"type": "array", "items": "int"}"#);
        assert_eq!(
            value_from_json(&json!([1, "two"]), &s),
            Err(JsonError::Mismatch {
                path: "$[1]".into(),
                expected: "int".into(),
                found: "string".into()
            })
        );
    }

    #[test]
    fn output_unwraps_unions_and_spells_out_non_finite_floats() {
        let s = schema(r#"{"type": "map", "values": ["null", "float", "double"]}"#);
        let value = Value::map([
            ("a", Value::union(1, Value::Float(0.1))),
            ("b", Value::Double(f64::NAN)),
            ("c", Value::Null),
        ]);
        assert_eq!(
            value_to_json(&value, &s),
            Ok(json!({"a": 0.1, "b": "NaN", "c": null}))
        );
    }

    #[test]
    fn bytes_use_one_char_per_byte() {
        let s = schema(r#"{"type": "fixed", "name": "F", "size": 3}"#);
        let value = value_from_json(&json!("\u{0}\u{ff}a"), &s).unwrap();
        assert_eq!(value, Value::Fixed(vec![0, 255, b'a']));
        assert_eq!(value_to_json(&value, &s), Ok(json!("\u{0}\u{ff}a")));
        assert!(matches!(
            value_from_json(&json!("\u{100}ab"), &s),
            Err(JsonError::Invalid { .. })
        ));
    }
}
