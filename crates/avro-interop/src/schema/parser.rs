//! Avro JSON schema parsing.
//!
//! Parsing is two-phase. The first pass walks the JSON and collects the full
//! name of every record/enum/fixed definition, so that forward and
//! self-references resolve in the second pass, which builds the [`Schema`]
//! tree. Named types become inline definitions at their first occurrence
//! and [`Schema::Ref`] everywhere else.

use std::collections::HashSet;
use std::str::FromStr;

use serde_json::{Map, Value as JsonValue};

use crate::error::SchemaError;

use super::names::{validate_simple_name, Names};
use super::types::{EnumSchema, FixedSchema, Name, RecordField, RecordSchema, Schema};

impl Schema {
    /// Parses and validates an Avro JSON schema definition.
    pub fn parse(text: &str) -> Result<Schema, SchemaError> {
        let json: JsonValue =
            serde_json::from_str(text).map_err(|e| SchemaError::Json(e.to_string()))?;
        Schema::from_json(&json)
    }

    /// Builds and validates a schema from already-parsed JSON.
    pub fn from_json(json: &JsonValue) -> Result<Schema, SchemaError> {
        let mut defined = HashSet::new();
        collect_definitions(json, None, &mut defined)?;
        let parser = Parser { defined };
        let schema = parser.build(json, None)?;
        Names::new(&schema)?;
        tracing::debug!(schema = %schema.type_name(), "parsed schema");
        Ok(schema)
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Schema::parse(s)
    }
}

fn is_named_type(t: &str) -> bool {
    matches!(t, "record" | "error" | "enum" | "fixed")
}

fn type_name_of(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Name of a named type definition, applying the enclosing namespace.
fn definition_name(
    obj: &Map<String, JsonValue>,
    enclosing: Option<&str>,
) -> Result<Name, SchemaError> {
    let name = match obj.get("name") {
        Some(JsonValue::String(name)) => name,
        Some(other) => {
            return Err(SchemaError::InvalidAttribute {
                attr: "name",
                context: "named type".to_string(),
                reason: format!("expected string, found {}", type_name_of(other)),
            })
        }
        None => {
            return Err(SchemaError::MissingAttribute {
                attr: "name",
                context: "named type".to_string(),
            })
        }
    };
    if name.contains('.') {
        return Ok(Name::new(name));
    }
    let namespace = match obj.get("namespace") {
        Some(JsonValue::String(ns)) => Some(ns.as_str()),
        Some(JsonValue::Null) | None => enclosing,
        Some(other) => {
            return Err(SchemaError::InvalidAttribute {
                attr: "namespace",
                context: name.clone(),
                reason: format!("expected string, found {}", type_name_of(other)),
            })
        }
    };
    Ok(match namespace {
        Some(ns) => Name::with_namespace(name, ns),
        None => Name::new(name),
    })
}

/// First pass: register the full name of every named type definition.
fn collect_definitions(
    json: &JsonValue,
    namespace: Option<&str>,
    defined: &mut HashSet<String>,
) -> Result<(), SchemaError> {
    match json {
        JsonValue::Array(branches) => {
            for branch in branches {
                collect_definitions(branch, namespace, defined)?;
            }
        }
        JsonValue::Object(obj) => match obj.get("type") {
            Some(JsonValue::String(t)) if is_named_type(t) => {
                let name = definition_name(obj, namespace)?;
                let fullname = name.fullname();
                if !defined.insert(fullname.clone()) {
                    return Err(SchemaError::DuplicateName(fullname));
                }
                if let Some(JsonValue::Array(fields)) = obj.get("fields") {
                    for field in fields {
                        if let Some(field_type) = field.get("type") {
                            collect_definitions(field_type, name.namespace.as_deref(), defined)?;
                        }
                    }
                }
            }
            Some(JsonValue::String(t)) if t == "array" => {
                if let Some(items) = obj.get("items") {
                    collect_definitions(items, namespace, defined)?;
                }
            }
            Some(JsonValue::String(t)) if t == "map" => {
                if let Some(values) = obj.get("values") {
                    collect_definitions(values, namespace, defined)?;
                }
            }
            Some(nested @ (JsonValue::Object(_) | JsonValue::Array(_))) => {
                collect_definitions(nested, namespace, defined)?;
            }
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

/// Second pass: build the schema tree.
struct Parser {
    defined: HashSet<String>,
}

impl Parser {
    fn build(&self, json: &JsonValue, namespace: Option<&str>) -> Result<Schema, SchemaError> {
        match json {
            JsonValue::String(name) => self.named_or_primitive(name, namespace),
            JsonValue::Array(branches) => {
                let branches = branches
                    .iter()
                    .map(|b| self.build(b, namespace))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Schema::Union(branches))
            }
            JsonValue::Object(obj) => self.build_object(obj, namespace),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }

    fn named_or_primitive(&self, name: &str, namespace: Option<&str>) -> Result<Schema, SchemaError> {
        if let Some(primitive) = Schema::primitive(name) {
            return Ok(primitive);
        }
        self.reference(name, namespace)
    }

    fn reference(&self, name: &str, namespace: Option<&str>) -> Result<Schema, SchemaError> {
        if !name.contains('.') {
            if let Some(ns) = namespace.filter(|ns| !ns.is_empty()) {
                let qualified = format!("{ns}.{name}");
                if self.defined.contains(&qualified) {
                    return Ok(Schema::Ref(Name::new(&qualified)));
                }
            }
        }
        if self.defined.contains(name) {
            return Ok(Schema::Ref(Name::new(name)));
        }
        Err(SchemaError::UnknownType(name.to_string()))
    }

    fn build_object(
        &self,
        obj: &Map<String, JsonValue>,
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaError> {
        let type_attr = obj.get("type").ok_or_else(|| SchemaError::MissingAttribute {
            attr: "type",
            context: JsonValue::Object(obj.clone()).to_string(),
        })?;
        let t = match type_attr {
            JsonValue::String(t) => t.as_str(),
            nested @ (JsonValue::Object(_) | JsonValue::Array(_)) => {
                return self.build(nested, namespace)
            }
            other => return Err(SchemaError::UnknownType(other.to_string())),
        };
        match t {
            "record" | "error" => self.build_record(obj, namespace),
            "enum" => build_enum(obj, namespace),
            "fixed" => build_fixed(obj, namespace),
            "array" => {
                let items = required(obj, "items", "array")?;
                Ok(Schema::array(self.build(items, namespace)?))
            }
            "map" => {
                let values = required(obj, "values", "map")?;
                Ok(Schema::map(self.build(values, namespace)?))
            }
            // Primitive in object form; logicalType and friends are ignored.
            other => self.named_or_primitive(other, namespace),
        }
    }

    fn build_record(
        &self,
        obj: &Map<String, JsonValue>,
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaError> {
        let name = definition_name(obj, namespace)?;
        let context = name.fullname();
        let fields_json = match required(obj, "fields", &context)? {
            JsonValue::Array(fields) => fields,
            other => return Err(invalid("fields", &context, "array", other)),
        };
        let mut fields = Vec::with_capacity(fields_json.len());
        for field in fields_json {
            let field = match field {
                JsonValue::Object(field) => field,
                other => return Err(invalid("fields", &context, "object", other)),
            };
            let field_name = match required(field, "name", &context)? {
                JsonValue::String(n) => n.clone(),
                other => return Err(invalid("name", &context, "string", other)),
            };
            validate_simple_name(&field_name)?;
            let field_type = required(field, "type", &format!("{context}.{field_name}"))?;
            fields.push(RecordField {
                schema: self.build(field_type, name.namespace.as_deref())?,
                default: field.get("default").cloned(),
                doc: optional_string(field, "doc"),
                aliases: string_list(field, "aliases", &context)?,
                name: field_name,
            });
        }
        Ok(Schema::Record(RecordSchema {
            doc: optional_string(obj, "doc"),
            aliases: string_list(obj, "aliases", &context)?,
            name,
            fields,
        }))
    }
}

fn build_enum(obj: &Map<String, JsonValue>, namespace: Option<&str>) -> Result<Schema, SchemaError> {
    let name = definition_name(obj, namespace)?;
    let context = name.fullname();
    let symbols = match required(obj, "symbols", &context)? {
        JsonValue::Array(_) => string_list(obj, "symbols", &context)?,
        other => return Err(invalid("symbols", &context, "array", other)),
    };
    let default = match obj.get("default") {
        Some(JsonValue::String(s)) => Some(s.clone()),
        None | Some(JsonValue::Null) => None,
        Some(other) => return Err(invalid("default", &context, "string", other)),
    };
    Ok(Schema::Enum(EnumSchema {
        doc: optional_string(obj, "doc"),
        aliases: string_list(obj, "aliases", &context)?,
        name,
        symbols,
        default,
    }))
}

fn build_fixed(obj: &Map<String, JsonValue>, namespace: Option<&str>) -> Result<Schema, SchemaError> {
    let name = definition_name(obj, namespace)?;
    let context = name.fullname();
    let size = required(obj, "size", &context)?;
    let size = size
        .as_u64()
        .and_then(|s| usize::try_from(s).ok())
        .ok_or_else(|| invalid("size", &context, "non-negative integer", size))?;
    Ok(Schema::Fixed(FixedSchema {
        aliases: string_list(obj, "aliases", &context)?,
        name,
        size,
    }))
}

fn required<'a>(
    obj: &'a Map<String, JsonValue>,
    attr: &'static str,
    context: &str,
) -> Result<&'a JsonValue, SchemaError> {
    obj.get(attr).ok_or_else(|| SchemaError::MissingAttribute {
        attr,
        context: context.to_string(),
    })
}

fn invalid(attr: &'static str, context: &str, expected: &str, found: &JsonValue) -> SchemaError {
    SchemaError::InvalidAttribute {
        attr,
        context: context.to_string(),
        reason: format!("expected {expected}, found {}", type_name_of(found)),
    }
}

fn optional_string(obj: &Map<String, JsonValue>, attr: &str) -> Option<String> {
    obj.get(attr).and_then(JsonValue::as_str).map(str::to_string)
}

fn string_list(
    obj: &Map<String, JsonValue>,
    attr: &'static str,
    context: &str,
) -> Result<Vec<String>, SchemaError> {
    match obj.get(attr) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => Ok(s.clone()),
                other => Err(invalid(attr, context, "string", other)),
            })
            .collect(),
        Some(other) => Err(invalid(attr, context, "array", other)),
    }
}
