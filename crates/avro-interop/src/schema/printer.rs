//! Schema → Avro JSON.

use std::fmt;

use serde_json::{json, Map, Value as JsonValue};

use super::types::{Name, RecordField, Schema};

impl Schema {
    /// Renders the schema in Avro JSON form.
    ///
    /// Names are printed fully qualified so that the output parses back into
    /// an equal tree regardless of where each definition appears.
    pub fn to_json(&self) -> JsonValue {
        self.to_json_in(None)
    }

    /// `enclosing` is the namespace a parser would apply to an unqualified
    /// definition at this position.
    fn to_json_in(&self, enclosing: Option<&str>) -> JsonValue {
        match self {
            Schema::Null => json!("null"),
            Schema::Boolean => json!("boolean"),
            Schema::Int => json!("int"),
            Schema::Long => json!("long"),
            Schema::Float => json!("float"),
            Schema::Double => json!("double"),
            Schema::Bytes => json!("bytes"),
            Schema::String => json!("string"),
            Schema::Ref(name) => json!(name.fullname()),
            Schema::Array(items) => json!({"type": "array", "items": items.to_json_in(enclosing)}),
            Schema::Map(values) => json!({"type": "map", "values": values.to_json_in(enclosing)}),
            Schema::Union(branches) => {
                JsonValue::Array(branches.iter().map(|b| b.to_json_in(enclosing)).collect())
            }
            Schema::Fixed(fixed) => {
                let mut obj = named("fixed", &fixed.name, enclosing);
                push_aliases(&mut obj, &fixed.aliases);
                obj.insert("size".into(), json!(fixed.size));
                JsonValue::Object(obj)
            }
            Schema::Enum(e) => {
                let mut obj = named("enum", &e.name, enclosing);
                push_doc(&mut obj, e.doc.as_deref());
                push_aliases(&mut obj, &e.aliases);
                obj.insert("symbols".into(), json!(e.symbols));
                if let Some(default) = &e.default {
                    obj.insert("default".into(), json!(default));
                }
                JsonValue::Object(obj)
            }
            Schema::Record(record) => {
                let mut obj = named("record", &record.name, enclosing);
                push_doc(&mut obj, record.doc.as_deref());
                push_aliases(&mut obj, &record.aliases);
                let namespace = record.name.namespace.as_deref();
                let fields = record.fields.iter().map(|f| field_json(f, namespace)).collect();
                obj.insert("fields".into(), JsonValue::Array(fields));
                JsonValue::Object(obj)
            }
        }
    }
}

fn named(kind: &str, name: &Name, enclosing: Option<&str>) -> Map<String, JsonValue> {
    let mut obj = Map::new();
    obj.insert("type".into(), json!(kind));
    obj.insert("name".into(), json!(name.fullname()));
    // A bare name inside a namespaced parent would otherwise pick up the
    // parent's namespace when parsed back.
    if name.namespace.is_none() && enclosing.is_some_and(|ns| !ns.is_empty()) {
        obj.insert("namespace".into(), json!(""));
    }
    obj
}

fn push_doc(obj: &mut Map<String, JsonValue>, doc: Option<&str>) {
    if let Some(doc) = doc {
        obj.insert("doc".into(), json!(doc));
    }
}

fn push_aliases(obj: &mut Map<String, JsonValue>, aliases: &[String]) {
    if !aliases.is_empty() {
        obj.insert("aliases".into(), json!(aliases));
    }
}

fn field_json(field: &RecordField, enclosing: Option<&str>) -> JsonValue {
    let mut obj = Map::new();
    obj.insert("name".into(), json!(field.name));
    obj.insert("type".into(), field.schema.to_json_in(enclosing));
    push_doc(&mut obj, field.doc.as_deref());
    push_aliases(&mut obj, &field.aliases);
    if let Some(default) = &field.default {
        obj.insert("default".into(), default.clone());
    }
    JsonValue::Object(obj)
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
