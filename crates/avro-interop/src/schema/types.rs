//! Schema tree definitions.

use std::fmt;

use crate::promotion::Kind;

/// Name of a record, enum or fixed type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    pub name: String,
    pub namespace: Option<String>,
}

impl Name {
    /// Parses a possibly dotted name: `"a.b.C"` has namespace `a.b`.
    pub fn new(full: &str) -> Self {
        match full.rsplit_once('.') {
            Some((ns, name)) => Self {
                name: name.to_string(),
                namespace: Some(ns.to_string()),
            },
            None => Self {
                name: full.to_string(),
                namespace: None,
            },
        }
    }

    pub fn with_namespace(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: (!namespace.is_empty()).then(|| namespace.to_string()),
        }
    }

    /// `namespace.name`, or just `name` without a namespace.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.name),
            _ => self.name.clone(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname())
    }
}

/// A field of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub schema: Schema,
    /// Declared default, kept as raw JSON.
    pub default: Option<serde_json::Value>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
}

impl RecordField {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            doc: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: Name,
    pub fields: Vec<RecordField>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: Name,
    pub symbols: Vec<String>,
    pub default: Option<String>,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: Name,
    pub size: usize,
    pub aliases: Vec<String>,
}

/// Schema tree.
///
/// Named types are defined inline at their first occurrence; every other
/// occurrence (including self references) is a [`Schema::Ref`] resolved
/// through [`Names`](super::Names).
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Fixed(FixedSchema),
    Enum(EnumSchema),
    Array(Box<Schema>),
    Map(Box<Schema>),
    Record(RecordSchema),
    Union(Vec<Schema>),
    Ref(Name),
}

impl Schema {
    pub fn array(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    pub fn map(values: Schema) -> Self {
        Schema::Map(Box::new(values))
    }

    pub fn record(name: &str, fields: Vec<RecordField>) -> Self {
        Schema::Record(RecordSchema {
            name: Name::new(name),
            fields,
            doc: None,
            aliases: Vec::new(),
        })
    }

    pub fn enumeration(name: &str, symbols: &[&str]) -> Self {
        Schema::Enum(EnumSchema {
            name: Name::new(name),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            default: None,
            doc: None,
            aliases: Vec::new(),
        })
    }

    pub fn fixed(name: &str, size: usize) -> Self {
        Schema::Fixed(FixedSchema {
            name: Name::new(name),
            size,
            aliases: Vec::new(),
        })
    }

    pub fn reference(name: &str) -> Self {
        Schema::Ref(Name::new(name))
    }

    /// Kind of this node; `None` for an unresolved [`Schema::Ref`].
    pub fn kind(&self) -> Option<Kind> {
        let kind = match self {
            Schema::Null => Kind::Null,
            Schema::Boolean => Kind::Boolean,
            Schema::Int => Kind::Int,
            Schema::Long => Kind::Long,
            Schema::Float => Kind::Float,
            Schema::Double => Kind::Double,
            Schema::Bytes => Kind::Bytes,
            Schema::String => Kind::String,
            Schema::Fixed(_) => Kind::Fixed,
            Schema::Enum(_) => Kind::Enum,
            Schema::Array(_) => Kind::Array,
            Schema::Map(_) => Kind::Map,
            Schema::Record(_) => Kind::Record,
            Schema::Union(_) => Kind::Union,
            Schema::Ref(_) => return None,
        };
        Some(kind)
    }

    /// Name of a named type definition or reference.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Record(r) => Some(&r.name),
            Schema::Enum(e) => Some(&e.name),
            Schema::Fixed(f) => Some(&f.name),
            Schema::Ref(name) => Some(name),
            _ => None,
        }
    }

    /// Human readable type name: the full name for named types, the kind
    /// otherwise.
    pub fn type_name(&self) -> String {
        match (self.name(), self.kind()) {
            (Some(name), _) => name.fullname(),
            (None, Some(kind)) => kind.as_str().to_string(),
            (None, None) => String::new(),
        }
    }

    /// Schema for a primitive type name, if `name` is one.
    pub fn primitive(name: &str) -> Option<Schema> {
        let schema = match name {
            "null" => Schema::Null,
            "boolean" => Schema::Boolean,
            "int" => Schema::Int,
            "long" => Schema::Long,
            "float" => Schema::Float,
            "double" => Schema::Double,
            "bytes" => Schema::Bytes,
            "string" => Schema::String,
            _ => return None,
        };
        Some(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_name_splits_on_last_dot() {
        let name = Name::new("org.apache.avro.Interop");
        assert_eq!(name.name, "Interop");
        assert_eq!(name.namespace.as_deref(), Some("org.apache.avro"));
        assert_eq!(name.fullname(), "org.apache.avro.Interop");
        assert_eq!(Name::new("Node").fullname(), "Node");
        assert_eq!(Name::with_namespace("Node", "").namespace, None);
    }

    #[test]
    fn structural_equality() {
        let a = Schema::array(Schema::map(Schema::Long));
        let b = Schema::array(Schema::map(Schema::Long));
        assert_eq!(a, b);
        assert_ne!(a, Schema::array(Schema::map(Schema::Int)));
        assert_ne!(Schema::fixed("MD5", 16), Schema::fixed("MD5", 8));
    }

    #[test]
    fn type_names() {
        assert_eq!(Schema::Int.type_name(), "int");
        assert_eq!(Schema::fixed("a.MD5", 16).type_name(), "a.MD5");
        assert_eq!(Schema::reference("Node").type_name(), "Node");
        assert_eq!(Schema::Union(vec![]).type_name(), "union");
        assert_eq!(Schema::reference("Node").kind(), None);
    }
}
