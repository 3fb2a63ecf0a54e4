//! Named type registry and schema validation.
//!
//! Construction is two-phase: every record/enum/fixed definition in the tree
//! is registered by full name first, then the tree is validated and each
//! [`Schema::Ref`] is checked against the table. References are never
//! followed during registration, so recursive records terminate.

use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::promotion::Kind;

use super::types::{EnumSchema, RecordSchema, Schema};

/// Full name → definition lookup for one schema tree.
#[derive(Debug, Clone, Default)]
pub struct Names<'s> {
    types: HashMap<String, &'s Schema>,
}

impl<'s> Names<'s> {
    /// Registers and validates every named type reachable from `root`.
    pub fn new(root: &'s Schema) -> Result<Self, SchemaError> {
        let mut names = Names::default();
        names.register(root)?;
        names.validate(root)?;
        tracing::trace!(named_types = names.types.len(), "schema names registered");
        Ok(names)
    }

    fn register(&mut self, schema: &'s Schema) -> Result<(), SchemaError> {
        match schema {
            Schema::Record(record) => {
                self.define(&record.name.fullname(), schema)?;
                for field in &record.fields {
                    self.register(&field.schema)?;
                }
            }
            Schema::Enum(e) => self.define(&e.name.fullname(), schema)?,
            Schema::Fixed(f) => self.define(&f.name.fullname(), schema)?,
            Schema::Array(items) => self.register(items)?,
            Schema::Map(values) => self.register(values)?,
            Schema::Union(branches) => {
                for branch in branches {
                    self.register(branch)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn define(&mut self, fullname: &str, schema: &'s Schema) -> Result<(), SchemaError> {
        validate_fullname(fullname)?;
        if self.types.insert(fullname.to_string(), schema).is_some() {
            return Err(SchemaError::DuplicateName(fullname.to_string()));
        }
        Ok(())
    }

    fn validate(&self, schema: &Schema) -> Result<(), SchemaError> {
        match schema {
            Schema::Ref(name) => {
                self.lookup(&name.fullname())?;
            }
            Schema::Record(record) => self.validate_record(record)?,
            Schema::Enum(e) => validate_enum(e)?,
            Schema::Array(items) => self.validate(items)?,
            Schema::Map(values) => self.validate(values)?,
            Schema::Union(branches) => self.validate_union(branches)?,
            _ => {}
        }
        Ok(())
    }

    fn validate_record(&self, record: &RecordSchema) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(record.fields.len());
        for field in &record.fields {
            validate_simple_name(&field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    record: record.name.fullname(),
                    field: field.name.clone(),
                });
            }
            self.validate(&field.schema)?;
        }
        Ok(())
    }

    fn validate_union(&self, branches: &[Schema]) -> Result<(), SchemaError> {
        if branches.is_empty() {
            return Err(SchemaError::EmptyUnion);
        }
        let mut keys = HashSet::with_capacity(branches.len());
        for branch in branches {
            let resolved = self.resolve(branch)?;
            if matches!(resolved, Schema::Union(_)) {
                return Err(SchemaError::NestedUnion);
            }
            // Named branches are distinguished by full name, the rest by kind.
            let key = resolved.type_name();
            if !keys.insert(key.clone()) {
                return Err(SchemaError::DuplicateUnionBranch(key));
            }
            self.validate(branch)?;
        }
        Ok(())
    }

    fn lookup(&self, fullname: &str) -> Result<&'s Schema, SchemaError> {
        self.types
            .get(fullname)
            .copied()
            .ok_or_else(|| SchemaError::UnresolvedReference(fullname.to_string()))
    }

    /// Follows a [`Schema::Ref`] to its definition; other nodes are returned
    /// unchanged.
    pub fn resolve<'a>(&self, schema: &'a Schema) -> Result<&'a Schema, SchemaError>
    where
        's: 'a,
    {
        match schema {
            Schema::Ref(name) => self.lookup(&name.fullname()),
            other => Ok(other),
        }
    }

    /// Kind of `schema` after resolving references.
    pub fn kind_of(&self, schema: &Schema) -> Result<Kind, SchemaError> {
        let resolved = match schema {
            Schema::Ref(name) => self.lookup(&name.fullname())?,
            other => other,
        };
        resolved
            .kind()
            .ok_or_else(|| SchemaError::UnresolvedReference(resolved.type_name()))
    }

    /// Whether `null` is an acceptable value for `schema`.
    pub fn admits_null(&self, schema: &Schema) -> Result<bool, SchemaError> {
        Ok(match self.resolve(schema)? {
            Schema::Null => true,
            Schema::Union(branches) => branches.iter().any(|b| matches!(b, Schema::Null)),
            _ => false,
        })
    }

    /// Definition registered under `fullname`.
    pub fn get(&self, fullname: &str) -> Option<&'s Schema> {
        self.types.get(fullname).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn validate_enum(e: &EnumSchema) -> Result<(), SchemaError> {
    if e.symbols.is_empty() {
        return Err(SchemaError::EmptyEnum(e.name.fullname()));
    }
    let mut seen = HashSet::with_capacity(e.symbols.len());
    for symbol in &e.symbols {
        validate_simple_name(symbol)?;
        if !seen.insert(symbol.as_str()) {
            return Err(SchemaError::DuplicateSymbol {
                name: e.name.fullname(),
                symbol: symbol.clone(),
            });
        }
    }
    if let Some(default) = &e.default {
        if !seen.contains(default.as_str()) {
            return Err(SchemaError::UnknownDefaultSymbol {
                name: e.name.fullname(),
                symbol: default.clone(),
            });
        }
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn validate_simple_name(name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()))
    }
}

pub(crate) fn validate_fullname(fullname: &str) -> Result<(), SchemaError> {
    for segment in fullname.split('.') {
        validate_simple_name(segment).map_err(|_| SchemaError::InvalidName(fullname.to_string()))?;
    }
    Ok(())
}
