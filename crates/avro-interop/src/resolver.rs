//! Union branch selection.
//!
//! For a bare value the branch is chosen in two passes over the declared
//! branches: first an exact kind match (with a structural fit check for
//! named types), then the first branch the value can be promoted into.

use crate::error::EncodeError;
use crate::promotion::promotable;
use crate::schema::{Names, Schema};
use crate::value::Value;

/// Picks the union branch `value` is written as.
///
/// A [`Value::Union`] names its branch explicitly and is only range
/// checked.
pub fn select_branch(value: &Value, branches: &[Schema], names: &Names) -> Result<usize, EncodeError> {
    if let Value::Union { index, .. } = value {
        if *index >= branches.len() {
            return Err(EncodeError::InvalidUnionBranch {
                index: *index,
                branches: branches.len(),
            });
        }
        return Ok(*index);
    }

    for (i, branch) in branches.iter().enumerate() {
        if matches_exactly(value, names.resolve(branch)?) {
            tracing::trace!(kind = %value.kind(), branch = i, "union branch by exact match");
            return Ok(i);
        }
    }

    let kind = value.kind();
    for (i, branch) in branches.iter().enumerate() {
        let target = names.kind_of(branch)?;
        if target != kind && promotable(kind, target) {
            tracing::trace!(%kind, %target, branch = i, "union branch by promotion");
            return Ok(i);
        }
    }

    Err(EncodeError::NoMatchingUnionBranch {
        kind,
        branches: branches.iter().map(Schema::type_name).collect(),
    })
}

/// Whether `value` has the kind of `schema` and fits its shape.
///
/// `schema` must already be resolved.
pub fn matches_exactly(value: &Value, schema: &Schema) -> bool {
    if schema.kind() != Some(value.kind()) {
        return false;
    }
    match (value, schema) {
        (Value::Record(fields), Schema::Record(record)) => fields
            .iter()
            .all(|(name, _)| record.fields.iter().any(|f| &f.name == name)),
        (Value::Enum(ordinal), Schema::Enum(e)) => *ordinal < e.symbols.len(),
        (Value::Fixed(bytes), Schema::Fixed(fixed)) => bytes.len() == fixed.size,
        _ => true,
    }
}
