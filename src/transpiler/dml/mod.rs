//! Statement builders, one per query kind.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::ast::*;
use crate::error::{CastError, RelqError, RelqResult};
use crate::transpiler::{Compiler, Target};

/// The non-empty payload of a create/update.
fn payload<'q>(query: &'q Query, target: &Target<'q>) -> RelqResult<&'q IndexMap<String, Value>> {
    query
        .payload
        .as_ref()
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| RelqError::EmptyPayload(format!("{} on {}", query.kind, target.model.name)))
}

/// Literal for a written value. Only scalars can be stored.
fn write_literal(
    compiler: &Compiler,
    target: &Target<'_>,
    field: &str,
    value: &Value,
) -> RelqResult<String> {
    let tag = target.type_of(field);
    match value {
        Value::List(_) | Value::Query(_) => Err(RelqError::cast(
            field,
            CastError::new(tag, value.to_string()),
        )),
        scalar => compiler
            .caster()
            .cast(scalar, tag)
            .map_err(|source| RelqError::cast(field, source)),
    }
}

/// Conditions for an UPDATE/DELETE. Without any, falls back to the primary
/// key equality taken from the payload, so a keyed write never touches more
/// than its own row.
fn guard<'q>(query: &'q Query, target: &Target<'q>) -> Option<Cow<'q, ConditionExpr>> {
    match &query.conditions {
        Some(conditions) if !is_blank(conditions) => Some(Cow::Borrowed(conditions)),
        _ => {
            let key = &target.model.key;
            let value = query.payload.as_ref()?.get(key)?;
            Some(Cow::Owned(ConditionExpr::eq(key.clone(), value.clone())))
        }
    }
}

fn is_blank(expr: &ConditionExpr) -> bool {
    match expr {
        ConditionExpr::Leaf(_) => false,
        ConditionExpr::Raw(sql) => sql.trim().is_empty(),
        ConditionExpr::Group { children, .. } => children.iter().all(is_blank),
    }
}
