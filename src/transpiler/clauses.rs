//! Clause assemblers shared by the statement builders.

use crate::ast::*;
use crate::error::{RelqError, RelqResult};
use crate::transpiler::{Compiler, Target};

/// Selected fields, emitted as written. No fields selects `*`.
pub fn fields(query: &Query) -> String {
    if query.fields.is_empty() {
        "*".to_string()
    } else {
        query.fields.join(", ")
    }
}

/// `{table} AS {alias}`
pub fn source(compiler: &Compiler, model: &EntityRef) -> String {
    format!(
        "{} AS {}",
        compiler.quote(&model.source),
        compiler.quote(&model.name)
    )
}

/// Join clauses in declaration order. A join's own joins follow it.
pub fn joins(compiler: &Compiler, query: &Query, depth: usize) -> RelqResult<Vec<String>> {
    let mut clauses = Vec::with_capacity(query.joins.len());
    for join in &query.joins {
        compiler.check_depth(depth + 1)?;
        let model = join.model.as_ref().ok_or_else(|| {
            RelqError::MissingTarget("join has no model".to_string())
        })?;

        let keyword = match join.join_kind {
            Some(JoinKind::Inner) => "INNER JOIN",
            Some(JoinKind::Left) => "LEFT JOIN",
            Some(JoinKind::Right) => "RIGHT JOIN",
            None => "JOIN",
        };
        let mut clause = format!("{keyword} {}", source(compiler, model));
        match join.constraint.as_deref().map(str::trim) {
            Some(constraint) if !constraint.is_empty() => {
                clause.push_str(" ON ");
                clause.push_str(constraint);
            }
            _ => {}
        }
        clauses.push(clause);
        clauses.extend(joins(compiler, join, depth + 1)?);
    }
    Ok(clauses)
}

/// `ORDER BY ...`; schema fields are prefixed with the target alias.
pub(crate) fn order(compiler: &Compiler, target: &Target<'_>, specs: &[OrderSpec]) -> Option<String> {
    if specs.is_empty() {
        return None;
    }
    let generator = compiler.generator();
    let terms: Vec<String> = specs
        .iter()
        .map(|spec| {
            let field = if target.is_known(&spec.field) {
                format!(
                    "{}.{}",
                    generator.quote_identifier(&target.model.name),
                    generator.quote_identifier(&spec.field)
                )
            } else {
                spec.field.clone()
            };
            format!("{field} {}", spec.direction.as_sql())
        })
        .collect();
    Some(format!("ORDER BY {}", terms.join(", ")))
}

/// `LIMIT n` and `OFFSET m`, each only when positive.
pub fn limit(query: &Query) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(n) = query.limit.filter(|n| *n > 0) {
        parts.push(format!("LIMIT {n}"));
    }
    if let Some(m) = query.offset.filter(|m| *m > 0) {
        parts.push(format!("OFFSET {m}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}
