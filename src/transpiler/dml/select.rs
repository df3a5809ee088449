//! SELECT SQL generation.

use crate::ast::*;
use crate::error::RelqResult;
use crate::transpiler::Compiler;
use crate::transpiler::clauses;
use crate::transpiler::conditions::ConditionCompiler;

/// Render a read without the trailing `;`, so it can also be embedded as a
/// sub-query. `depth` counts enclosing queries.
pub fn build_select(compiler: &Compiler, query: &Query, depth: usize) -> RelqResult<String> {
    compiler.check_depth(depth)?;
    let target = compiler.target(query)?;

    let mut sql = format!(
        "SELECT {} FROM {}",
        clauses::fields(query),
        clauses::source(compiler, target.model)
    );

    for join in clauses::joins(compiler, query, depth)? {
        sql.push(' ');
        sql.push_str(&join);
    }

    let conditions =
        ConditionCompiler::new(compiler, &target, Some(target.model.name.as_str()), depth);
    if let Some(where_clause) = conditions.compile_where(query.conditions.as_ref())? {
        sql.push(' ');
        sql.push_str(&where_clause);
    }

    if let Some(order) = clauses::order(compiler, &target, &query.order) {
        sql.push(' ');
        sql.push_str(&order);
    }

    if let Some(limit) = clauses::limit(query) {
        sql.push(' ');
        sql.push_str(&limit);
    }

    Ok(sql)
}
