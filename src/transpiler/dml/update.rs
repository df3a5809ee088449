//! UPDATE SQL generation.

use tracing::warn;

use crate::ast::*;
use crate::error::RelqResult;
use crate::transpiler::Compiler;
use crate::transpiler::conditions::ConditionCompiler;

pub fn build_update(compiler: &Compiler, query: &Query) -> RelqResult<String> {
    let target = compiler.target(query)?;
    let payload = super::payload(query, &target)?;

    let assignments = payload
        .iter()
        .map(|(field, value)| {
            let literal = super::write_literal(compiler, &target, field, value)?;
            Ok(format!("{} = {}", compiler.quote(field), literal))
        })
        .collect::<RelqResult<Vec<_>>>()?;

    let mut sql = format!(
        "UPDATE {} SET {}",
        compiler.quote(&target.model.source),
        assignments.join(", ")
    );

    // UPDATE has no alias to prefix fields with.
    let guard = super::guard(query, &target);
    match ConditionCompiler::new(compiler, &target, None, 0).compile_where(guard.as_deref())? {
        Some(where_clause) => {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        None => warn!(
            model = %target.model.name,
            "UPDATE without conditions or primary key affects every row"
        ),
    }

    Ok(sql)
}
