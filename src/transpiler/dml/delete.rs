//! DELETE SQL generation.

use tracing::warn;

use crate::ast::*;
use crate::error::RelqResult;
use crate::transpiler::Compiler;
use crate::transpiler::clauses;
use crate::transpiler::conditions::ConditionCompiler;

pub fn build_delete(compiler: &Compiler, query: &Query) -> RelqResult<String> {
    let target = compiler.target(query)?;
    let mut sql = format!("DELETE FROM {}", clauses::source(compiler, target.model));

    let guard = super::guard(query, &target);
    let conditions = ConditionCompiler::new(compiler, &target, Some(target.model.name.as_str()), 0);
    match conditions.compile_where(guard.as_deref())? {
        Some(where_clause) => {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        None => warn!(
            model = %target.model.name,
            "DELETE without conditions or primary key removes every row"
        ),
    }

    Ok(sql)
}
