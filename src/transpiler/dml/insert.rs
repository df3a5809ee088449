//! INSERT SQL generation.

use crate::ast::*;
use crate::error::RelqResult;
use crate::transpiler::Compiler;

pub fn build_insert(compiler: &Compiler, query: &Query) -> RelqResult<String> {
    let target = compiler.target(query)?;
    let payload = super::payload(query, &target)?;

    let mut columns = Vec::with_capacity(payload.len());
    let mut values = Vec::with_capacity(payload.len());
    for (field, value) in payload {
        columns.push(compiler.quote(field));
        values.push(super::write_literal(compiler, &target, field, value)?);
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        compiler.quote(&target.model.source),
        columns.join(", "),
        values.join(", ")
    ))
}
