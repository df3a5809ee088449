//! WHERE clause generation.

use crate::ast::*;
use crate::error::{RelqError, RelqResult};
use crate::transpiler::dml::select::build_select;
use crate::transpiler::traits::is_identifier_path;
use crate::transpiler::{Compiler, Target};

/// Compiles a [`ConditionExpr`] tree against one target model.
pub(crate) struct ConditionCompiler<'a, 'q> {
    compiler: &'a Compiler,
    target: &'a Target<'q>,
    /// Alias that schema fields are prefixed with; `None` for UPDATE.
    alias: Option<&'a str>,
    depth: usize,
}

impl<'a, 'q> ConditionCompiler<'a, 'q> {
    pub fn new(
        compiler: &'a Compiler,
        target: &'a Target<'q>,
        alias: Option<&'a str>,
        depth: usize,
    ) -> Self {
        Self {
            compiler,
            target,
            alias,
            depth,
        }
    }

    /// Render `WHERE ...`, or `None` when there is nothing to filter on.
    pub fn compile_where(&self, expr: Option<&ConditionExpr>) -> RelqResult<Option<String>> {
        let Some(expr) = expr else {
            return Ok(None);
        };

        let body = match expr {
            ConditionExpr::Raw(sql) => raw(sql),
            ConditionExpr::Leaf(leaf) => Some(self.render_leaf(leaf, &leaf.field)?),
            // The outermost group is the implicit conjunction: no parentheses.
            // A lone leaf keeps its field exactly as written.
            ConditionExpr::Group { boolean, children } => match children.as_slice() {
                [ConditionExpr::Leaf(leaf)] => Some(self.render_leaf(leaf, &leaf.field)?),
                _ => self.join(*boolean, children)?,
            },
        };

        Ok(body.map(|sql| format!("WHERE {sql}")))
    }

    /// Render a nested expression. Groups get exactly one pair of parentheses.
    fn compile(&self, expr: &ConditionExpr) -> RelqResult<Option<String>> {
        match expr {
            ConditionExpr::Raw(sql) => Ok(raw(sql)),
            ConditionExpr::Leaf(leaf) => {
                let column = self.column(&leaf.field);
                self.render_leaf(leaf, &column).map(Some)
            }
            ConditionExpr::Group { boolean, children } => {
                Ok(self.join(*boolean, children)?.map(|sql| format!("({sql})")))
            }
        }
    }

    /// Join the surviving fragments of a group. Raw SQL next to other
    /// fragments is parenthesized so its own AND/OR cannot leak.
    fn join(&self, boolean: BoolOp, children: &[ConditionExpr]) -> RelqResult<Option<String>> {
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            if let Some(sql) = self.compile(child)? {
                parts.push((sql, matches!(child, ConditionExpr::Raw(_))));
            }
        }
        match parts.as_slice() {
            [] => Ok(None),
            [(sql, _)] => Ok(Some(sql.clone())),
            _ => Ok(Some(
                parts
                    .into_iter()
                    .map(|(sql, raw)| if raw { format!("({sql})") } else { sql })
                    .collect::<Vec<_>>()
                    .join(boolean.joiner()),
            )),
        }
    }

    /// Field reference inside a condition: schema fields are alias-prefixed,
    /// other identifiers quoted, expressions left alone.
    fn column(&self, field: &str) -> String {
        let generator = self.compiler.generator();
        match self.alias {
            Some(alias) if self.target.is_known(field) => format!(
                "{}.{}",
                generator.quote_identifier(alias),
                generator.quote_identifier(field)
            ),
            _ if is_identifier_path(field) => self.compiler.quote(field),
            _ => field.to_string(),
        }
    }

    fn render_leaf(&self, leaf: &Leaf, column: &str) -> RelqResult<String> {
        let field = leaf.field.as_str();
        let sql = match (&leaf.value, leaf.op) {
            (Value::Query(sub), Operator::Eq) => format!("{column} IN ({})", self.subquery(sub)?),
            (Value::Query(sub), Operator::Ne) => {
                format!("{column} NOT IN ({})", self.subquery(sub)?)
            }
            (Value::Query(_), op) => {
                return Err(RelqError::InvalidOperator(format!(
                    "{op} cannot compare '{field}' with a sub-query"
                )));
            }

            (Value::List(items), Operator::Between) if items.len() == 2 => format!(
                "{column} BETWEEN {} AND {}",
                self.literal(field, &items[0])?,
                self.literal(field, &items[1])?
            ),
            (value, Operator::Between) => {
                let count = match value {
                    Value::List(items) => items.len(),
                    _ => 1,
                };
                return Err(RelqError::MalformedBetween {
                    field: field.to_string(),
                    count,
                });
            }

            (Value::Null, Operator::Eq) => format!("{column} IS NULL"),
            (Value::Null, Operator::Ne) => format!("{column} IS NOT NULL"),

            // IN () is not valid SQL
            (Value::List(items), Operator::Eq) if items.is_empty() => "1 = 0".to_string(),
            (Value::List(items), Operator::Ne) if items.is_empty() => "1 = 1".to_string(),
            (value @ Value::List(_), Operator::Eq) => {
                format!("{column} IN ({})", self.literal(field, value)?)
            }
            (value @ Value::List(_), Operator::Ne) => {
                format!("{column} NOT IN ({})", self.literal(field, value)?)
            }
            (Value::List(_), op) => {
                return Err(RelqError::InvalidCondition(format!(
                    "operator {op} does not accept a list for '{field}'"
                )));
            }

            (value, op) => format!("{column} {} {}", op.as_sql(), self.literal(field, value)?),
        };
        Ok(sql)
    }

    fn literal(&self, field: &str, value: &Value) -> RelqResult<String> {
        self.compiler
            .caster()
            .cast(value, self.target.type_of(field))
            .map_err(|source| RelqError::cast(field, source))
    }

    fn subquery(&self, sub: &Query) -> RelqResult<String> {
        build_select(self.compiler, sub, self.depth + 1)
    }
}

fn raw(sql: &str) -> Option<String> {
    let sql = sql.trim();
    if sql.is_empty() {
        None
    } else {
        Some(sql.to_string())
    }
}
