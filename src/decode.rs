//! Row decoding: raw backend values back into typed [`Value`]s.
//!
//! The inverse of the value caster. A transport hands over rows as JSON
//! scalars (text, numbers, booleans); the model's [`SchemaInfo`] says what
//! each column should become. Columns the schema does not declare are passed
//! through as they came.

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::ast::Value;
use crate::error::{CastError, RelqError, RelqResult};
use crate::parser::literals::{parse_literal, Literal, Number};
use crate::schema::{SchemaInfo, TypeTag};
use crate::transpiler::caster::{coerce, ValueCaster};

/// Decode one raw column value.
pub fn decode_value(raw: &Json, tag: TypeTag) -> Result<Value, CastError> {
    let value = match raw {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        // json/array columns stay text
        other => Value::String(other.to_string()),
    };
    coerce(&value, tag)
}

/// Parse a SQL literal (`NULL`, `42`, `'it''s'`) into a value of type `tag`.
pub fn decode_literal(text: &str, tag: TypeTag) -> Result<Value, CastError> {
    let value = match parse_literal(text) {
        Some(Literal::Null) => Value::Null,
        Some(Literal::Number(Number::Int(n))) => Value::Int(n),
        Some(Literal::Number(Number::Float(n))) => Value::Float(n),
        Some(Literal::String(s)) => Value::String(s),
        None => return Err(CastError::new(tag, text)),
    };
    coerce(&value, tag)
}

impl ValueCaster<'_> {
    /// Inverse of [`ValueCaster::cast`] for scalar literals.
    pub fn decode_literal(&self, text: &str, tag: TypeTag) -> Result<Value, CastError> {
        decode_literal(text, tag)
    }
}

/// Decodes whole rows against one model's schema.
#[derive(Debug, Clone, Copy)]
pub struct RowDecoder<'s> {
    schema: &'s SchemaInfo,
}

impl<'s> RowDecoder<'s> {
    pub fn new(schema: &'s SchemaInfo) -> Self {
        Self { schema }
    }

    pub fn decode_row(&self, row: &IndexMap<String, Json>) -> RelqResult<IndexMap<String, Value>> {
        row.iter()
            .map(|(column, raw)| {
                decode_value(raw, self.schema.type_of(column))
                    .map(|value| (column.clone(), value))
                    .map_err(|source| RelqError::cast(column.as_str(), source))
            })
            .collect()
    }

    pub fn decode_rows(&self, rows: &[IndexMap<String, Json>]) -> RelqResult<Vec<IndexMap<String, Value>>> {
        rows.iter().map(|row| self.decode_row(row)).collect()
    }
}
