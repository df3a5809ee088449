//! Value → SQL literal conversion.
//!
//! Two tiers: a declared [`TypeTag`] always wins and coerces the value (a
//! `"1"` for an integer field becomes `1`); without one, the value's own
//! shape decides, and numeric-looking strings are emitted as numbers.

use crate::ast::Value;
use crate::error::CastError;
use crate::parser::literals::{parse_number, Number};
use crate::schema::TypeTag;
use crate::transpiler::traits::SqlGenerator;

/// Coerce `value` to the shape declared by `tag`.
///
/// `Untyped` passes the value through. Lists and sub-queries are not scalar
/// and fail for any declared type.
pub fn coerce(value: &Value, tag: TypeTag) -> Result<Value, CastError> {
    let fail = || CastError::new(tag, value.to_string());

    let coerced = match (tag, value) {
        (_, Value::Null) => Value::Null,
        (TypeTag::Untyped, v) => v.clone(),
        (_, Value::List(_) | Value::Query(_)) => return Err(fail()),

        (TypeTag::String, Value::String(s)) => Value::String(s.clone()),
        (TypeTag::String, Value::Int(n)) => Value::String(n.to_string()),
        (TypeTag::String, Value::Float(n)) => Value::String(n.to_string()),
        (TypeTag::String, Value::Bool(b)) => Value::String(if *b { "1" } else { "0" }.into()),

        (TypeTag::Integer, Value::Int(n)) => Value::Int(*n),
        (TypeTag::Integer, Value::Bool(b)) => Value::Int(i64::from(*b)),
        (TypeTag::Integer, Value::Float(n)) => {
            if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
                Value::Int(*n as i64)
            } else {
                return Err(fail());
            }
        }
        (TypeTag::Integer, Value::String(s)) => {
            Value::Int(s.trim().parse::<i64>().map_err(|_| fail())?)
        }

        (TypeTag::Float, Value::Float(n)) => Value::Float(*n),
        (TypeTag::Float, Value::Int(n)) => Value::Float(*n as f64),
        (TypeTag::Float, Value::Bool(b)) => Value::Float(if *b { 1.0 } else { 0.0 }),
        (TypeTag::Float, Value::String(s)) => Value::Float(
            s.trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .ok_or_else(fail)?,
        ),

        (TypeTag::Boolean, Value::Bool(b)) => Value::Bool(*b),
        (TypeTag::Boolean, Value::Int(n)) => Value::Bool(*n != 0),
        (TypeTag::Boolean, Value::Float(n)) => Value::Bool(*n != 0.0),
        (TypeTag::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "y" | "on" => Value::Bool(true),
            "0" | "false" | "f" | "no" | "n" | "off" | "" => Value::Bool(false),
            _ => return Err(fail()),
        },
    };
    Ok(coerced)
}

/// Infer a value's SQL shape: numeric-looking strings become numbers.
fn introspect(value: &Value) -> Value {
    match value {
        Value::String(s) => match parse_number(s) {
            Some(Number::Int(n)) => Value::Int(n),
            Some(Number::Float(n)) => Value::Float(n),
            None => value.clone(),
        },
        other => other.clone(),
    }
}

/// Casts values into literals for one backend.
#[derive(Clone, Copy)]
pub struct ValueCaster<'a> {
    generator: &'a dyn SqlGenerator,
}

impl<'a> ValueCaster<'a> {
    pub fn new(generator: &'a dyn SqlGenerator) -> Self {
        Self { generator }
    }

    /// Render `value` as a literal, coercing by `hint` unless it is `Untyped`.
    /// Lists render as their comma separated elements.
    pub fn cast(&self, value: &Value, hint: TypeTag) -> Result<String, CastError> {
        match value {
            Value::List(items) => {
                let literals = items
                    .iter()
                    .map(|item| self.cast(item, hint))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(literals.join(", "))
            }
            Value::Query(_) => Err(CastError::new(hint, value.to_string())),
            _ => {
                let typed = match hint {
                    TypeTag::Untyped => introspect(value),
                    tag => coerce(value, tag)?,
                };
                self.literal(&typed, hint)
            }
        }
    }

    fn literal(&self, value: &Value, hint: TypeTag) -> Result<String, CastError> {
        match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            Value::Int(n) => Ok(n.to_string()),
            Value::Float(n) if n.is_finite() => Ok(n.to_string()),
            Value::String(s) => Ok(self.generator.string_literal(s)),
            other => Err(CastError::new(hint, other.to_string())),
        }
    }
}
