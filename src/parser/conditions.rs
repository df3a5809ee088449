//! Condition mapping classification.
//!
//! Turns an arbitrary nested JSON mapping into a [`ConditionExpr`]:
//!
//! ```text
//! { "a": 1, "b": [1, 2] }              → And[a = 1, b IN (1, 2)]
//! { "score": { ">": 90, "<": 100 } }   → And[ And[score > 90, score < 100] ]
//! { "or": { "a": 1, "and": {...} } }   → And[ Or[a = 1, And[...]] ]
//! { "or": [ {"a": 1}, {"a": 2} ] }     → And[ Or[a = 1, a = 2] ]
//! { "id": { "$query": {...} } }         → And[ id IN (SELECT ...) ]
//! "custom sql"                         → Raw
//! ```
//!
//! Sibling keys keep their insertion order. Null, booleans, numbers and
//! empty containers mean "no condition".

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as Json};

use crate::ast::values::SUBQUERY_KEY;
use crate::ast::{BoolOp, ConditionExpr, Leaf, Operator, Value};
use crate::error::{RelqError, RelqResult};

/// Classify a JSON condition document. `None` means no WHERE clause.
pub fn parse(raw: &Json) -> RelqResult<Option<ConditionExpr>> {
    match raw {
        Json::Null | Json::Bool(_) | Json::Number(_) => Ok(None),
        Json::String(s) if s.trim().is_empty() => Ok(None),
        Json::String(s) => Ok(Some(ConditionExpr::Raw(s.clone()))),
        Json::Array(items) => {
            let mut children = Vec::new();
            for item in items {
                children.extend(parse(item)?);
            }
            Ok(group(BoolOp::And, children))
        }
        Json::Object(map) => Ok(group(BoolOp::And, parse_mapping(map)?)),
    }
}

fn group(boolean: BoolOp, children: Vec<ConditionExpr>) -> Option<ConditionExpr> {
    if children.is_empty() {
        None
    } else {
        Some(ConditionExpr::Group { boolean, children })
    }
}

fn parse_mapping(map: &Map<String, Json>) -> RelqResult<Vec<ConditionExpr>> {
    let mut children = Vec::with_capacity(map.len());
    for (key, value) in map {
        let child = match BoolOp::from_key(key) {
            Some(boolean) => parse_group(key, boolean, value)?,
            None => parse_field(key, value)?,
        };
        children.extend(child);
    }
    Ok(children)
}

fn parse_group(key: &str, boolean: BoolOp, value: &Json) -> RelqResult<Option<ConditionExpr>> {
    let children = match value {
        Json::Object(map) => parse_mapping(map)?,
        Json::Array(items) => {
            let mut children = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Json::Object(map) => {
                        let mut inner = parse_mapping(map)?;
                        // A one-entry mapping is its own branch; more entries
                        // are a conjunction inside this branch.
                        if inner.len() == 1 {
                            children.extend(inner.pop());
                        } else {
                            children.extend(group(BoolOp::And, inner));
                        }
                    }
                    Json::String(s) if !s.trim().is_empty() => {
                        children.push(ConditionExpr::Raw(s.clone()))
                    }
                    other => {
                        return Err(RelqError::InvalidCondition(format!(
                            "'{key}' list entries must be mappings, got {other}"
                        )));
                    }
                }
            }
            children
        }
        other => {
            return Err(RelqError::InvalidCondition(format!(
                "'{key}' expects a mapping or a list of mappings, got {other}"
            )));
        }
    };
    Ok(group(boolean, children))
}

fn is_subquery(map: &Map<String, Json>) -> bool {
    map.len() == 1 && map.contains_key(SUBQUERY_KEY)
}

fn parse_field(field: &str, value: &Json) -> RelqResult<Option<ConditionExpr>> {
    match value {
        Json::Object(ops) if !is_subquery(ops) => {
            let mut leaves = Vec::with_capacity(ops.len());
            for (op, operand) in ops {
                let op: Operator = op.parse()?;
                leaves.push(ConditionExpr::Leaf(Leaf {
                    field: field.to_string(),
                    op,
                    value: Value::try_from(operand.clone())?,
                }));
            }
            Ok(group(BoolOp::And, leaves))
        }
        other => Ok(Some(ConditionExpr::Leaf(Leaf {
            field: field.to_string(),
            op: Operator::Eq,
            value: Value::try_from(other.clone())?,
        }))),
    }
}

/// serde `deserialize_with` hook for [`Query::conditions`](crate::ast::Query::conditions).
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<ConditionExpr>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Json::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}
