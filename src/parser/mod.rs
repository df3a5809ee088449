//! Input classification for relq.
//!
//! Queries arrive as loosely shaped data (JSON mappings, order strings,
//! numeric-looking text). This module turns them into the closed AST types
//! before any SQL is generated.
//!
//! - [`conditions`]: nested condition mappings → [`ConditionExpr`](crate::ast::ConditionExpr)
//! - [`order`]: `"title DESC"`, `["a", {"b": "desc"}]` → [`OrderSpec`](crate::ast::OrderSpec)
//! - [`literals`]: numeric recognition and SQL literal parsing (nom)

pub mod conditions;
pub mod literals;
pub mod order;


use crate::ast::Query;
use crate::error::{RelqError, RelqResult};

/// Parse a JSON query document into a [`Query`].
///
/// # Example
///
/// ```
/// use relq::parser::parse_query;
///
/// let q = parse_query(r#"{ "model": "posts", "conditions": { "id": 1 } }"#).unwrap();
/// assert_eq!(q.model.unwrap().source, "posts");
/// ```
pub fn parse_query(input: &str) -> RelqResult<Query> {
    serde_json::from_str(input).map_err(|e| RelqError::InvalidCondition(e.to_string()))
}
