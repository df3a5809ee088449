//! ORDER BY input parsing.
//!
//! Accepted shapes:
//!
//! ```text
//! "title"                         → title ASC
//! "title DESC, created"           → title DESC, created ASC
//! ["author_id", {"title": "DESC"}]
//! {"title": "desc", "id": []}     → non-string directions mean ASC
//! ```

use nom::{
    bytes::complete::take_till1,
    character::complete::{alpha1, multispace0, multispace1},
    combinator::{all_consuming, opt},
    sequence::{delimited, pair, preceded},
    IResult,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

use crate::ast::{Direction, OrderSpec};
use crate::error::{RelqError, RelqResult};

/// `field [direction]`
fn order_term(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    delimited(
        multispace0,
        pair(
            take_till1(char::is_whitespace),
            opt(preceded(multispace1, alpha1)),
        ),
        multispace0,
    )(input)
}

/// `expression ASC|DESC`, where the expression may contain spaces.
fn expression_term(input: &str) -> Option<(&str, Direction)> {
    let (expr, word) = input.rsplit_once(char::is_whitespace)?;
    let direction = match word.to_ascii_uppercase().as_str() {
        "ASC" => Direction::Asc,
        "DESC" => Direction::Desc,
        _ => return None,
    };
    let expr = expr.trim_end();
    (!expr.is_empty()).then_some((expr, direction))
}

/// Parse one `field [direction]` term. Longer text keeps a trailing
/// `ASC`/`DESC`; the rest is taken whole as the field.
pub fn parse_term(input: &str) -> Option<OrderSpec> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match all_consuming(order_term)(trimmed) {
        Ok((_, (field, dir))) => Some(OrderSpec::new(
            field,
            dir.map(Direction::parse).unwrap_or_default(),
        )),
        Err(_) => Some(match expression_term(trimmed) {
            Some((expr, direction)) => OrderSpec::new(expr, direction),
            None => OrderSpec::asc(trimmed),
        }),
    }
}

/// Parse a comma separated order string.
pub fn parse_str(input: &str) -> Vec<OrderSpec> {
    input.split(',').filter_map(parse_term).collect()
}

fn direction_of(raw: &Json) -> Direction {
    match raw {
        Json::String(s) => Direction::parse(s),
        _ => Direction::Asc,
    }
}

/// Classify any supported JSON order shape.
pub fn parse_json(raw: &Json) -> RelqResult<Vec<OrderSpec>> {
    match raw {
        Json::Null => Ok(Vec::new()),
        Json::String(s) => Ok(parse_str(s)),
        Json::Object(map) => Ok(map
            .iter()
            .map(|(field, dir)| OrderSpec::new(field.as_str(), direction_of(dir)))
            .collect()),
        Json::Array(items) => {
            let mut specs = Vec::new();
            for item in items {
                specs.extend(parse_json(item)?);
            }
            Ok(specs)
        }
        other => Err(RelqError::InvalidCondition(format!(
            "unsupported order specification: {other}"
        ))),
    }
}

/// serde `deserialize_with` hook for [`Query::order`](crate::ast::Query::order).
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<OrderSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Json::deserialize(deserializer)?;
    parse_json(&raw).map_err(serde::de::Error::custom)
}
