use std::str::FromStr;

use crate::ast::Value;
use crate::error::RelqError;

/// Boolean connective of a condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    /// Recognize the reserved `and` / `or` mapping keys.
    pub fn from_key(key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("and") {
            Some(BoolOp::And)
        } else if key.eq_ignore_ascii_case("or") {
            Some(BoolOp::Or)
        } else {
            None
        }
    }

    pub fn joiner(&self) -> &'static str {
        match self {
            BoolOp::And => " AND ",
            BoolOp::Or => " OR ",
        }
    }
}

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    Like,
    NotLike,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Between => "BETWEEN",
            Operator::Like => "like",
            Operator::NotLike => "not like",
        }
    }
}

impl FromStr for Operator {
    type Err = RelqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim() {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            word if word.eq_ignore_ascii_case("between") => Operator::Between,
            word if word.eq_ignore_ascii_case("like") => Operator::Like,
            word if word.eq_ignore_ascii_case("not like") => Operator::NotLike,
            _ => return Err(RelqError::InvalidOperator(s.to_string())),
        };
        Ok(op)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single field/operator/value test.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

impl Leaf {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// A filter expression.
///
/// The outermost `Group` of a WHERE clause is the implicit conjunction and is
/// rendered without parentheses; every nested `Group` gets exactly one pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpr {
    Leaf(Leaf),
    Group {
        boolean: BoolOp,
        children: Vec<ConditionExpr>,
    },
    /// SQL text emitted verbatim.
    Raw(String),
}

impl ConditionExpr {
    pub fn leaf(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        ConditionExpr::Leaf(Leaf::new(field, op, value))
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(field, Operator::Eq, value)
    }

    pub fn and(children: Vec<ConditionExpr>) -> Self {
        ConditionExpr::Group {
            boolean: BoolOp::And,
            children,
        }
    }

    pub fn or(children: Vec<ConditionExpr>) -> Self {
        ConditionExpr::Group {
            boolean: BoolOp::Or,
            children,
        }
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        ConditionExpr::Raw(sql.into())
    }
}

impl From<Leaf> for ConditionExpr {
    fn from(leaf: Leaf) -> Self {
        ConditionExpr::Leaf(leaf)
    }
}
