//! # relq — relational query compiler
//!
//! relq turns abstract query trees into self-contained SQL text for a
//! relational backend, and decodes raw rows back into typed values.
//!
//! ## Quick Example
//!
//! ```
//! use relq::prelude::*;
//!
//! let schema = StaticSchema::new().with_model(
//!     "Post",
//!     "posts",
//!     &[("id", TypeTag::Integer), ("title", TypeTag::String)],
//! );
//! let post = schema.entity("Post").unwrap();
//! let compiler = Compiler::new(schema);
//!
//! let query = Query::read(post)
//!     .fields(["id", "title"])
//!     .filter(ConditionExpr::eq("id", "42"))
//!     .limit(10);
//!
//! let sql = compiler.compile(&query).unwrap();
//! assert_eq!(
//!     sql.text,
//!     r#"SELECT id, title FROM "posts" AS "Post" WHERE id = 42 LIMIT 10;"#
//! );
//! ```
//!
//! ## Condition documents
//!
//! | Shape                               | SQL                          |
//! |-------------------------------------|------------------------------|
//! | `{"a": 1, "b": 2}`                  | `a = 1 AND b = 2`            |
//! | `{"a": [1, 2]}`                     | `a IN (1, 2)`                |
//! | `{"a": {">": 1, "<": 9}}`           | `(a > 1 AND a < 9)`          |
//! | `{"a": {"between": [1, 9]}}`        | `(a BETWEEN 1 AND 9)`        |
//! | `{"or": {"a": 1, "b": 2}}`          | `(a = 1 OR b = 2)`           |
//! | `{"a": {"$query": {...}}}`          | `a IN (SELECT ...)`          |
//! | `"raw sql"`                         | `raw sql`                    |

pub mod ast;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod parser;
pub mod schema;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::decode::RowDecoder;
    pub use crate::engine::{DataSource, Outcome, Record, SqlxTransport, Transport};
    pub use crate::error::*;
    pub use crate::parser::parse_query;
    pub use crate::schema::{SchemaInfo, SchemaResolver, StaticSchema, TypeTag};
    pub use crate::transpiler::{CompiledCommand, Compiler, Dialect};
}

/// Parse a JSON query document into a [`Query`](ast::Query).
///
/// # Example
///
/// ```
/// use relq::parse;
///
/// let query = parse(r#"{"type": "delete", "model": "posts", "data": {"id": 3}}"#).unwrap();
/// assert_eq!(query.kind, relq::ast::Kind::Delete);
/// ```
pub fn parse(input: &str) -> Result<ast::Query, error::RelqError> {
    parser::parse_query(input)
}
