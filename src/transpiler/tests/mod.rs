//! Transpiler tests.
//!
//! Most tests compile against [`BraceGenerator`], which wraps identifiers in
//! `{}` so quoting is visible without dialect noise.

mod conditions;
mod statements;

use serde_json::Value as Json;

use crate::ast::*;
use crate::schema::{StaticSchema, TypeTag};
use crate::transpiler::{Compiler, SqlGenerator};

pub(super) struct BraceGenerator;

impl SqlGenerator for BraceGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        format!("{{{name}}}")
    }
}

pub(super) fn schema() -> StaticSchema {
    StaticSchema::new()
        .with_model(
            "Post",
            "posts",
            &[
                ("id", TypeTag::Integer),
                ("author_id", TypeTag::Integer),
                ("title", TypeTag::String),
                ("created", TypeTag::String),
            ],
        )
        .with_model(
            "Comment",
            "comments",
            &[
                ("id", TypeTag::Integer),
                ("post_id", TypeTag::Integer),
                ("body", TypeTag::String),
            ],
        )
        .with_model(
            "Tagging",
            "taggings",
            &[
                ("id", TypeTag::Integer),
                ("post_id", TypeTag::Integer),
                ("tag_id", TypeTag::Integer),
            ],
        )
        .with_model("Tag", "tags", &[("id", TypeTag::Integer), ("tag", TypeTag::String)])
}

pub(super) fn compiler() -> Compiler {
    Compiler::new(schema()).with_generator(Box::new(BraceGenerator))
}

pub(super) fn model(name: &str) -> EntityRef {
    schema()
        .entity(name)
        .unwrap_or_else(|| panic!("no test model {name}"))
}

/// Classify a JSON condition document that is known to be non-empty.
pub(super) fn conditions(raw: Json) -> ConditionExpr {
    crate::parser::conditions::parse(&raw)
        .unwrap()
        .expect("conditions should not be empty")
}

pub(super) fn sql(query: &Query) -> String {
    compiler().compile(query).unwrap().text
}
