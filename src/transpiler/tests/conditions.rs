//! WHERE clause tests.

use pretty_assertions::assert_eq;
use serde_json::json;

use super::{compiler, conditions, model, sql};
use crate::ast::*;
use crate::error::RelqError;
use crate::schema::TypeTag;

/// Compile `raw` as the conditions of a read on Post.
fn select_where(raw: serde_json::Value) -> String {
    sql(&Query::read(model("Post")).filter(conditions(raw)))
}

fn where_error(raw: serde_json::Value) -> RelqError {
    compiler()
        .compile(&Query::read(model("Post")).filter(conditions(raw)))
        .unwrap_err()
}

const SELECT: &str = "SELECT * FROM {posts} AS {Post} WHERE ";

#[test]
fn test_between() {
    assert_eq!(
        select_where(json!({ "score": { "between": [90, 100] } })),
        format!("{SELECT}({{score}} BETWEEN 90 AND 100);")
    );
}

#[test]
fn test_comparison_operators() {
    assert_eq!(
        select_where(json!({ "score": { ">": 90, "<": 100 } })),
        format!("{SELECT}({{score}} > 90 AND {{score}} < 100);")
    );
    assert_eq!(
        select_where(json!({ "score": { "<>": 7, "<=": 9 } })),
        format!("{SELECT}({{score}} != 7 AND {{score}} <= 9);")
    );
}

#[test]
fn test_in_and_not_in() {
    assert_eq!(
        select_where(json!({ "f": { "=": ["a", "b", "c"] } })),
        format!("{SELECT}({{f}} IN ('a', 'b', 'c'));")
    );
    assert_eq!(
        select_where(json!({ "score": { "!=": [98, 99, 100] } })),
        format!("{SELECT}({{score}} NOT IN (98, 99, 100));")
    );
}

#[test]
fn test_like() {
    assert_eq!(
        select_where(json!({ "scorer": { "like": "%howard%" } })),
        format!("{SELECT}({{scorer}} like '%howard%');")
    );
    assert_eq!(
        select_where(json!({ "field": { "NOT LIKE": "%value%" } })),
        format!("{SELECT}({{field}} not like '%value%');")
    );
}

#[test]
fn test_raw_conditions() {
    let query = Query::read(model("Post")).filter(ConditionExpr::raw("custom conditions string"));
    assert_eq!(sql(&query), format!("{SELECT}custom conditions string;"));

    let query = Query::read(model("Post")).filter(ConditionExpr::raw("   "));
    assert_eq!(sql(&query), "SELECT * FROM {posts} AS {Post};");
}

#[test]
fn test_raw_next_to_other_conditions() {
    assert_eq!(
        select_where(json!(["a = 1 OR b = 2", { "c": 3 }])),
        format!("{SELECT}(a = 1 OR b = 2) AND ({{c}} = 3);")
    );
    assert_eq!(
        select_where(json!({ "and": ["x = 1 OR y = 2", { "id": 4 }] })),
        format!("{SELECT}((x = 1 OR y = 2) AND {{Post}}.{{id}} = 4);")
    );
    // alone in a list it stays bare
    assert_eq!(
        select_where(json!(["a = 1 OR b = 2"])),
        format!("{SELECT}a = 1 OR b = 2;")
    );
}

#[test]
fn test_non_conditions_mean_no_where() {
    for raw in [json!(5), json!(null), json!(true), json!({}), json!([])] {
        assert_eq!(crate::parser::conditions::parse(&raw).unwrap(), None);
    }
}

#[test]
fn test_compound_or_and() {
    assert_eq!(
        select_where(json!({
            "or": {
                "field1": "value1",
                "field2": "value2",
                "and": { "sField": "1", "sField2": "2" }
            },
            "bField": "3"
        })),
        format!(
            "{SELECT}({{field1}} = 'value1' OR {{field2}} = 'value2' OR \
             ({{sField}} = 1 AND {{sField2}} = 2)) AND {{bField}} = 3;"
        )
    );
}

#[test]
fn test_or_list_repeats_field() {
    assert_eq!(
        select_where(json!({ "or": [{ "title": "a" }, { "title": "b" }] })),
        format!("{SELECT}({{Post}}.{{title}} = 'a' OR {{Post}}.{{title}} = 'b');")
    );
    assert_eq!(
        select_where(json!({ "or": ["a = 1", "b = 2"] })),
        format!("{SELECT}((a = 1) OR (b = 2));")
    );
}

#[test]
fn test_nested_groups_wrap_once() {
    let expr = ConditionExpr::and(vec![
        ConditionExpr::or(vec![ConditionExpr::or(vec![ConditionExpr::eq("a", 1)])]),
        ConditionExpr::eq("b", 2),
    ]);
    assert_eq!(
        sql(&Query::read(model("Post")).filter(expr)),
        format!("{SELECT}(({{a}} = 1)) AND {{b}} = 2;")
    );
}

#[test]
fn test_lone_leaf_is_verbatim() {
    let query = Query::read(model("Post")).filter(ConditionExpr::eq("title", "x"));
    assert_eq!(sql(&query), format!("{SELECT}title = 'x';"));
}

#[test]
fn test_schema_fields_prefixed_and_typed() {
    assert_eq!(
        select_where(json!({ "title": 5, "id": "2" })),
        format!("{SELECT}{{Post}}.{{title}} = '5' AND {{Post}}.{{id}} = 2;")
    );
    assert_eq!(
        select_where(json!({ "Post.author_id": { ">": "5" }, "x": 1 })),
        format!("{SELECT}({{Post}}.{{author_id}} > 5) AND {{x}} = 1;")
    );
}

#[test]
fn test_expressions_are_not_quoted() {
    assert_eq!(
        select_where(json!({ "LOWER(title)": "abc", "n": 1 })),
        format!("{SELECT}LOWER(title) = 'abc' AND {{n}} = 1;")
    );
}

#[test]
fn test_null_tests() {
    assert_eq!(
        select_where(json!({ "deleted": null, "author_id": { "!=": null } })),
        format!("{SELECT}{{deleted}} IS NULL AND ({{Post}}.{{author_id}} IS NOT NULL);")
    );
}

#[test]
fn test_empty_sets() {
    assert_eq!(
        select_where(json!({ "a": [], "b": { "!=": [] } })),
        format!("{SELECT}1 = 0 AND (1 = 1);")
    );
}

#[test]
fn test_subquery_not_in() {
    let raw = json!({
        "id": { "!=": { "$query": {
            "model": { "name": "Tagging", "source": "taggings" },
            "fields": ["post_id"]
        } } },
        "author_id": 1
    });
    assert_eq!(
        select_where(raw),
        format!(
            "{SELECT}({{Post}}.{{id}} NOT IN (SELECT post_id FROM {{taggings}} AS {{Tagging}})) \
             AND {{Post}}.{{author_id}} = 1;"
        )
    );
}

#[test]
fn test_subquery_with_comparison_fails() {
    let err = where_error(json!({
        "id": { ">": { "$query": { "model": "Tag" } } }
    }));
    assert!(matches!(err, RelqError::InvalidOperator(_)));
}

#[test]
fn test_malformed_between() {
    let err = where_error(json!({ "score": { "between": [1, 2, 3] } }));
    assert!(matches!(
        err,
        RelqError::MalformedBetween { ref field, count: 3 } if field == "score"
    ));

    let err = where_error(json!({ "score": { "between": 5 } }));
    assert!(matches!(err, RelqError::MalformedBetween { count: 1, .. }));
}

#[test]
fn test_list_with_comparison_fails() {
    let err = where_error(json!({ "score": { ">": [1, 2] } }));
    assert!(matches!(err, RelqError::InvalidCondition(_)));
}

#[test]
fn test_invalid_operator() {
    let err = crate::parser::conditions::parse(&json!({ "score": { "=~": 1 } })).unwrap_err();
    assert!(matches!(err, RelqError::InvalidOperator(op) if op == "=~"));
}

#[test]
fn test_cast_error_names_field() {
    let err = where_error(json!({ "id": "abc", "x": 1 }));
    match err {
        RelqError::Cast { field, source } => {
            assert_eq!(field, "id");
            assert_eq!(source.expected, TypeTag::Integer);
        }
        other => panic!("expected a cast error, got {other:?}"),
    }
}
