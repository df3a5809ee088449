//! Statement rendering tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use serde_json::json;

use super::{compiler, conditions, model, schema, sql};
use crate::ast::*;
use crate::error::{RelqError, RelqResult};
use crate::parser::order::parse_json;
use crate::parser::parse_query;
use crate::schema::{SchemaResolver, StaticSchema, TypeTag};
use crate::transpiler::Compiler;

#[test]
fn test_simple_read() {
    let query = Query::read(model("Post")).fields(["id", "title", "created"]);
    assert_eq!(sql(&query), "SELECT id, title, created FROM {posts} AS {Post};");

    let query = query.limit(1);
    assert_eq!(
        sql(&query),
        "SELECT id, title, created FROM {posts} AS {Post} LIMIT 1;"
    );

    let query = query.filter(ConditionExpr::raw("Post.id = 2"));
    assert_eq!(
        sql(&query),
        "SELECT id, title, created FROM {posts} AS {Post} WHERE Post.id = 2 LIMIT 1;"
    );
}

#[test]
fn test_select_star() {
    assert_eq!(
        sql(&Query::read(model("Post"))),
        "SELECT * FROM {posts} AS {Post};"
    );
}

#[test]
fn test_compile_is_idempotent() {
    let query = Query::read(model("Post"))
        .filter(conditions(json!({
            "or": { "title": "a", "author_id": [1, 2] },
            "score": { "between": [90, 100] }
        })))
        .order_by(OrderSpec::desc("created"))
        .limit(5);
    let compiler = compiler();
    let first = compiler.compile(&query).unwrap();
    let second = compiler.compile(&query).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_subquery_condition() {
    let tagged = Query::read(model("Tagging"))
        .fields(["post_id"])
        .filter(conditions(json!({ "Tag.tag": ["foo", "bar", "baz"] })));
    let query = Query::read(model("Post"))
        .fields(["Post.title", "Post.body"])
        .filter(ConditionExpr::and(vec![ConditionExpr::eq("Post.id", tagged)]));

    assert_eq!(
        sql(&query),
        "SELECT Post.title, Post.body FROM {posts} AS {Post} WHERE Post.id IN \
         (SELECT post_id FROM {taggings} AS {Tagging} WHERE Tag.tag IN ('foo', 'bar', 'baz'));"
    );
}

#[test]
fn test_join() {
    let query = Query::read(model("Post"))
        .fields(["Post.title", "Post.body"])
        .filter(conditions(json!({ "Tag.tag": ["foo", "bar", "baz"] })))
        .join(Query::join_on(model("Tag"), "Tagging.tag_id = Tag.id"));

    assert_eq!(
        sql(&query),
        "SELECT Post.title, Post.body FROM {posts} AS {Post} JOIN {tags} AS {Tag} \
         ON Tagging.tag_id = Tag.id WHERE Tag.tag IN ('foo', 'bar', 'baz');"
    );
}

#[test]
fn test_join_kinds_and_offset() {
    let query = Query::read(model("Post"))
        .join(
            Query::join_on(model("Comment"), "Comment.post_id = Post.id")
                .kind_of_join(JoinKind::Left),
        )
        .join(Query::read(model("Tagging")).kind_of_join(JoinKind::Inner))
        .limit(10)
        .offset(20);

    assert_eq!(
        sql(&query),
        "SELECT * FROM {posts} AS {Post} \
         LEFT JOIN {comments} AS {Comment} ON Comment.post_id = Post.id \
         INNER JOIN {taggings} AS {Tagging} LIMIT 10 OFFSET 20;"
    );
}

#[test]
fn test_zero_limit_is_omitted() {
    let query = Query::read(model("Post")).limit(0).offset(0);
    assert_eq!(sql(&query), "SELECT * FROM {posts} AS {Post};");
}

#[test]
fn test_missing_target() {
    let err = compiler().compile(&Query::default()).unwrap_err();
    assert!(matches!(err, RelqError::MissingTarget(_)));

    let join = Query {
        constraint: Some("a.id = b.id".to_string()),
        ..Default::default()
    };
    let err = compiler()
        .compile(&Query::read(model("Post")).join(join))
        .unwrap_err();
    assert!(matches!(err, RelqError::MissingTarget(_)));
}

#[test]
fn test_create() {
    let query = Query::create(model("Post"))
        .set("title", "new post")
        .set("body", "the body");
    assert_eq!(
        sql(&query),
        "INSERT INTO {posts} ({title}, {body}) VALUES ('new post', 'the body');"
    );
}

#[test]
fn test_create_with_key() {
    let query = Query::create(model("Post"))
        .set("id", 1)
        .set("title", "new post")
        .set("body", "the body");
    assert_eq!(
        sql(&query),
        "INSERT INTO {posts} ({id}, {title}, {body}) VALUES (1, 'new post', 'the body');"
    );
}

#[test]
fn test_create_coerces_to_schema_types() {
    let query = Query::create(model("Post"))
        .set("author_id", "7")
        .set("title", 42);
    assert_eq!(
        sql(&query),
        "INSERT INTO {posts} ({author_id}, {title}) VALUES (7, '42');"
    );
}

#[test]
fn test_empty_payload() {
    let err = compiler()
        .compile(&Query::create(model("Post")))
        .unwrap_err();
    assert!(matches!(err, RelqError::EmptyPayload(_)));

    let err = compiler()
        .compile(&Query::update(model("Post")))
        .unwrap_err();
    assert!(matches!(err, RelqError::EmptyPayload(_)));
}

#[test]
fn test_update_guarded_by_key() {
    let query = Query::update(model("Post"))
        .set("id", 1)
        .set("title", "new post")
        .set("body", "the body");
    assert_eq!(
        sql(&query),
        "UPDATE {posts} SET {id} = 1, {title} = 'new post', {body} = 'the body' WHERE id = 1;"
    );
}

#[test]
fn test_scoped_update() {
    let query = Query::update(model("Post"))
        .filter(conditions(json!({ "expires": { ">=": "2010-05-13" } })))
        .set("published", false);
    assert_eq!(
        sql(&query),
        "UPDATE {posts} SET {published} = 0 WHERE ({expires} >= '2010-05-13');"
    );
}

#[test]
fn test_update_schema_fields_are_not_aliased() {
    let query = Query::update(model("Post"))
        .filter(conditions(json!({ "author_id": 3, "title": "x" })))
        .set("title", "y");
    assert_eq!(
        sql(&query),
        "UPDATE {posts} SET {title} = 'y' WHERE {author_id} = 3 AND {title} = 'x';"
    );
}

#[test]
fn test_update_without_guard() {
    let query = Query::update(model("Post")).set("title", "everything");
    assert_eq!(sql(&query), "UPDATE {posts} SET {title} = 'everything';");
}

#[test]
fn test_delete() {
    let query = Query::delete(model("Post")).set("id", 1);
    assert_eq!(sql(&query), "DELETE FROM {posts} AS {Post} WHERE id = 1;");

    let query = Query::delete(model("Post")).filter(conditions(json!({ "published": 0 })));
    assert_eq!(sql(&query), "DELETE FROM {posts} AS {Post} WHERE published = 0;");
}

#[test]
fn test_delete_with_custom_key() {
    let query = Query::delete(model("Post").with_key("slug")).set("slug", "hello");
    assert_eq!(
        sql(&query),
        "DELETE FROM {posts} AS {Post} WHERE slug = 'hello';"
    );
}

#[test]
fn test_order() {
    let order = |raw| {
        let query = Query {
            order: parse_json(&raw).unwrap(),
            ..Query::read(model("Post"))
        };
        sql(&query)
    };

    assert_eq!(
        order(json!({ "title": "dasc" })),
        "SELECT * FROM {posts} AS {Post} ORDER BY {Post}.{title} ASC;"
    );
    assert_eq!(
        order(json!("foo_bar")),
        "SELECT * FROM {posts} AS {Post} ORDER BY foo_bar ASC;"
    );
    assert_eq!(
        order(json!("title desc")),
        "SELECT * FROM {posts} AS {Post} ORDER BY {Post}.{title} DESC;"
    );
    assert_eq!(
        order(json!(["author_id", { "title": "DESC" }])),
        "SELECT * FROM {posts} AS {Post} ORDER BY {Post}.{author_id} ASC, {Post}.{title} DESC;"
    );
}

#[test]
fn test_depth_limit() {
    let inner = Query::read(model("Tag")).fields(["id"]);
    let middle = Query::read(model("Tagging"))
        .fields(["post_id"])
        .filter(ConditionExpr::eq("tag_id", inner));
    let outer = Query::read(model("Post")).filter(ConditionExpr::eq("id", middle));

    let shallow = compiler().with_max_depth(1);
    assert!(matches!(
        shallow.compile(&outer),
        Err(RelqError::DepthExceeded(1))
    ));
    assert!(compiler().compile(&outer).is_ok());
}

#[test]
fn test_json_document() {
    let query = parse_query(
        r#"{
            "type": "read",
            "model": { "name": "Post", "source": "posts" },
            "fields": ["id", "title"],
            "conditions": { "author_id": { ">": "5" }, "title": { "like": "%rust%" } },
            "order": "created DESC",
            "limit": 10
        }"#,
    )
    .unwrap();

    assert_eq!(
        sql(&query),
        "SELECT id, title FROM {posts} AS {Post} \
         WHERE ({Post}.{author_id} > 5) AND ({Post}.{title} like '%rust%') \
         ORDER BY {Post}.{created} DESC LIMIT 10;"
    );
}

#[test]
fn test_bare_model_names_bound_everywhere() {
    let mut query = parse_query(
        r#"{
            "model": "Post",
            "fields": ["id"],
            "joins": [{ "model": "Comment", "constraint": "Comment.post_id = Post.id" }],
            "conditions": { "id": { "$query": {
                "model": "Tagging",
                "fields": ["post_id"],
                "conditions": { "tag_id": 3 }
            } } }
        }"#,
    )
    .unwrap();
    schema().bind_models(&mut query);

    assert_eq!(
        sql(&query),
        "SELECT id FROM {posts} AS {Post} JOIN {comments} AS {Comment} ON Comment.post_id = Post.id \
         WHERE id IN (SELECT post_id FROM {taggings} AS {Tagging} WHERE tag_id = 3);"
    );
}

/// Counts resolver lookups on top of the shared test schema.
struct CountingSchema {
    inner: StaticSchema,
    lookups: Arc<AtomicUsize>,
}

impl SchemaResolver for CountingSchema {
    fn fields_for(&self, model: &str) -> RelqResult<Vec<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.fields_for(model)
    }

    fn type_of(&self, model: &str, field: &str) -> RelqResult<TypeTag> {
        self.inner.type_of(model, field)
    }
}

#[test]
fn test_compiler_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Compiler>();
}

#[test]
fn test_shared_compiler_across_threads() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let compiler = Compiler::new(CountingSchema {
        inner: schema(),
        lookups: Arc::clone(&lookups),
    });
    let query = Query::read(model("Post"))
        .fields(["id", "title"])
        .filter(conditions(json!({ "title": "x", "author_id": "7" })))
        .order_by(OrderSpec::desc("created"))
        .limit(5);

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| compiler.compile(&query).unwrap().text))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(
        outputs[0],
        r#"SELECT id, title FROM "posts" AS "Post" WHERE "Post"."title" = 'x' AND "Post"."author_id" = 7 ORDER BY "Post"."created" DESC LIMIT 5;"#
    );
    assert!(outputs.iter().all(|text| *text == outputs[0]));
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}
