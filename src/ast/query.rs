use indexmap::IndexMap;
use serde::Deserialize;

use crate::ast::{ConditionExpr, OrderSpec, Value};

/// The statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// SELECT
    #[default]
    Read,
    /// INSERT
    Create,
    /// UPDATE
    Update,
    /// DELETE
    Delete,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Read => write!(f, "read"),
            Kind::Create => write!(f, "create"),
            Kind::Update => write!(f, "update"),
            Kind::Delete => write!(f, "delete"),
        }
    }
}

/// Join flavour. Absent means a plain `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

/// The model a query targets: its alias, backing table and primary key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "EntityRefRepr")]
pub struct EntityRef {
    /// Model name, also used as the table alias.
    pub name: String,
    /// Backing table.
    pub source: String,
    /// Primary key field.
    pub key: String,
}

impl EntityRef {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            key: "id".to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityRefRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        key: Option<String>,
    },
}

impl From<EntityRefRepr> for EntityRef {
    fn from(repr: EntityRefRepr) -> Self {
        match repr {
            EntityRefRepr::Name(name) => EntityRef::new(name.clone(), name),
            EntityRefRepr::Full { name, source, key } => {
                let source = source.unwrap_or_else(|| name.clone());
                let entity = EntityRef::new(name, source);
                match key {
                    Some(key) => entity.with_key(key),
                    None => entity,
                }
            }
        }
    }
}

/// An abstract query: what to read or write, independent of any backend.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Query {
    #[serde(default, alias = "type")]
    pub kind: Kind,
    #[serde(default)]
    pub model: Option<EntityRef>,
    /// Selected fields; empty selects `*`
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default, deserialize_with = "crate::parser::conditions::deserialize")]
    pub conditions: Option<ConditionExpr>,
    #[serde(default)]
    pub joins: Vec<Query>,
    /// ON clause, only meaningful when this query is used as a join
    #[serde(default)]
    pub constraint: Option<String>,
    #[serde(default)]
    pub join_kind: Option<JoinKind>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default, deserialize_with = "crate::parser::order::deserialize")]
    pub order: Vec<OrderSpec>,
    /// Field values for create/update, or the entity being deleted
    #[serde(default, alias = "data")]
    pub payload: Option<IndexMap<String, Value>>,
}

impl Query {
    fn with_kind(kind: Kind, model: EntityRef) -> Self {
        Self {
            kind,
            model: Some(model),
            ..Default::default()
        }
    }

    pub fn read(model: EntityRef) -> Self {
        Self::with_kind(Kind::Read, model)
    }

    pub fn create(model: EntityRef) -> Self {
        Self::with_kind(Kind::Create, model)
    }

    pub fn update(model: EntityRef) -> Self {
        Self::with_kind(Kind::Update, model)
    }

    pub fn delete(model: EntityRef) -> Self {
        Self::with_kind(Kind::Delete, model)
    }

    /// A join onto `model` constrained by `constraint`.
    pub fn join_on(model: EntityRef, constraint: impl Into<String>) -> Self {
        Self {
            constraint: Some(constraint.into()),
            ..Self::with_kind(Kind::Read, model)
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, conditions: ConditionExpr) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn join(mut self, join: Query) -> Self {
        self.joins.push(join);
        self
    }

    pub fn kind_of_join(mut self, kind: JoinKind) -> Self {
        self.join_kind = Some(kind);
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u32) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn order_by(mut self, spec: OrderSpec) -> Self {
        self.order.push(spec);
        self
    }

    /// Set one payload field, keeping insertion order.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload
            .get_or_insert_with(IndexMap::new)
            .insert(field.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BoolOp, Direction};

    #[test]
    fn test_query_from_json() {
        let q: Query = serde_json::from_str(
            r#"{
                "type": "update",
                "model": { "name": "Post", "source": "posts" },
                "conditions": { "expires": { ">=": "2010-05-13" } },
                "data": { "published": false },
                "order": "title DESC"
            }"#,
        )
        .unwrap();

        assert_eq!(q.kind, Kind::Update);
        assert_eq!(q.model, Some(EntityRef::new("Post", "posts")));
        assert_eq!(q.order, vec![OrderSpec::new("title", Direction::Desc)]);
        assert_eq!(
            q.payload.unwrap().get("published"),
            Some(&Value::Bool(false))
        );
        assert!(matches!(
            q.conditions,
            Some(ConditionExpr::Group { boolean: BoolOp::And, .. })
        ));
    }

    #[test]
    fn test_model_as_string() {
        let q: Query = serde_json::from_str(r#"{ "model": "tags" }"#).unwrap();
        let model = q.model.unwrap();
        assert_eq!(model.name, "tags");
        assert_eq!(model.source, "tags");
        assert_eq!(model.key, "id");
    }

    #[test]
    fn test_payload_keeps_insertion_order() {
        let q = Query::create(EntityRef::new("Post", "posts"))
            .set("title", "t")
            .set("body", "b")
            .set("id", 1);
        let keys: Vec<&String> = q.payload.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["title", "body", "id"]);
    }
}
