//! Schema lookup for relq.
//!
//! The compiler only needs two things from a schema: which fields a model
//! owns, and the declared type of each one. Those come from a
//! [`SchemaResolver`]; [`StaticSchema`] is the in-memory implementation that
//! can be loaded from JSON or TOML, and [`SchemaCache`] memoizes lookups.
//!
//! # Example
//! ```
//! use relq::schema::{SchemaResolver, StaticSchema, TypeTag};
//!
//! let toml = r#"
//!     [models.Post]
//!     source = "posts"
//!     fields = { id = "integer", title = "string" }
//! "#;
//!
//! let schema = StaticSchema::from_toml(toml).unwrap();
//! assert_eq!(schema.type_of("Post", "id").unwrap(), TypeTag::Integer);
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::trace;

use crate::ast::{ConditionExpr, EntityRef, Query, Value};
use crate::error::{RelqError, RelqResult};

/// Declared type of a field, used to pick a literal format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    /// No declared type: values are introspected.
    #[default]
    Untyped,
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "text" | "varchar" | "char" | "date" | "datetime" | "timestamp" => {
                TypeTag::String
            }
            "integer" | "int" | "bigint" | "smallint" => TypeTag::Integer,
            "float" | "double" | "decimal" | "real" | "numeric" => TypeTag::Float,
            "boolean" | "bool" => TypeTag::Boolean,
            _ => TypeTag::Untyped,
        }
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        TypeTag::from(name.as_str())
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTag::String => write!(f, "string"),
            TypeTag::Integer => write!(f, "integer"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::Untyped => write!(f, "untyped"),
        }
    }
}

/// Source of field lists and field types, looked up per model name.
pub trait SchemaResolver: Send + Sync {
    /// Fields owned by `model`, in declaration order. Unknown models have none.
    fn fields_for(&self, model: &str) -> RelqResult<Vec<String>>;

    /// Declared type of `model.field`; `Untyped` when unknown.
    fn type_of(&self, model: &str, field: &str) -> RelqResult<TypeTag>;
}

/// Field name to type mapping for a single model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaInfo {
    fields: IndexMap<String, TypeTag>,
}

impl SchemaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema by asking the resolver about every field of `model`.
    pub fn resolve(resolver: &dyn SchemaResolver, model: &str) -> RelqResult<Self> {
        let mut fields = IndexMap::new();
        for field in resolver.fields_for(model)? {
            let tag = resolver.type_of(model, &field)?;
            fields.insert(field, tag);
        }
        Ok(Self { fields })
    }

    pub fn with_field(mut self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.fields.insert(name.into(), tag);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn type_of(&self, field: &str) -> TypeTag {
        self.fields.get(field).copied().unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, TypeTag)> for SchemaInfo {
    fn from_iter<I: IntoIterator<Item = (S, TypeTag)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A model definition inside a schema file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelDef {
    /// Table name; defaults to the model name.
    #[serde(default)]
    pub source: Option<String>,
    /// Primary key field; defaults to `id`.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, TypeTag>,
}

/// In-memory schema registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticSchema {
    #[serde(default)]
    pub models: IndexMap<String, ModelDef>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model backed by `source` with the given fields.
    pub fn add_model(&mut self, name: &str, source: &str, fields: &[(&str, TypeTag)]) {
        self.models.insert(
            name.to_string(),
            ModelDef {
                source: Some(source.to_string()),
                key: None,
                fields: fields.iter().map(|(f, t)| (f.to_string(), *t)).collect(),
            },
        );
    }

    pub fn with_model(mut self, name: &str, source: &str, fields: &[(&str, TypeTag)]) -> Self {
        self.add_model(name, source, fields);
        self
    }

    /// The [`EntityRef`] for a registered model, with its table and key.
    pub fn entity(&self, name: &str) -> Option<EntityRef> {
        self.models.get(name).map(|def| {
            let mut entity =
                EntityRef::new(name, def.source.as_deref().unwrap_or(name));
            if let Some(key) = &def.key {
                entity = entity.with_key(key);
            }
            entity
        })
    }

    /// Give every model named only by its bare name its table and key:
    /// the query's own model, its joins and `$query` sub-queries.
    pub fn bind_models(&self, query: &mut Query) {
        if let Some(model) = &mut query.model {
            if model.source == model.name {
                if let Some(entity) = self.entity(&model.name) {
                    *model = entity;
                }
            }
        }
        for join in &mut query.joins {
            self.bind_models(join);
        }
        if let Some(conditions) = &mut query.conditions {
            self.bind_condition(conditions);
        }
    }

    fn bind_condition(&self, expr: &mut ConditionExpr) {
        match expr {
            ConditionExpr::Group { children, .. } => {
                for child in children {
                    self.bind_condition(child);
                }
            }
            ConditionExpr::Leaf(leaf) => {
                if let Value::Query(sub) = &mut leaf.value {
                    self.bind_models(sub);
                }
            }
            ConditionExpr::Raw(_) => {}
        }
    }

    pub fn from_json(json: &str) -> RelqResult<Self> {
        serde_json::from_str(json).map_err(|e| RelqError::Schema(e.to_string()))
    }

    pub fn from_toml(input: &str) -> RelqResult<Self> {
        toml::from_str(input).map_err(|e| RelqError::Schema(e.to_string()))
    }

    /// Load a schema file, picking the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> RelqResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }
}

impl SchemaResolver for StaticSchema {
    fn fields_for(&self, model: &str) -> RelqResult<Vec<String>> {
        Ok(self
            .models
            .get(model)
            .map(|def| def.fields.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn type_of(&self, model: &str, field: &str) -> RelqResult<TypeTag> {
        Ok(self
            .models
            .get(model)
            .and_then(|def| def.fields.get(field).copied())
            .unwrap_or_default())
    }
}

/// Memoizing wrapper around a resolver. Reads take a shared lock; only a
/// miss takes the write lock.
pub struct SchemaCache {
    resolver: Box<dyn SchemaResolver>,
    entries: RwLock<HashMap<String, Arc<SchemaInfo>>>,
}

impl SchemaCache {
    pub fn new(resolver: impl SchemaResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn schema_for(&self, model: &str) -> RelqResult<Arc<SchemaInfo>> {
        {
            let entries = self
                .entries
                .read()
                .map_err(|_| RelqError::Schema("schema cache lock poisoned".into()))?;
            if let Some(hit) = entries.get(model) {
                return Ok(Arc::clone(hit));
            }
        }

        // Resolve under the write lock so concurrent misses hit the resolver once.
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RelqError::Schema("schema cache lock poisoned".into()))?;
        if let Some(hit) = entries.get(model) {
            return Ok(Arc::clone(hit));
        }
        trace!(model, "schema cache miss");
        let info = Arc::new(SchemaInfo::resolve(self.resolver.as_ref(), model)?);
        entries.insert(model.to_string(), Arc::clone(&info));
        Ok(info)
    }

    /// Drop every cached entry so the next lookup hits the resolver again.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn resolver(&self) -> &dyn SchemaResolver {
        self.resolver.as_ref()
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("SchemaCache").field("cached", &cached).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_type_names() {
        assert_eq!(TypeTag::from("VARCHAR"), TypeTag::String);
        assert_eq!(TypeTag::from("bigint"), TypeTag::Integer);
        assert_eq!(TypeTag::from("decimal"), TypeTag::Float);
        assert_eq!(TypeTag::from("bool"), TypeTag::Boolean);
        assert_eq!(TypeTag::from("jsonb"), TypeTag::Untyped);
    }

    #[test]
    fn test_schema_from_json() {
        let json = r#"{
            "models": {
                "Post": {
                    "source": "posts",
                    "key": "post_id",
                    "fields": { "post_id": "integer", "title": "string", "score": "float" }
                }
            }
        }"#;
        let schema = StaticSchema::from_json(json).unwrap();
        assert_eq!(
            schema.fields_for("Post").unwrap(),
            vec!["post_id", "title", "score"]
        );
        assert_eq!(schema.type_of("Post", "score").unwrap(), TypeTag::Float);
        assert_eq!(schema.type_of("Post", "missing").unwrap(), TypeTag::Untyped);

        let entity = schema.entity("Post").unwrap();
        assert_eq!(entity.source, "posts");
        assert_eq!(entity.key, "post_id");
    }

    #[test]
    fn test_unknown_model_is_empty() {
        let schema = StaticSchema::new();
        assert!(schema.fields_for("Ghost").unwrap().is_empty());
        assert!(schema.entity("Ghost").is_none());
    }

    struct CountingResolver {
        calls: Arc<AtomicUsize>,
    }

    impl SchemaResolver for CountingResolver {
        fn fields_for(&self, _model: &str) -> RelqResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["id".to_string()])
        }

        fn type_of(&self, _model: &str, _field: &str) -> RelqResult<TypeTag> {
            Ok(TypeTag::Integer)
        }
    }

    #[test]
    fn test_cache_hits_resolver_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = SchemaCache::new(CountingResolver {
            calls: Arc::clone(&calls),
        });

        let first = cache.schema_for("Post").unwrap();
        let second = cache.schema_for("Post").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.type_of("id"), TypeTag::Integer);

        cache.clear();
        cache.schema_for("Post").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
