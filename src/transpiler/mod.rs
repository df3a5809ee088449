//! SQL compiler for relq queries.
//!
//! Converts [`Query`] trees into self-contained SQL command text. Every call
//! to [`Compiler::compile`] is independent: the only state shared between
//! calls is the read-mostly schema cache.

pub mod caster;
pub mod clauses;
pub mod conditions;
pub mod dialect;
pub mod dml;
pub mod sql;
pub mod traits;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::debug;

use crate::ast::*;
use crate::config::Config;
use crate::error::{RelqError, RelqResult};
use crate::schema::{SchemaCache, SchemaInfo, SchemaResolver, TypeTag};

pub use caster::ValueCaster;
pub use dialect::Dialect;
pub use traits::{quote_name, SqlGenerator};

/// Default limit on sub-query/join nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Final SQL text of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCommand {
    pub text: String,
}

impl CompiledCommand {
    /// Wrap hand-written SQL (escape hatch, never produced by the compiler).
    pub fn raw(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl std::fmt::Display for CompiledCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compiles queries for one backend against one schema source.
pub struct Compiler {
    generator: Box<dyn SqlGenerator>,
    schemas: SchemaCache,
    max_depth: usize,
}

impl Compiler {
    pub fn new(resolver: impl SchemaResolver + 'static) -> Self {
        Self {
            generator: Dialect::default().generator(),
            schemas: SchemaCache::new(resolver),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn from_config(config: &Config, resolver: impl SchemaResolver + 'static) -> Self {
        Self::new(resolver)
            .with_dialect(config.dialect)
            .with_max_depth(config.max_depth)
    }

    pub fn with_dialect(self, dialect: Dialect) -> Self {
        self.with_generator(dialect.generator())
    }

    pub fn with_generator(mut self, generator: Box<dyn SqlGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn generator(&self) -> &dyn SqlGenerator {
        self.generator.as_ref()
    }

    pub fn caster(&self) -> ValueCaster<'_> {
        ValueCaster::new(self.generator.as_ref())
    }

    /// Cached schema for a model name.
    pub fn schema_for(&self, model: &str) -> RelqResult<Arc<SchemaInfo>> {
        self.schemas.schema_for(model)
    }

    /// Quote a possibly dotted identifier for this backend.
    pub fn quote(&self, name: &str) -> String {
        quote_name(self.generator.as_ref(), name)
    }

    /// Compile a query into a full statement terminated by `;`.
    pub fn compile(&self, query: &Query) -> RelqResult<CompiledCommand> {
        let statement = match query.kind {
            Kind::Read => dml::select::build_select(self, query, 0)?,
            Kind::Create => dml::insert::build_insert(self, query)?,
            Kind::Update => dml::update::build_update(self, query)?,
            Kind::Delete => dml::delete::build_delete(self, query)?,
        };
        let text = format!("{statement};");

        debug!(
            kind = %query.kind,
            model = query.model.as_ref().map(|m| m.name.as_str()).unwrap_or_default(),
            sql = %text,
            "compiled command"
        );
        Ok(CompiledCommand { text })
    }

    pub(crate) fn target<'q>(&self, query: &'q Query) -> RelqResult<Target<'q>> {
        let model = query
            .model
            .as_ref()
            .ok_or_else(|| RelqError::MissingTarget(format!("{} query has no model", query.kind)))?;
        Ok(Target {
            model,
            schema: self.schema_for(&model.name)?,
        })
    }

    pub(crate) fn check_depth(&self, depth: usize) -> RelqResult<()> {
        if depth > self.max_depth {
            Err(RelqError::DepthExceeded(self.max_depth))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("schemas", &self.schemas)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// The model a statement is compiled against, with its schema.
pub(crate) struct Target<'q> {
    pub model: &'q EntityRef,
    pub schema: Arc<SchemaInfo>,
}

impl Target<'_> {
    /// Strip a leading `Model.` that names this target.
    fn local_name<'f>(&self, field: &'f str) -> &'f str {
        field
            .strip_prefix(self.model.name.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(field)
    }

    pub fn is_known(&self, field: &str) -> bool {
        self.schema.contains(field)
    }

    /// Declared type, also for `Model.field` naming this target.
    pub fn type_of(&self, field: &str) -> TypeTag {
        self.schema.type_of(self.local_name(field))
    }
}
