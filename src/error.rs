//! Error types for relq.

use thiserror::Error;

use crate::schema::TypeTag;

/// A value that could not be coerced to the requested type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot cast {value} to {expected}")]
pub struct CastError {
    /// The type the value was coerced to.
    pub expected: TypeTag,
    /// Display form of the offending value.
    pub value: String,
}

impl CastError {
    pub fn new(expected: TypeTag, value: impl Into<String>) -> Self {
        Self {
            expected,
            value: value.into(),
        }
    }
}

/// The main error type for relq operations.
#[derive(Debug, Error)]
pub enum RelqError {
    /// The query (or one of its joins/sub-queries) has no model to read from.
    #[error("Missing target: {0}")]
    MissingTarget(String),

    /// Unrecognized comparison operator.
    #[error("Invalid operator: '{0}'")]
    InvalidOperator(String),

    /// `between` needs exactly two operands.
    #[error("Malformed between on '{field}': expected 2 operands, got {count}")]
    MalformedBetween { field: String, count: usize },

    /// A value did not fit the declared or inferred type of its field.
    #[error("Cast error on '{field}': {source}")]
    Cast {
        field: String,
        #[source]
        source: CastError,
    },

    /// A condition mapping whose shape cannot be classified.
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Create/Update without any field to write.
    #[error("Empty payload for {0}")]
    EmptyPayload(String),

    /// Sub-queries or joins nested deeper than the configured limit.
    #[error("Query nesting exceeds depth limit of {0}")]
    DepthExceeded(usize),

    /// Schema lookup or schema file error.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Database connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelqError {
    /// Attach a field name to a cast failure.
    pub fn cast(field: impl Into<String>, source: CastError) -> Self {
        Self::Cast {
            field: field.into(),
            source,
        }
    }
}

/// Result type alias for relq operations.
pub type RelqResult<T> = Result<T, RelqError>;
