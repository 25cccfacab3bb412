//! Error types for query expansion and assembly.

use thiserror::Error;

/// Query assembly error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// `return` and `remove` are mutually exclusive output modes
    #[error("`return` and `remove` cannot be combined on the same query level")]
    ReturnRemoveConflict,

    /// Strict mode only: a property references a function the registry rejects
    #[error("function `{name}` is not supported in this position")]
    UnsupportedFunction { name: String },

    /// Strict mode only: a property has neither a name nor a path
    #[error("property has neither a name nor a path")]
    UnresolvableProperty,
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
