//! Error types for quarry

use thiserror::Error;

/// Result type alias for quarry operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for statement composition and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// A fetch/yield-style operation name that no known operation matches
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A rendered placeholder with no value registered for it
    #[error("no value bound for placeholder '{0}'")]
    MissingBind(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Db(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl QueryError {
    /// Create an unsupported-operation error for a dynamic call name
    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::UnsupportedOperation(name.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is an unsupported-operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation(_))
    }

    /// Check if this is a missing-bind error
    pub fn is_missing_bind(&self) -> bool {
        matches!(self, Self::MissingBind(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for QueryError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
