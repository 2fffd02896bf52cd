//! Error types for sqlweave

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sqlweave operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while rendering or running a statement.
#[derive(Debug, Error)]
pub enum SqlError {
    /// A statement is missing a required clause or carries a value it cannot render.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The rendered SQL and the bound argument list disagree on the number of parameters.
    #[error(
        "placeholder mismatch: SQL has {markers} placeholder(s) but {args} argument(s) were bound"
    )]
    PlaceholderMismatch { markers: usize, args: usize },

    /// A run method was called on a builder with no runner attached.
    #[error("cannot run; no Runner set (RunWith)")]
    RunnerNotSet,

    /// A single-row query was requested from a runner that cannot produce one.
    #[error("cannot QueryRow; Runner is not a QueryRower")]
    RunnerNotQueryRunner,

    /// A context-aware method was called on a runner without context support.
    #[error("DB does not support Context")]
    NoContextSupport,

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl SqlError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
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

    /// Check if this error was raised before any SQL reached the database.
    pub fn is_render_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::PlaceholderMismatch { .. }
        )
    }

    /// Check if a run method was called without a runner
    pub fn is_runner_not_set(&self) -> bool {
        matches!(self, Self::RunnerNotSet)
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        SqlError::Pool(err.to_string())
    }
}
