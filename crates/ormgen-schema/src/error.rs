//! Error types for ormgen-schema

use thiserror::Error;

/// Result type for ormgen-schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error type for connecting to a database and reading its schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Configuration error detected before any connection attempt.
    #[error("configuration error: {0}")]
    Config(String),
    /// The dialect name is not one of the supported drivers.
    #[error("unknown db {0:?} (supported: mysql, postgres, sqlite, sqlserver)")]
    UnsupportedDialect(String),
    /// The driver could not reach the database.
    #[error("connection error: {0}")]
    Connection(String),
    /// Database error from tokio-postgres.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    /// Database error from sqlx (mysql, sqlite, sqlserver).
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
    /// Decode error when reading a catalog column.
    #[error("decode error for column '{column}': {message}")]
    Decode { column: String, message: String },
    /// A requested table does not exist in the connected database.
    #[error("table not found: {0}")]
    TableNotFound(String),
}

impl SchemaError {
    /// Create a decode error.
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::Decode {
            column: column.into(),
            message: message.into(),
        }
    }
}
