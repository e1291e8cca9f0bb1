//! ormgen-schema
//!
//! Connects to a database and reads the table metadata ormgen generates code
//! from. Four dialects are supported, each behind the [`SchemaSource`] trait:
//!
//! - **postgres** via `tokio-postgres`, reading `pg_catalog` for `current_schema()`
//! - **mysql** via `sqlx`, reading `information_schema` for `DATABASE()`
//! - **sqlite** via `sqlx`, reading `sqlite_master` and the table pragmas
//! - **sqlserver** via `sqlx`, reading `INFORMATION_SCHEMA` and `sys.indexes`
//!
//! # Example
//!
//! ```ignore
//! use ormgen_schema::{Dialect, connect};
//!
//! let source = connect(Dialect::Sqlite, "app.db").await?;
//! let names = source.table_names().await?;
//! let schema = source.load_tables(&names).await?;
//! ```

pub mod dialect;
pub mod error;
pub mod mysql;
pub mod postgres;
mod row;
pub mod schema;
pub mod source;
pub mod sqlite;
pub mod sqlserver;

pub use dialect::Dialect;
pub use error::{SchemaError, SchemaResult};
pub use schema::{ColumnInfo, DbSchema, IndexInfo, TableInfo, normalize_type};
pub use source::{SchemaSource, connect, normalize_dsn};
