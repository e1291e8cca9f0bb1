use crate::dialect::Dialect;
use crate::error::{SchemaError, SchemaResult};
use crate::row::{get, ordinal};
use crate::schema::{CatalogRows, ColumnInfo, DbSchema, assemble, normalize_type};
use crate::source::SchemaSource;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

const PRIMARY_INDEX: &str = "primary";

/// Introspects the `main` database of a SQLite file.
pub struct SqliteSource {
    pool: SqlitePool,
}

impl SqliteSource {
    /// `path` is a filesystem path or `:memory:`.
    pub async fn connect(path: &str) -> SchemaResult<Self> {
        let options = if path == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| SchemaError::Config(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(false)
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| SchemaError::Connection(format!("{path}: {e}")))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SchemaSource for SqliteSource {
    async fn table_names(&self) -> SchemaResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(|r| get::<_, String>(r, "name")).collect()
    }

    async fn load_tables(&self, names: &[String]) -> SchemaResult<DbSchema> {
        let mut rows = CatalogRows::default();

        for table in names {
            let column_rows = sqlx::query(
                r#"SELECT cid, name, CAST(type AS TEXT) AS type, "notnull" AS not_null,
                          CAST(dflt_value AS TEXT) AS dflt_value, pk
                   FROM pragma_table_info(?)
                   ORDER BY cid"#,
            )
            .bind(table.as_str())
            .fetch_all(&self.pool)
            .await?;

            let mut pk_columns: Vec<(i64, String)> = Vec::new();
            let mut columns: Vec<ColumnInfo> = Vec::new();
            for row in &column_rows {
                let name: String = get(row, "name")?;
                let declared: String = get::<_, Option<String>>(row, "type")?.unwrap_or_default();
                let pk: i64 = get(row, "pk")?;
                if pk > 0 {
                    pk_columns.push((pk, name.clone()));
                }
                let normalized = normalize_type(&declared);
                let unsigned = normalized.split(' ').any(|w| w == "unsigned");
                columns.push(ColumnInfo {
                    name,
                    data_type: normalized
                        .split(' ')
                        .filter(|w| *w != "unsigned")
                        .collect::<Vec<_>>()
                        .join(" "),
                    column_type: declared,
                    not_null: get::<_, i64>(row, "not_null")? != 0 || pk > 0,
                    default_expr: get(row, "dflt_value")?,
                    ordinal: ordinal("cid", get::<_, i64>(row, "cid")? + 1)?,
                    unsigned,
                    auto_increment: false,
                });
            }

            pk_columns.sort();
            // single INTEGER PRIMARY KEY aliases the rowid
            if let [(_, pk)] = pk_columns.as_slice() {
                if let Some(c) = columns.iter_mut().find(|c| &c.name == pk) {
                    c.auto_increment = c.data_type == "integer";
                }
            }

            for (_, column) in &pk_columns {
                rows.index_columns.push((
                    table.clone(),
                    PRIMARY_INDEX.to_string(),
                    column.clone(),
                    true,
                    true,
                ));
            }

            let index_rows = sqlx::query(
                r#"SELECT name, "unique" AS is_unique, origin FROM pragma_index_list(?) ORDER BY name"#,
            )
            .bind(table.as_str())
            .fetch_all(&self.pool)
            .await?;

            for row in &index_rows {
                let origin: String = get(row, "origin")?;
                if origin == "pk" {
                    continue;
                }
                let index: String = get(row, "name")?;
                let unique = get::<_, i64>(row, "is_unique")? != 0;

                let info_rows = sqlx::query(
                    "SELECT name FROM pragma_index_info(?) ORDER BY seqno",
                )
                .bind(index.as_str())
                .fetch_all(&self.pool)
                .await?;
                for info in &info_rows {
                    // expression key parts have no name
                    if let Some(column) = get::<_, Option<String>>(info, "name")? {
                        rows.index_columns.push((
                            table.clone(),
                            index.clone(),
                            column,
                            unique,
                            false,
                        ));
                    }
                }
            }

            rows.columns
                .extend(columns.into_iter().map(|c| (table.clone(), c)));
        }

        assemble(Dialect::Sqlite, "main", names, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_source() -> SqliteSource {
        let source = SqliteSource::connect(":memory:").await.unwrap();
        for stmt in [
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255) NOT NULL, age INTEGER UNSIGNED, bio TEXT)",
            "CREATE UNIQUE INDEX idx_users_email ON users (email)",
            "CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL, title TEXT NOT NULL DEFAULT 'untitled')",
            "CREATE INDEX idx_posts_user_id ON posts (user_id)",
        ] {
            sqlx::query(stmt).execute(&source.pool).await.unwrap();
        }
        source
    }

    #[tokio::test]
    async fn lists_user_tables_sorted() {
        let source = memory_source().await;
        let names = source.table_names().await.unwrap();
        assert_eq!(names, vec!["posts".to_string(), "users".to_string()]);
    }

    #[tokio::test]
    async fn loads_columns_and_indexes() {
        let source = memory_source().await;
        let schema = source
            .load_tables(&["users".to_string(), "posts".to_string()])
            .await
            .unwrap();

        let users = schema.find_table("users").unwrap();
        let id = users.column("id").unwrap();
        assert!(id.auto_increment);
        assert!(id.not_null);
        let age = users.column("age").unwrap();
        assert!(age.unsigned);
        assert_eq!(age.data_type, "integer");
        assert!(!users.column("bio").unwrap().not_null);
        assert_eq!(users.primary_key().len(), 1);

        let email_idx = users.indexes_for("email");
        assert_eq!(email_idx.len(), 1);
        assert!(email_idx[0].unique);

        let posts = schema.find_table("posts").unwrap();
        assert_eq!(
            posts.column("title").unwrap().default_expr.as_deref(),
            Some("'untitled'")
        );
        assert!(!posts.indexes_for("user_id")[0].unique);
    }

    #[tokio::test]
    async fn missing_table_is_reported() {
        let source = memory_source().await;
        let err = source.load_tables(&["nope".to_string()]).await.unwrap_err();
        assert!(matches!(err, SchemaError::TableNotFound(_)));
    }
}
