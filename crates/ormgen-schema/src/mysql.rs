use crate::dialect::Dialect;
use crate::error::{SchemaError, SchemaResult};
use crate::row::{get, ordinal};
use crate::schema::{CatalogRows, ColumnInfo, DbSchema, assemble};
use crate::source::SchemaSource;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};

// information_schema columns are VARBINARY/LONGTEXT depending on server
// version; every text column is cast to CHAR so it decodes as String.

const TABLES_SQL: &str = r#"
SELECT CAST(TABLE_NAME AS CHAR) AS table_name
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = DATABASE()
  AND TABLE_TYPE = 'BASE TABLE'
ORDER BY TABLE_NAME
"#;

const COLUMNS_SQL: &str = r#"
SELECT
  CAST(TABLE_NAME AS CHAR) AS table_name,
  CAST(COLUMN_NAME AS CHAR) AS column_name,
  CAST(ORDINAL_POSITION AS SIGNED) AS ordinal,
  CAST(DATA_TYPE AS CHAR) AS data_type,
  CAST(COLUMN_TYPE AS CHAR) AS column_type,
  CAST(IS_NULLABLE AS CHAR) AS is_nullable,
  CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
  CAST(EXTRA AS CHAR) AS extra
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE()
ORDER BY TABLE_NAME, ORDINAL_POSITION
"#;

const INDEXES_SQL: &str = r#"
SELECT
  CAST(TABLE_NAME AS CHAR) AS table_name,
  CAST(INDEX_NAME AS CHAR) AS index_name,
  CAST(NON_UNIQUE AS SIGNED) AS non_unique,
  CAST(COLUMN_NAME AS CHAR) AS column_name
FROM information_schema.STATISTICS
WHERE TABLE_SCHEMA = DATABASE()
ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX
"#;

/// Introspects the database selected by the DSN.
pub struct MySqlSource {
    pool: MySqlPool,
}

impl MySqlSource {
    pub async fn connect(dsn: &str) -> SchemaResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(dsn)
            .await
            .map_err(|e| SchemaError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn database_name(&self) -> SchemaResult<String> {
        let row: MySqlRow = sqlx::query("SELECT CAST(DATABASE() AS CHAR) AS db")
            .fetch_one(&self.pool)
            .await?;
        let db: Option<String> = get(&row, "db")?;
        db.ok_or_else(|| SchemaError::Config("mysql dsn does not select a database".to_string()))
    }
}

#[async_trait::async_trait]
impl SchemaSource for MySqlSource {
    async fn table_names(&self) -> SchemaResult<Vec<String>> {
        let rows = sqlx::query(TABLES_SQL).fetch_all(&self.pool).await?;
        rows.iter().map(|r| get::<_, String>(r, "table_name")).collect()
    }

    async fn load_tables(&self, names: &[String]) -> SchemaResult<DbSchema> {
        let database = self.database_name().await?;

        let mut rows = CatalogRows::default();

        for row in sqlx::query(COLUMNS_SQL).fetch_all(&self.pool).await? {
            let table: String = get(&row, "table_name")?;
            rows.columns.push((table, column_from_row(&row)?));
        }

        for row in sqlx::query(INDEXES_SQL).fetch_all(&self.pool).await? {
            // functional key parts have no column
            let Some(column) = get::<_, Option<String>>(&row, "column_name")? else {
                continue;
            };
            let index: String = get(&row, "index_name")?;
            let non_unique: i64 = get(&row, "non_unique")?;
            let primary = index == "PRIMARY";
            rows.index_columns.push((
                get(&row, "table_name")?,
                index,
                column,
                non_unique == 0,
                primary,
            ));
        }

        assemble(Dialect::MySql, &database, names, rows)
    }
}

fn column_from_row(row: &MySqlRow) -> SchemaResult<ColumnInfo> {
    let column_type: String = get(row, "column_type")?;
    let data_type: String = get(row, "data_type")?;
    let is_nullable: String = get(row, "is_nullable")?;
    let extra: String = get::<_, Option<String>>(row, "extra")?.unwrap_or_default();

    Ok(ColumnInfo {
        name: get(row, "column_name")?,
        data_type: data_type.to_lowercase(),
        unsigned: column_type.to_lowercase().contains("unsigned"),
        column_type,
        not_null: is_nullable.eq_ignore_ascii_case("NO"),
        default_expr: get(row, "column_default")?,
        ordinal: ordinal("ordinal", get(row, "ordinal")?)?,
        auto_increment: extra.to_lowercase().contains("auto_increment"),
    })
}
