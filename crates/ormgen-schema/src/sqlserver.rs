use crate::dialect::Dialect;
use crate::error::{SchemaError, SchemaResult};
use crate::row::{get, ordinal};
use crate::schema::{CatalogRows, ColumnInfo, DbSchema, assemble};
use crate::source::SchemaSource;
use sqlx::mssql::{MssqlPool, MssqlPoolOptions, MssqlRow};

const TABLES_SQL: &str = r#"
SELECT TABLE_NAME AS table_name
FROM INFORMATION_SCHEMA.TABLES
WHERE TABLE_TYPE = 'BASE TABLE'
  AND TABLE_SCHEMA = SCHEMA_NAME()
ORDER BY TABLE_NAME
"#;

const COLUMNS_SQL: &str = r#"
SELECT
  c.TABLE_NAME AS table_name,
  c.COLUMN_NAME AS column_name,
  CAST(c.ORDINAL_POSITION AS INT) AS ordinal,
  c.DATA_TYPE AS data_type,
  CAST(c.CHARACTER_MAXIMUM_LENGTH AS INT) AS max_length,
  CAST(c.NUMERIC_PRECISION AS INT) AS numeric_precision,
  CAST(c.NUMERIC_SCALE AS INT) AS numeric_scale,
  c.IS_NULLABLE AS is_nullable,
  c.COLUMN_DEFAULT AS column_default,
  CAST(COLUMNPROPERTY(OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)), c.COLUMN_NAME, 'IsIdentity') AS INT) AS is_identity
FROM INFORMATION_SCHEMA.COLUMNS c
WHERE c.TABLE_SCHEMA = SCHEMA_NAME()
ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION
"#;

const INDEXES_SQL: &str = r#"
SELECT
  t.name AS table_name,
  i.name AS index_name,
  CAST(i.is_unique AS INT) AS is_unique,
  CAST(i.is_primary_key AS INT) AS is_primary,
  col.name AS column_name
FROM sys.indexes i
JOIN sys.tables t ON t.object_id = i.object_id
JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id
JOIN sys.columns col ON col.object_id = ic.object_id AND col.column_id = ic.column_id
WHERE i.name IS NOT NULL
  AND ic.is_included_column = 0
  AND t.schema_id = SCHEMA_ID()
ORDER BY t.name, i.name, ic.key_ordinal
"#;

/// Introspects the default schema of the login.
pub struct SqlServerSource {
    pool: MssqlPool,
}

impl SqlServerSource {
    pub async fn connect(dsn: &str) -> SchemaResult<Self> {
        let pool = MssqlPoolOptions::new()
            .max_connections(1)
            .connect(dsn)
            .await
            .map_err(|e| SchemaError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn schema_name(&self) -> SchemaResult<String> {
        let row: MssqlRow = sqlx::query("SELECT SCHEMA_NAME() AS schema_name")
            .fetch_one(&self.pool)
            .await?;
        Ok(get::<_, Option<String>>(&row, "schema_name")?.unwrap_or_else(|| "dbo".to_string()))
    }
}

#[async_trait::async_trait]
impl SchemaSource for SqlServerSource {
    async fn table_names(&self) -> SchemaResult<Vec<String>> {
        let rows = sqlx::query(TABLES_SQL).fetch_all(&self.pool).await?;
        rows.iter().map(|r| get::<_, String>(r, "table_name")).collect()
    }

    async fn load_tables(&self, names: &[String]) -> SchemaResult<DbSchema> {
        let schema = self.schema_name().await?;

        let mut rows = CatalogRows::default();

        for row in sqlx::query(COLUMNS_SQL).fetch_all(&self.pool).await? {
            let table: String = get(&row, "table_name")?;
            rows.columns.push((table, column_from_row(&row)?));
        }

        for row in sqlx::query(INDEXES_SQL).fetch_all(&self.pool).await? {
            rows.index_columns.push((
                get(&row, "table_name")?,
                get(&row, "index_name")?,
                get(&row, "column_name")?,
                get::<_, i32>(&row, "is_unique")? != 0,
                get::<_, i32>(&row, "is_primary")? != 0,
            ));
        }

        assemble(Dialect::SqlServer, &schema, names, rows)
    }
}

fn column_from_row(row: &MssqlRow) -> SchemaResult<ColumnInfo> {
    let data_type: String = get(row, "data_type")?;
    let is_nullable: String = get(row, "is_nullable")?;
    let column_type = declared_type(
        &data_type,
        get(row, "max_length")?,
        get(row, "numeric_precision")?,
        get(row, "numeric_scale")?,
    );

    Ok(ColumnInfo {
        name: get(row, "column_name")?,
        data_type: data_type.to_lowercase(),
        column_type,
        not_null: is_nullable.eq_ignore_ascii_case("NO"),
        default_expr: get(row, "column_default")?,
        ordinal: ordinal("ordinal", i64::from(get::<_, i32>(row, "ordinal")?))?,
        unsigned: false,
        auto_increment: get::<_, Option<i32>>(row, "is_identity")?.unwrap_or(0) == 1,
    })
}

/// Rebuild a declared type (`nvarchar(50)`, `decimal(10,2)`) from catalog parts.
fn declared_type(
    data_type: &str,
    max_length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> String {
    let lower = data_type.to_lowercase();
    match lower.as_str() {
        "decimal" | "numeric" => match (precision, scale) {
            (Some(p), Some(s)) => format!("{lower}({p},{s})"),
            _ => lower,
        },
        _ => match max_length {
            Some(-1) => format!("{lower}(max)"),
            Some(n) if n > 0 && !lower.contains("text") && lower != "xml" => {
                format!("{lower}({n})")
            }
            _ => lower,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_rebuilds_lengths() {
        assert_eq!(declared_type("nvarchar", Some(50), None, None), "nvarchar(50)");
        assert_eq!(declared_type("VARCHAR", Some(-1), None, None), "varchar(max)");
        assert_eq!(declared_type("decimal", None, Some(10), Some(2)), "decimal(10,2)");
        assert_eq!(declared_type("int", None, Some(10), Some(0)), "int");
        assert_eq!(declared_type("ntext", Some(1073741823), None, None), "ntext");
    }
}
