use crate::dialect::Dialect;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::{CatalogRows, ColumnInfo, DbSchema, assemble, normalize_type};
use crate::source::SchemaSource;
use tokio_postgres::{NoTls, Row};

/// Introspects the connection's `current_schema()`.
pub struct PostgresSource {
    client: tokio_postgres::Client,
}

impl PostgresSource {
    pub async fn connect(dsn: &str) -> SchemaResult<Self> {
        let (client, connection) = tokio_postgres::connect(dsn, NoTls)
            .await
            .map_err(|e| SchemaError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("postgres connection error: {e}");
            }
        });
        Ok(Self { client })
    }

    async fn current_schema(&self) -> SchemaResult<String> {
        let row = self
            .client
            .query_one(
                "SELECT COALESCE(current_schema(), 'public') AS schema_name",
                &[],
            )
            .await?;
        row.try_get_column("schema_name")
    }
}

#[async_trait::async_trait]
impl SchemaSource for PostgresSource {
    async fn table_names(&self) -> SchemaResult<Vec<String>> {
        let rows = self
            .client
            .query(
                r#"
SELECT c.relname AS table_name
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
WHERE c.relkind IN ('r', 'p')
  AND NOT c.relispartition
  AND n.nspname = current_schema()
ORDER BY c.relname
"#,
                &[],
            )
            .await?;

        rows.iter()
            .map(|r| r.try_get_column::<String>("table_name"))
            .collect()
    }

    async fn load_tables(&self, names: &[String]) -> SchemaResult<DbSchema> {
        let schema_name = self.current_schema().await?;

        let column_rows = self
            .client
            .query(
                r#"
SELECT
  c.relname AS table_name,
  a.attname AS column_name,
  a.attnum::int4 AS ordinal,
  pg_catalog.format_type(a.atttypid, a.atttypmod) AS column_type,
  a.attnotnull AS not_null,
  pg_get_expr(ad.adbin, ad.adrelid) AS default_expr,
  a.attidentity::text AS identity
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid
LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = c.oid AND ad.adnum = a.attnum
WHERE c.relkind IN ('r', 'p')
  AND a.attnum > 0
  AND NOT a.attisdropped
  AND n.nspname = current_schema()
  AND c.relname = ANY($1::text[])
ORDER BY c.relname, a.attnum
"#,
                &[&names],
            )
            .await?;

        let index_rows = self
            .client
            .query(
                r#"
SELECT
  c.relname AS table_name,
  i.relname AS index_name,
  ix.indisunique AS is_unique,
  ix.indisprimary AS is_primary,
  a.attname AS column_name
FROM pg_catalog.pg_index ix
JOIN pg_catalog.pg_class c ON c.oid = ix.indrelid
JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
CROSS JOIN LATERAL unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid AND a.attnum = k.attnum
WHERE n.nspname = current_schema()
  AND c.relname = ANY($1::text[])
ORDER BY c.relname, i.relname, k.ord
"#,
                &[&names],
            )
            .await?;

        let mut rows = CatalogRows::default();
        for row in column_rows {
            let table: String = row.try_get_column("table_name")?;
            rows.columns.push((table, column_from_row(&row)?));
        }
        for row in index_rows {
            rows.index_columns.push((
                row.try_get_column("table_name")?,
                row.try_get_column("index_name")?,
                row.try_get_column("column_name")?,
                row.try_get_column("is_unique")?,
                row.try_get_column("is_primary")?,
            ));
        }

        assemble(Dialect::Postgres, &schema_name, names, rows)
    }
}

fn column_from_row(row: &Row) -> SchemaResult<ColumnInfo> {
    let column_type: String = row.try_get_column("column_type")?;
    let default_expr: Option<String> = row.try_get_column("default_expr")?;
    let identity: String = row.try_get_column("identity")?;

    let auto_increment = !identity.is_empty()
        || default_expr
            .as_deref()
            .is_some_and(|d| d.starts_with("nextval("));

    Ok(ColumnInfo {
        name: row.try_get_column("column_name")?,
        data_type: canonical_pg_type(&column_type),
        column_type,
        not_null: row.try_get_column("not_null")?,
        default_expr,
        ordinal: row.try_get_column("ordinal")?,
        unsigned: false,
        auto_increment,
    })
}

/// Map `format_type` spellings onto the short catalog names.
pub fn canonical_pg_type(declared: &str) -> String {
    let s = normalize_type(declared);
    let (base, array) = match s.strip_suffix("[]") {
        Some(b) => (b.trim_end().to_string(), "[]"),
        None => (s, ""),
    };
    let base = match base.as_str() {
        "character varying" => "varchar",
        "character" => "char",
        "timestamp with time zone" => "timestamptz",
        "timestamp without time zone" => "timestamp",
        "time with time zone" => "timetz",
        "time without time zone" => "time",
        "double precision" => "float8",
        "real" => "float4",
        "smallint" => "int2",
        "integer" => "int4",
        "bigint" => "int8",
        "boolean" => "bool",
        other => other,
    };
    format!("{base}{array}")
}

/// Extension trait for accessing row columns with better error handling.
trait RowExt {
    fn try_get_column<'a, T>(&'a self, column: &str) -> SchemaResult<T>
    where
        T: tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<'a, T>(&'a self, column: &str) -> SchemaResult<T>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| SchemaError::decode(column, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_for_format_type_output() {
        assert_eq!(canonical_pg_type("character varying(255)"), "varchar");
        assert_eq!(canonical_pg_type("timestamp(3) with time zone"), "timestamptz");
        assert_eq!(canonical_pg_type("integer[]"), "int4[]");
        assert_eq!(canonical_pg_type("uuid"), "uuid");
        assert_eq!(canonical_pg_type("numeric(10,2)"), "numeric");
    }
}
