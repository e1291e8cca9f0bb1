use ormgen_schema::{ColumnInfo, Dialect};
use std::collections::BTreeMap;

/// How a column's value crosses the driver when sqlx cannot decode the
/// native type into the mapped Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// MySQL unsigned integer read into a signed field.
    Signed,
    /// SQL Server value read as `NVARCHAR`.
    Text,
    /// SQL Server `datetime`/`smalldatetime` read as ISO 8601 text.
    Iso8601,
    /// SQL Server binary read and written as hex text.
    Hex,
}

impl Conversion {
    /// Select-list entry for the quoted `column`, aliased back to its name.
    pub fn read(self, column: &str) -> String {
        let expr = match self {
            Conversion::Signed => format!("CAST({column} AS SIGNED)"),
            Conversion::Text => format!("CAST({column} AS NVARCHAR(4000))"),
            Conversion::Iso8601 => format!("CONVERT(NVARCHAR(30), {column}, 126)"),
            Conversion::Hex => format!("CONVERT(NVARCHAR(4000), {column}, 2)"),
        };
        format!("{expr} AS {column}")
    }

    /// Expression a bound parameter is wrapped in before it reaches the column.
    pub fn write(self, placeholder: &str) -> String {
        match self {
            Conversion::Hex => format!("CONVERT(VARBINARY(MAX), {placeholder}, 2)"),
            Conversion::Signed | Conversion::Text | Conversion::Iso8601 => placeholder.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    /// Rust type, without any `Option` wrapping.
    pub ty: String,
    pub conversion: Option<Conversion>,
}

impl MappedColumn {
    fn plain(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            conversion: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeMapper {
    dialect: Dialect,
    /// User overrides from `types` (lowercased db type -> Rust path/type).
    custom: BTreeMap<String, String>,
}

impl TypeMapper {
    pub fn new(dialect: Dialect, custom: BTreeMap<String, String>) -> Self {
        let custom = custom
            .into_iter()
            .map(|(k, v)| (collapse(&k), v.trim().to_string()))
            .collect();
        Self { dialect, custom }
    }

    /// Rust type for a column and the SQL conversion it needs, if any.
    ///
    /// Overrides are matched against the declared type first (`tinyint(1)`),
    /// then against the normalized base type (`tinyint`). An overridden
    /// column is never converted.
    pub fn map_column(&self, column: &ColumnInfo, signable: bool) -> MappedColumn {
        let custom = self
            .custom
            .get(&collapse(&column.column_type))
            .or_else(|| self.custom.get(&column.data_type));
        if let Some(t) = custom {
            return MappedColumn::plain(t.clone());
        }

        if self.dialect == Dialect::MySql && collapse(&column.column_type).starts_with("tinyint(1)") {
            return MappedColumn::plain("bool");
        }

        let Some(ty) = self.builtin(&column.data_type) else {
            // String only decodes where the driver accepts the native type as text.
            tracing::warn!(
                column = %column.name,
                data_type = %column.data_type,
                "no built-in type mapping, generating String; add a `types` entry if it fails to decode"
            );
            return MappedColumn {
                ty: "String".to_string(),
                conversion: (self.dialect == Dialect::SqlServer).then_some(Conversion::Text),
            };
        };

        if column.unsigned {
            if signable {
                if let Some(unsigned) = self.unsigned_of(&ty) {
                    return MappedColumn::plain(unsigned);
                }
            }
            // sqlx rejects the UNSIGNED flag on signed integer fields.
            if self.dialect == Dialect::MySql && is_signed_int(&ty) {
                return MappedColumn {
                    ty,
                    conversion: Some(Conversion::Signed),
                };
            }
        }

        let conversion = match self.dialect {
            Dialect::SqlServer => sqlserver_conversion(&column.data_type),
            _ => None,
        };
        MappedColumn { ty, conversion }
    }

    fn builtin(&self, data_type: &str) -> Option<String> {
        if let Some(t) = self.custom.get(data_type) {
            return Some(t.clone());
        }

        if let Some(base) = data_type.strip_suffix("[]") {
            return self.builtin(base).map(|inner| format!("Vec<{inner}>"));
        }

        let ty = match self.dialect {
            Dialect::Postgres => postgres_type(data_type),
            Dialect::MySql => mysql_type(data_type),
            Dialect::Sqlite => sqlite_type(data_type),
            Dialect::SqlServer => sqlserver_type(data_type),
        };
        ty.map(str::to_string)
    }

    fn unsigned_of(&self, ty: &str) -> Option<&'static str> {
        match (self.dialect, ty) {
            (_, "i8") => Some("u8"),
            (_, "i16") => Some("u16"),
            (_, "i32") => Some("u32"),
            // sqlx has no u64 for sqlite
            (Dialect::Sqlite, "i64") => None,
            (_, "i64") => Some("u64"),
            _ => None,
        }
    }
}

fn is_signed_int(ty: &str) -> bool {
    matches!(ty, "i8" | "i16" | "i32" | "i64")
}

fn postgres_type(t: &str) -> Option<&'static str> {
    Some(match t {
        "bool" => "bool",
        "int2" | "smallserial" => "i16",
        "int4" | "serial" => "i32",
        "int8" | "bigserial" => "i64",
        "float4" => "f32",
        "float8" => "f64",
        "text" | "varchar" | "char" | "bpchar" | "name" | "citext" => "String",
        "uuid" => "uuid::Uuid",
        "json" | "jsonb" => "serde_json::Value",
        "timestamptz" => "chrono::DateTime<chrono::Utc>",
        "timestamp" => "chrono::NaiveDateTime",
        "date" => "chrono::NaiveDate",
        "time" => "chrono::NaiveTime",
        "bytea" => "Vec<u8>",
        _ => return None,
    })
}

fn mysql_type(t: &str) -> Option<&'static str> {
    Some(match t {
        "bool" | "boolean" => "bool",
        "tinyint" => "i8",
        "smallint" => "i16",
        "year" => "u16",
        "mediumint" | "int" | "integer" => "i32",
        "bigint" => "i64",
        "float" => "f32",
        "double" | "real" => "f64",
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set" => {
            "String"
        }
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" | "bit" => {
            "Vec<u8>"
        }
        "json" => "serde_json::Value",
        "datetime" => "chrono::NaiveDateTime",
        "timestamp" => "chrono::DateTime<chrono::Utc>",
        "date" => "chrono::NaiveDate",
        "time" => "chrono::NaiveTime",
        _ => return None,
    })
}

fn sqlite_type(t: &str) -> Option<&'static str> {
    Some(match t {
        "bool" | "boolean" => "bool",
        "tinyint" => "i8",
        "smallint" | "int2" => "i16",
        "int" | "mediumint" | "int4" => "i32",
        "integer" | "bigint" | "int8" => "i64",
        "real" | "double" | "double precision" | "float" | "numeric" | "decimal" => "f64",
        "text" | "varchar" | "char" | "character" | "nvarchar" | "nchar" | "clob" => "String",
        "blob" => "Vec<u8>",
        "datetime" | "timestamp" => "chrono::NaiveDateTime",
        "date" => "chrono::NaiveDate",
        "time" => "chrono::NaiveTime",
        _ => return None,
    })
}

// sqlx 0.6 decodes only these natively; the rest go through `sqlserver_conversion`.
fn sqlserver_type(t: &str) -> Option<&'static str> {
    Some(match t {
        "bit" => "bool",
        "tinyint" => "u8",
        "smallint" => "i16",
        "int" => "i32",
        "bigint" => "i64",
        "real" => "f32",
        "float" => "f64",
        "char" | "varchar" | "nchar" | "nvarchar" | "text" | "ntext" | "xml"
        | "uniqueidentifier" | "decimal" | "numeric" | "money" | "smallmoney" | "datetime"
        | "datetime2" | "smalldatetime" | "datetimeoffset" | "date" | "time" | "binary"
        | "varbinary" | "image" => "String",
        _ => return None,
    })
}

fn sqlserver_conversion(t: &str) -> Option<Conversion> {
    match t {
        "datetime" | "smalldatetime" => Some(Conversion::Iso8601),
        "binary" | "varbinary" | "image" => Some(Conversion::Hex),
        "text" | "ntext" | "xml" | "uniqueidentifier" | "decimal" | "numeric" | "money"
        | "smallmoney" | "datetime2" | "datetimeoffset" | "date" | "time" => Some(Conversion::Text),
        _ => None,
    }
}

fn collapse(t: &str) -> String {
    t.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
