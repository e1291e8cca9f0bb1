use crate::dialect::Dialect;
use crate::error::{SchemaError, SchemaResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Normalized base type, lowercase and without typmods (`varchar`, `int`).
    pub data_type: String,
    /// Type as declared in the catalog (`varchar(255)`, `int unsigned`).
    pub column_type: String,
    pub not_null: bool,
    pub default_expr: Option<String>,
    pub ordinal: i32,
    pub unsigned: bool,
    pub auto_increment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub indexes: Vec<IndexInfo>,
}

impl TableInfo {
    /// Primary key columns in key order; empty when the table has none.
    pub fn primary_key(&self) -> Vec<&ColumnInfo> {
        let Some(pk) = self.indexes.iter().find(|i| i.primary) else {
            return Vec::new();
        };
        pk.columns
            .iter()
            .filter_map(|c| self.column(c))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Indexes that include `column`, primary key first.
    pub fn indexes_for(&self, column: &str) -> Vec<&IndexInfo> {
        let mut out: Vec<&IndexInfo> = self
            .indexes
            .iter()
            .filter(|i| i.columns.iter().any(|c| c == column))
            .collect();
        out.sort_by(|a, b| b.primary.cmp(&a.primary).then_with(|| a.name.cmp(&b.name)));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSchema {
    pub dialect: Dialect,
    pub tables: Vec<TableInfo>,
}

impl DbSchema {
    pub fn find_table(&self, table: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name == table)
    }
}

/// Flat catalog rows, grouped into tables by [`assemble`].
#[derive(Debug, Default)]
pub(crate) struct CatalogRows {
    pub columns: Vec<(String, ColumnInfo)>,
    /// (table, index, column, unique, primary), in key order within an index.
    pub index_columns: Vec<(String, String, String, bool, bool)>,
}

/// Group catalog rows into `TableInfo`s in the order of `names`.
///
/// Rows for tables outside `names` are ignored; a name without any column
/// rows is reported as missing.
pub(crate) fn assemble(
    dialect: Dialect,
    schema: &str,
    names: &[String],
    rows: CatalogRows,
) -> SchemaResult<DbSchema> {
    let mut by_table: BTreeMap<&str, TableInfo> = BTreeMap::new();
    for name in names {
        by_table.insert(
            name.as_str(),
            TableInfo {
                schema: schema.to_string(),
                name: name.clone(),
                columns: Vec::new(),
                indexes: Vec::new(),
            },
        );
    }

    for (table, column) in rows.columns {
        if let Some(t) = by_table.get_mut(table.as_str()) {
            t.columns.push(column);
        }
    }

    for (table, index, column, unique, primary) in rows.index_columns {
        let Some(t) = by_table.get_mut(table.as_str()) else {
            continue;
        };
        match t.indexes.iter_mut().find(|i| i.name == index) {
            Some(existing) => existing.columns.push(column),
            None => t.indexes.push(IndexInfo {
                name: index,
                columns: vec![column],
                unique: unique || primary,
                primary,
            }),
        }
    }

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let Some(mut t) = by_table.remove(name.as_str()) else {
            // duplicate entry in `names`, already moved out
            continue;
        };
        if t.columns.is_empty() {
            return Err(SchemaError::TableNotFound(name.clone()));
        }
        t.columns.sort_by_key(|c| c.ordinal);
        tables.push(t);
    }

    Ok(DbSchema { dialect, tables })
}

/// Lowercase a declared type, strip `(...)` typmods and collapse spaces.
pub fn normalize_type(declared: &str) -> String {
    let mut s = declared.trim().to_lowercase();

    while let Some(start) = s.find('(') {
        let Some(end) = s[start..].find(')') else {
            break;
        };
        s.replace_range(start..start + end + 1, "");
    }

    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
