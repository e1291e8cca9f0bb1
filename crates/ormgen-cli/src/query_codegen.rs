use crate::codegen::{GENERATED_HEADER, GeneratedFile, OutputLayout};
use crate::ident::bare;
use crate::model_codegen::{FieldPlan, ModelPlan};
use crate::params::Parameters;
use ormgen_schema::Dialect;
use std::fmt::Write as _;

/// Query modules for every table plus the root module tying them together.
pub fn generate_queries(
    params: &Parameters,
    layout: &OutputLayout,
    plans: &[ModelPlan<'_>],
) -> anyhow::Result<Vec<GeneratedFile>> {
    let mut files = Vec::with_capacity(plans.len() + 1);

    for plan in plans {
        let file_name = format!("{}.rs", bare(&plan.module));
        if file_name == layout.query_root {
            anyhow::bail!(
                "table {} would overwrite the query root file {}",
                plan.table.name,
                layout.query_root
            );
        }
        files.push(GeneratedFile {
            path: layout.query_dir.join(file_name),
            content: render_table_query(params, layout, plan),
        });
    }

    files.push(GeneratedFile {
        path: layout.query_dir.join(&layout.query_root),
        content: render_query_root(params.driver, layout, plans),
    });

    Ok(files)
}

/// SQL for one table, rendered for a dialect.
struct TableSql<'p, 'a> {
    dialect: Dialect,
    plan: &'p ModelPlan<'a>,
    table: String,
    select_list: String,
}

impl<'p, 'a> TableSql<'p, 'a> {
    fn new(dialect: Dialect, plan: &'p ModelPlan<'a>) -> Self {
        let select_list = plan
            .fields
            .iter()
            .map(|f| {
                let name = dialect.quote_ident(&f.column.name);
                match f.conversion {
                    Some(c) => c.read(&name),
                    None => name,
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            dialect,
            plan,
            table: dialect.quote_ident(&plan.table.name),
            select_list,
        }
    }

    fn find_all(&self) -> String {
        format!("SELECT {} FROM {}", self.select_list, self.table)
    }

    fn count(&self) -> String {
        let count = match self.dialect {
            Dialect::SqlServer => "COUNT_BIG(*)",
            _ => "COUNT(*)",
        };
        format!("SELECT {count} FROM {}", self.table)
    }

    fn find_where(&self, columns: &[&FieldPlan<'_>]) -> String {
        format!("{} WHERE {}", self.find_all(), self.conditions(columns, 1))
    }

    fn insert(&self, columns: &[&FieldPlan<'_>]) -> String {
        if columns.is_empty() {
            return match self.dialect {
                Dialect::MySql => format!("INSERT INTO {} () VALUES ()", self.table),
                _ => format!("INSERT INTO {} DEFAULT VALUES", self.table),
            };
        }
        let names = columns
            .iter()
            .map(|f| self.dialect.quote_ident(&f.column.name))
            .collect::<Vec<_>>()
            .join(", ");
        let values = columns
            .iter()
            .enumerate()
            .map(|(i, f)| self.value(f, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO {} ({names}) VALUES ({values})", self.table)
    }

    fn update(&self, set: &[&FieldPlan<'_>], key: &[&FieldPlan<'_>]) -> String {
        let assignments = set
            .iter()
            .enumerate()
            .map(|(i, f)| {
                format!(
                    "{} = {}",
                    self.dialect.quote_ident(&f.column.name),
                    self.value(f, i + 1)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {assignments} WHERE {}",
            self.table,
            self.conditions(key, set.len() + 1)
        )
    }

    fn delete(&self, key: &[&FieldPlan<'_>]) -> String {
        format!("DELETE FROM {} WHERE {}", self.table, self.conditions(key, 1))
    }

    fn conditions(&self, columns: &[&FieldPlan<'_>], first: usize) -> String {
        columns
            .iter()
            .enumerate()
            .map(|(i, f)| {
                format!(
                    "{} = {}",
                    self.dialect.quote_ident(&f.column.name),
                    self.value(f, first + i)
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Bind placeholder `n`, converted for the column it is stored into.
    fn value(&self, field: &FieldPlan<'_>, n: usize) -> String {
        let placeholder = self.dialect.placeholder(n);
        match field.conversion {
            Some(c) => c.write(&placeholder),
            None => placeholder,
        }
    }

    /// Single-column secondary indexes in column order; unique wins when a
    /// column has both kinds.
    fn lookup_columns(&self, key: &[&FieldPlan<'_>]) -> Vec<(&'p FieldPlan<'a>, bool)> {
        let plan = self.plan;
        let mut out: Vec<(&'p FieldPlan<'a>, bool)> = Vec::new();
        for f in &plan.fields {
            if key.len() == 1 && key[0].column.name == f.column.name {
                continue;
            }
            let mut found: Option<bool> = None;
            for idx in &plan.table.indexes {
                if idx.primary || idx.columns.len() != 1 || idx.columns[0] != f.column.name {
                    continue;
                }
                found = Some(found.unwrap_or(false) || idx.unique);
            }
            if let Some(unique) = found {
                out.push((f, unique));
            }
        }
        out
    }
}

struct Statement {
    konst: String,
    sql: String,
}

fn render_table_query(params: &Parameters, layout: &OutputLayout, plan: &ModelPlan<'_>) -> String {
    let dialect = params.driver;
    let sql = TableSql::new(dialect, plan);
    let pool = dialect.sqlx_pool_type();
    let model = &plan.struct_name;
    let query = format!("{model}Query");

    let key: Vec<&FieldPlan<'_>> = plan
        .table
        .primary_key()
        .iter()
        .filter_map(|c| plan.field(&c.name))
        .collect();
    let insertable: Vec<&FieldPlan<'_>> = plan
        .fields
        .iter()
        .filter(|f| !f.column.auto_increment)
        .collect();
    let settable: Vec<&FieldPlan<'_>> = plan
        .fields
        .iter()
        .filter(|f| !key.iter().any(|k| k.column.name == f.column.name))
        .collect();
    let lookups = sql.lookup_columns(&key);
    let key_suffix = key
        .iter()
        .map(|f| bare(&f.ident))
        .collect::<Vec<_>>()
        .join("_and_");

    let mut statements = vec![
        Statement {
            konst: "FIND_ALL_SQL".to_string(),
            sql: sql.find_all(),
        },
        Statement {
            konst: "COUNT_SQL".to_string(),
            sql: sql.count(),
        },
        Statement {
            konst: "INSERT_SQL".to_string(),
            sql: sql.insert(&insertable),
        },
    ];
    let key_const = key_suffix.to_uppercase();
    if !key.is_empty() {
        statements.push(Statement {
            konst: format!("FIND_BY_{key_const}_SQL"),
            sql: sql.find_where(&key),
        });
        if !settable.is_empty() {
            statements.push(Statement {
                konst: format!("UPDATE_BY_{key_const}_SQL"),
                sql: sql.update(&settable, &key),
            });
        }
        statements.push(Statement {
            konst: format!("DELETE_BY_{key_const}_SQL"),
            sql: sql.delete(&key),
        });
    }
    for (f, _) in &lookups {
        statements.push(Statement {
            konst: format!("FIND_BY_{}_SQL", bare(&f.ident).to_uppercase()),
            sql: sql.find_where(&[*f]),
        });
    }

    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    let _ = writeln!(out, "use super::super::{}::{model};\n", layout.model_module);

    for s in &statements {
        let _ = writeln!(out, "const {}: &str = {:?};", s.konst, s.sql);
    }
    out.push('\n');

    let _ = writeln!(out, "/// Queries against the `{}` table.", plan.table.name);
    out.push_str("#[derive(Debug, Clone, Copy)]\n");
    let _ = writeln!(out, "pub struct {query}<'a> {{");
    let _ = writeln!(out, "    pool: &'a {pool},");
    out.push_str("}\n\n");

    let _ = writeln!(out, "impl<'a> {query}<'a> {{");
    let _ = writeln!(out, "    pub fn new(pool: &'a {pool}) -> Self {{");
    out.push_str("        Self { pool }\n    }\n\n");

    let _ = writeln!(
        out,
        "    pub async fn find_all(&self) -> Result<Vec<{model}>, sqlx::Error> {{"
    );
    let _ = writeln!(
        out,
        "        sqlx::query_as::<_, {model}>(FIND_ALL_SQL).fetch_all(self.pool).await"
    );
    out.push_str("    }\n\n");

    out.push_str("    pub async fn count(&self) -> Result<i64, sqlx::Error> {\n");
    out.push_str("        sqlx::query_scalar::<_, i64>(COUNT_SQL).fetch_one(self.pool).await\n");
    out.push_str("    }\n");

    if !key.is_empty() {
        let args = fn_args(&key);
        let binds = key_binds(&key);

        out.push('\n');
        let _ = writeln!(
            out,
            "    pub async fn find_by_{key_suffix}(&self, {args}) -> Result<Option<{model}>, sqlx::Error> {{"
        );
        let _ = writeln!(
            out,
            "        sqlx::query_as::<_, {model}>(FIND_BY_{key_const}_SQL){binds}.fetch_optional(self.pool).await"
        );
        out.push_str("    }\n");
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "    pub async fn insert(&self, row: &{model}) -> Result<u64, sqlx::Error> {{"
    );
    render_execute(&mut out, "INSERT_SQL", &row_binds(&insertable));
    out.push_str("    }\n");

    if !key.is_empty() {
        if !settable.is_empty() {
            let mut binds = row_binds(&settable);
            binds.push_str(&row_binds(&key));
            out.push('\n');
            let _ = writeln!(
                out,
                "    pub async fn update_by_{key_suffix}(&self, row: &{model}) -> Result<u64, sqlx::Error> {{"
            );
            render_execute(&mut out, &format!("UPDATE_BY_{key_const}_SQL"), &binds);
            out.push_str("    }\n");
        }

        out.push('\n');
        let _ = writeln!(
            out,
            "    pub async fn delete_by_{key_suffix}(&self, {}) -> Result<u64, sqlx::Error> {{",
            fn_args(&key)
        );
        render_execute(
            &mut out,
            &format!("DELETE_BY_{key_const}_SQL"),
            &key_binds(&key),
        );
        out.push_str("    }\n");
    }

    for (f, unique) in &lookups {
        let name = bare(&f.ident);
        let konst = format!("FIND_BY_{}_SQL", name.to_uppercase());
        let (ret, fetch) = if *unique {
            (format!("Option<{model}>"), "fetch_optional")
        } else {
            (format!("Vec<{model}>"), "fetch_all")
        };
        out.push('\n');
        let _ = writeln!(
            out,
            "    pub async fn find_by_{name}(&self, {}) -> Result<{ret}, sqlx::Error> {{",
            fn_args(&[*f])
        );
        let _ = writeln!(
            out,
            "        sqlx::query_as::<_, {model}>({konst}){}.{fetch}(self.pool).await",
            key_binds(&[*f])
        );
        out.push_str("    }\n");
    }

    out.push_str("}\n");

    if params.with_unit_test {
        render_unit_tests(&mut out, dialect, plan, &query, &statements, &sql.table);
    }

    out
}

fn render_execute(out: &mut String, konst: &str, binds: &str) {
    let _ = writeln!(out, "        let result = sqlx::query({konst}){binds}");
    out.push_str("            .execute(self.pool)\n");
    out.push_str("            .await?;\n");
    out.push_str("        Ok(result.rows_affected())\n");
}

/// Borrowed parameter type for a lookup argument.
fn arg_type(ty: &str) -> String {
    match ty {
        "String" => "&str".to_string(),
        "Vec<u8>" => "&[u8]".to_string(),
        other => other.to_string(),
    }
}

fn fn_args(fields: &[&FieldPlan<'_>]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.ident, arg_type(&f.base_ty)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_binds(fields: &[&FieldPlan<'_>]) -> String {
    fields.iter().map(|f| format!(".bind({})", f.ident)).collect()
}

fn row_binds(fields: &[&FieldPlan<'_>]) -> String {
    fields
        .iter()
        .map(|f| format!("\n            .bind(&row.{})", f.ident))
        .collect()
}

fn render_unit_tests(
    out: &mut String,
    dialect: Dialect,
    plan: &ModelPlan<'_>,
    query: &str,
    statements: &[Statement],
    quoted_table: &str,
) {
    let name = bare(&plan.module);
    out.push_str("\n#[cfg(test)]\nmod tests {\n    use super::*;\n\n");

    out.push_str("    #[test]\n");
    let _ = writeln!(out, "    fn statements_target_{name}() {{");
    for s in statements {
        let _ = writeln!(out, "        assert!({}.contains({:?}));", s.konst, quoted_table);
    }
    out.push_str("    }\n\n");

    out.push_str("    #[tokio::test]\n");
    out.push_str("    #[ignore = \"requires DATABASE_URL\"]\n");
    let _ = writeln!(out, "    async fn reads_{name}() {{");
    out.push_str(
        "        let url = std::env::var(\"DATABASE_URL\").expect(\"DATABASE_URL must be set\");\n",
    );
    let _ = writeln!(
        out,
        "        let pool = {}::connect(&url).await.expect(\"connect\");",
        dialect.sqlx_pool_type()
    );
    let _ = writeln!(out, "        let query = {query}::new(&pool);");
    out.push_str("        let total = query.count().await.expect(\"count\");\n");
    out.push_str("        let rows = query.find_all().await.expect(\"find_all\");\n");
    out.push_str("        assert_eq!(rows.len() as i64, total);\n");
    out.push_str("    }\n}\n");
}

fn render_query_root(dialect: Dialect, layout: &OutputLayout, plans: &[ModelPlan<'_>]) -> String {
    let pool = dialect.sqlx_pool_type();
    let needs_path = layout.query_root != "mod.rs";

    let mut sorted: Vec<&ModelPlan<'_>> = plans.iter().collect();
    sorted.sort_by(|a, b| a.module.cmp(&b.module));

    let mut out = String::new();
    out.push_str(GENERATED_HEADER);

    for p in &sorted {
        if needs_path {
            let _ = writeln!(out, "#[path = \"{}.rs\"]", bare(&p.module));
        }
        let _ = writeln!(out, "pub mod {};", p.module);
    }
    out.push('\n');
    for p in &sorted {
        let _ = writeln!(out, "pub use {}::{}Query;", p.module, p.struct_name);
    }
    out.push('\n');

    out.push_str("/// Entry point for the generated table queries.\n");
    out.push_str("#[derive(Debug, Clone)]\n");
    let _ = writeln!(out, "pub struct Query {{\n    pool: {pool},\n}}\n");

    out.push_str("impl Query {\n");
    let _ = writeln!(out, "    pub fn new(pool: {pool}) -> Self {{");
    out.push_str("        Self { pool }\n    }\n\n");
    let _ = writeln!(out, "    pub fn pool(&self) -> &{pool} {{");
    out.push_str("        &self.pool\n    }\n");

    for p in &sorted {
        let accessor = match bare(&p.module) {
            "new" | "pool" => format!("{}_query", bare(&p.module)),
            _ => p.module.clone(),
        };
        out.push('\n');
        let _ = writeln!(
            out,
            "    pub fn {accessor}(&self) -> {}Query<'_> {{",
            p.struct_name
        );
        let _ = writeln!(out, "        {}Query::new(&self.pool)", p.struct_name);
        out.push_str("    }\n");
    }
    out.push_str("}\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::generate_files;
    use crate::model_codegen::tests::{column, params, users_schema};
    use ormgen_schema::{DbSchema, IndexInfo};

    fn file(files: &[GeneratedFile], suffix: &str) -> String {
        files
            .iter()
            .find(|f| f.path.ends_with(suffix))
            .unwrap_or_else(|| panic!("missing {suffix}"))
            .content
            .clone()
    }

    #[test]
    fn mysql_query_module() {
        let schema = users_schema(Dialect::MySql);
        let files = generate_files(&params(Dialect::MySql), &schema).unwrap();
        let q = file(&files, "query/users.rs");

        assert!(q.contains("use super::super::model::Users;"));
        assert!(q.contains(
            "const FIND_ALL_SQL: &str = \"SELECT CAST(`id` AS SIGNED) AS `id`, `email`, `nickname`, `type`, `CreatedAt` FROM `users`\";"
        ));
        assert!(q.contains("const COUNT_SQL: &str = \"SELECT COUNT(*) FROM `users`\";"));
        assert!(q.contains(
            "const INSERT_SQL: &str = \"INSERT INTO `users` (`email`, `nickname`, `type`, `CreatedAt`) VALUES (?, ?, ?, ?)\";"
        ));
        assert!(q.contains(
            "const UPDATE_BY_ID_SQL: &str = \"UPDATE `users` SET `email` = ?, `nickname` = ?, `type` = ?, `CreatedAt` = ? WHERE `id` = ?\";"
        ));
        assert!(q.contains("pub struct UsersQuery<'a> {\n    pool: &'a sqlx::MySqlPool,\n}"));
        assert!(q.contains(
            "pub async fn find_by_id(&self, id: i64) -> Result<Option<Users>, sqlx::Error> {"
        ));
        assert!(q.contains(
            "pub async fn find_by_email(&self, email: &str) -> Result<Option<Users>, sqlx::Error> {"
        ));
        assert!(q.contains("pub async fn delete_by_id(&self, id: i64) -> Result<u64, sqlx::Error> {"));
        assert!(q.contains(".bind(&row.r#type)"));
        assert!(!q.contains("#[cfg(test)]"));
    }

    #[test]
    fn postgres_numbers_placeholders() {
        let schema = users_schema(Dialect::Postgres);
        let files = generate_files(&params(Dialect::Postgres), &schema).unwrap();
        let q = file(&files, "query/users.rs");

        assert!(q.contains("VALUES ($1, $2, $3, $4)"));
        assert!(q.contains(
            "UPDATE \\\"users\\\" SET \\\"email\\\" = $1, \\\"nickname\\\" = $2, \\\"type\\\" = $3, \\\"CreatedAt\\\" = $4 WHERE \\\"id\\\" = $5"
        ));
        assert!(q.contains("pool: &'a sqlx::PgPool,"));
    }

    #[test]
    fn sqlserver_uses_brackets_and_count_big() {
        let schema = users_schema(Dialect::SqlServer);
        let files = generate_files(&params(Dialect::SqlServer), &schema).unwrap();
        let q = file(&files, "query/users.rs");

        assert!(q.contains("SELECT COUNT_BIG(*) FROM [users]"));
        assert!(q.contains("WHERE [id] = @p1"));
        assert!(q.contains("sqlx::MssqlPool"));
    }

    #[test]
    fn signable_unsigned_columns_are_read_as_is() {
        let schema = users_schema(Dialect::MySql);
        let p = Parameters {
            field_signable: true,
            ..params(Dialect::MySql)
        };
        let files = generate_files(&p, &schema).unwrap();
        let q = file(&files, "query/users.rs");

        assert!(q.contains("\"SELECT `id`, `email`,"));
        assert!(!q.contains("AS SIGNED"));
        assert!(q.contains("pub async fn find_by_id(&self, id: u64)"));
    }

    #[test]
    fn sqlserver_converts_types_sqlx_cannot_decode() {
        let mut schema = users_schema(Dialect::SqlServer);
        let t = &mut schema.tables[0];
        t.name = "events".to_string();
        t.columns = vec![
            column("id", "int", "int", true),
            column("created_at", "datetime2", "datetime2(7)", true),
            column("logged_at", "datetime", "datetime", false),
            column("payload", "varbinary", "varbinary(max)", false),
        ];
        t.columns[0].auto_increment = true;
        t.indexes = vec![
            IndexInfo {
                name: "PK_events".to_string(),
                columns: vec!["id".to_string()],
                unique: true,
                primary: true,
            },
            IndexInfo {
                name: "idx_events_payload".to_string(),
                columns: vec!["payload".to_string()],
                unique: false,
                primary: false,
            },
        ];

        let files = generate_files(&params(Dialect::SqlServer), &schema).unwrap();
        let model = file(&files, "model/events.rs");
        assert!(model.contains("pub created_at: String,"));
        assert!(model.contains("pub logged_at: String,"));
        assert!(model.contains("pub payload: String,"));
        assert!(!model.contains("chrono"));
        assert!(!model.contains("Vec<u8>"));

        let q = file(&files, "query/events.rs");
        assert!(q.contains(
            "\"SELECT [id], CAST([created_at] AS NVARCHAR(4000)) AS [created_at], CONVERT(NVARCHAR(30), [logged_at], 126) AS [logged_at], CONVERT(NVARCHAR(4000), [payload], 2) AS [payload] FROM [events]\""
        ));
        assert!(q.contains(
            "INSERT INTO [events] ([created_at], [logged_at], [payload]) VALUES (@p1, @p2, CONVERT(VARBINARY(MAX), @p3, 2))"
        ));
        assert!(q.contains("[payload] = CONVERT(VARBINARY(MAX), @p3, 2) WHERE [id] = @p4"));
        assert!(q.contains("WHERE [payload] = CONVERT(VARBINARY(MAX), @p1, 2)"));
        assert!(q.contains("pub async fn find_by_payload(&self, payload: &str)"));
    }

    #[test]
    fn non_unique_index_returns_vec_and_composite_key_joins_names() {
        let mut schema = users_schema(Dialect::Sqlite);
        let t = &mut schema.tables[0];
        t.name = "memberships".to_string();
        t.columns = vec![
            column("org_id", "integer", "INTEGER", true),
            column("user_id", "integer", "INTEGER", true),
            column("role", "text", "TEXT", true),
            column("avatar", "blob", "BLOB", false),
        ];
        t.indexes = vec![
            IndexInfo {
                name: "primary".to_string(),
                columns: vec!["org_id".to_string(), "user_id".to_string()],
                unique: true,
                primary: true,
            },
            IndexInfo {
                name: "idx_memberships_role".to_string(),
                columns: vec!["role".to_string()],
                unique: false,
                primary: false,
            },
            IndexInfo {
                name: "idx_memberships_avatar".to_string(),
                columns: vec!["avatar".to_string()],
                unique: false,
                primary: false,
            },
        ];

        let files = generate_files(&params(Dialect::Sqlite), &schema).unwrap();
        let q = file(&files, "query/memberships.rs");

        assert!(q.contains(
            "pub async fn find_by_org_id_and_user_id(&self, org_id: i64, user_id: i64) -> Result<Option<Memberships>, sqlx::Error> {"
        ));
        assert!(q.contains("WHERE \\\"org_id\\\" = ? AND \\\"user_id\\\" = ?"));
        assert!(q.contains(
            "pub async fn find_by_role(&self, role: &str) -> Result<Vec<Memberships>, sqlx::Error> {"
        ));
        assert!(q.contains("pub async fn find_by_avatar(&self, avatar: &[u8])"));
        assert!(q.contains("pub async fn update_by_org_id_and_user_id(&self, row: &Memberships)"));
    }

    #[test]
    fn table_without_primary_key_has_no_key_methods() {
        let mut schema = users_schema(Dialect::MySql);
        schema.tables[0].indexes.clear();
        let files = generate_files(&params(Dialect::MySql), &schema).unwrap();
        let q = file(&files, "query/users.rs");

        assert!(q.contains("pub async fn insert("));
        assert!(!q.contains("find_by_"));
        assert!(!q.contains("update_by_"));
        assert!(!q.contains("delete_by_"));
    }

    #[test]
    fn unit_tests_are_opt_in() {
        let schema = users_schema(Dialect::MySql);
        let p = Parameters {
            with_unit_test: true,
            ..params(Dialect::MySql)
        };
        let files = generate_files(&p, &schema).unwrap();
        let q = file(&files, "query/users.rs");

        assert!(q.contains("#[cfg(test)]\nmod tests {"));
        assert!(q.contains("fn statements_target_users() {"));
        assert!(q.contains("assert!(FIND_ALL_SQL.contains(\"`users`\"));"));
        assert!(q.contains("#[ignore = \"requires DATABASE_URL\"]"));
        assert!(q.contains("let pool = sqlx::MySqlPool::connect(&url).await.expect(\"connect\");"));
    }

    #[test]
    fn root_module_uses_path_attributes_for_custom_file() {
        let mut schema: DbSchema = users_schema(Dialect::MySql);
        let mut new_table = schema.tables[0].clone();
        new_table.name = "new".to_string();
        schema.tables.push(new_table);

        let p = Parameters {
            out_file: "query.rs".to_string(),
            ..params(Dialect::MySql)
        };
        let files = generate_files(&p, &schema).unwrap();
        let root = file(&files, "query/query.rs");

        assert!(root.contains("#[path = \"users.rs\"]\npub mod users;"));
        assert!(root.contains("pub use users::UsersQuery;"));
        assert!(root.contains("pub fn users(&self) -> UsersQuery<'_> {"));
        assert!(root.contains("pub fn new_query(&self) -> NewQuery<'_> {"));
        assert!(root.contains("pub fn new(pool: sqlx::MySqlPool) -> Self {"));

        let default_root = file(
            &generate_files(&params(Dialect::MySql), &users_schema(Dialect::MySql)).unwrap(),
            "query/mod.rs",
        );
        assert!(!default_root.contains("#[path"));
    }

    #[test]
    fn table_named_like_root_file_is_rejected() {
        let mut schema = users_schema(Dialect::MySql);
        schema.tables[0].name = "query".to_string();
        let p = Parameters {
            out_file: "query.rs".to_string(),
            ..params(Dialect::MySql)
        };
        let err = generate_files(&p, &schema).unwrap_err();
        assert!(err.to_string().contains("query root file"));
    }
}
