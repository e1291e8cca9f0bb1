use crate::codegen::{GENERATED_HEADER, GeneratedFile};
use crate::ident::{bare, field_ident, type_ident};
use crate::params::Parameters;
use crate::type_mapper::{Conversion, TypeMapper};
use ormgen_schema::{ColumnInfo, DbSchema, TableInfo};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

/// One table's model, with every identifier already resolved.
#[derive(Debug, Clone)]
pub struct ModelPlan<'a> {
    pub table: &'a TableInfo,
    pub module: String,
    pub struct_name: String,
    pub fields: Vec<FieldPlan<'a>>,
}

#[derive(Debug, Clone)]
pub struct FieldPlan<'a> {
    pub column: &'a ColumnInfo,
    pub ident: String,
    /// Mapped type without `Option`.
    pub base_ty: String,
    /// Type as written in the struct.
    pub ty: String,
    pub conversion: Option<Conversion>,
}

impl<'a> ModelPlan<'a> {
    pub fn field(&self, column: &str) -> Option<&FieldPlan<'a>> {
        self.fields.iter().find(|f| f.column.name == column)
    }
}

pub fn plan_models<'a>(
    params: &Parameters,
    mapper: &TypeMapper,
    schema: &'a DbSchema,
) -> anyhow::Result<Vec<ModelPlan<'a>>> {
    let mut seen_modules: HashSet<String> = HashSet::new();
    let mut seen_structs: HashSet<String> = HashSet::new();
    let mut plans = Vec::with_capacity(schema.tables.len());

    for t in &schema.tables {
        let module = field_ident(&t.name);
        if !seen_modules.insert(module.clone()) {
            anyhow::bail!("duplicate module name after sanitization: {module} (table: {})", t.name);
        }
        if bare(&module) == "mod" {
            anyhow::bail!("table {} would generate a module file named mod.rs", t.name);
        }

        let struct_name = type_ident(&t.name);
        if !seen_structs.insert(struct_name.clone()) {
            anyhow::bail!(
                "duplicate model struct name after sanitization: {struct_name} (table: {})",
                t.name
            );
        }

        let mut seen_fields: HashSet<String> = HashSet::new();
        let mut fields = Vec::with_capacity(t.columns.len());
        for c in &t.columns {
            let ident = field_ident(&c.name);
            if !seen_fields.insert(ident.clone()) {
                anyhow::bail!("duplicate field name after sanitization in {}: {ident}", t.name);
            }

            let mapped = mapper.map_column(c, params.field_signable);
            let ty = if params.field_nullable && !c.not_null {
                format!("Option<{}>", mapped.ty)
            } else {
                mapped.ty.clone()
            };
            fields.push(FieldPlan {
                column: c,
                ident,
                base_ty: mapped.ty,
                ty,
                conversion: mapped.conversion,
            });
        }

        plans.push(ModelPlan {
            table: t,
            module,
            struct_name,
            fields,
        });
    }

    Ok(plans)
}

pub fn generate_models(
    params: &Parameters,
    plans: &[ModelPlan<'_>],
    out_dir: &Path,
) -> Vec<GeneratedFile> {
    let mut files = Vec::with_capacity(plans.len() + 1);

    files.push(GeneratedFile {
        path: out_dir.join("mod.rs"),
        content: render_models_mod_rs(plans),
    });

    for plan in plans {
        files.push(GeneratedFile {
            path: out_dir.join(format!("{}.rs", bare(&plan.module))),
            content: render_model(params, plan),
        });
    }

    files
}

fn render_models_mod_rs(plans: &[ModelPlan<'_>]) -> String {
    let mut lines: Vec<(&str, &str)> = plans
        .iter()
        .map(|p| (p.module.as_str(), p.struct_name.as_str()))
        .collect();
    lines.sort();

    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    for (module, _) in &lines {
        let _ = writeln!(out, "pub mod {module};");
    }
    out.push('\n');
    for (module, struct_name) in &lines {
        let _ = writeln!(out, "pub use {module}::{struct_name};");
    }
    out
}

fn render_model(params: &Parameters, plan: &ModelPlan<'_>) -> String {
    let t = plan.table;
    let mut out = String::new();
    out.push_str(GENERATED_HEADER);

    let _ = writeln!(out, "/// Row of the `{}` table.", t.name);
    out.push_str("#[derive(Debug, Clone, sqlx::FromRow)]\n");
    let _ = writeln!(out, "pub struct {} {{", plan.struct_name);

    for f in &plan.fields {
        let c = f.column;
        if params.field_with_type_tag {
            let _ = writeln!(out, "    /// Column type: {}", c.column_type);
        }
        if params.field_with_index_tag {
            for idx in t.indexes_for(&c.name) {
                let kind = if idx.primary {
                    " (primary key)"
                } else if idx.unique {
                    " (unique)"
                } else {
                    ""
                };
                let _ = writeln!(out, "    /// Index: {}{kind}", idx.name);
            }
        }
        if bare(&f.ident) != c.name {
            let _ = writeln!(out, "    #[sqlx(rename = {:?})]", c.name);
        }
        let _ = writeln!(out, "    pub {}: {},", f.ident, f.ty);
    }
    out.push_str("}\n\n");

    let _ = writeln!(out, "impl {} {{", plan.struct_name);
    let _ = writeln!(out, "    pub const TABLE_NAME: &'static str = {:?};", t.name);
    out.push_str("}\n");

    out
}
