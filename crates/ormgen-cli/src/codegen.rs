use crate::ident::{bare, field_ident};
use crate::model_codegen::{generate_models, plan_models};
use crate::params::Parameters;
use crate::query_codegen::generate_queries;
use crate::type_mapper::TypeMapper;
use ormgen_schema::DbSchema;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const GENERATED_HEADER: &str = "// @generated by ormgen. Do not edit.\n\n";

pub const DEFAULT_MODEL_PKG: &str = "model";
pub const DEFAULT_QUERY_FILE: &str = "mod.rs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

/// Where models and queries land on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Module name of the model directory, as referenced from query files.
    pub model_module: String,
    pub model_dir: PathBuf,
    pub query_dir: PathBuf,
    /// File name of the query root module (`mod.rs` unless `outFile` is set).
    pub query_root: String,
}

impl OutputLayout {
    pub fn new(params: &Parameters) -> anyhow::Result<Self> {
        let pkg = if params.model_pkg_name.is_empty() {
            DEFAULT_MODEL_PKG
        } else {
            params.model_pkg_name.as_str()
        };
        let model_module = field_ident(pkg);
        let model_dir = params
            .out_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(bare(&model_module));

        let query_root = if params.out_file.is_empty() {
            DEFAULT_QUERY_FILE.to_string()
        } else {
            let file = Path::new(&params.out_file).with_extension("rs");
            match (file.parent(), file.file_name().and_then(|n| n.to_str())) {
                (Some(p), Some(name)) if p.as_os_str().is_empty() => name.to_string(),
                _ => anyhow::bail!("outFile must be a plain file name: {}", params.out_file),
            }
        };

        Ok(Self {
            model_module,
            model_dir,
            query_dir: params.out_path.clone(),
            query_root,
        })
    }
}

/// Render every file for `schema`. Nothing is written here.
pub fn generate_files(params: &Parameters, schema: &DbSchema) -> anyhow::Result<Vec<GeneratedFile>> {
    let layout = OutputLayout::new(params)?;
    let mapper = TypeMapper::new(params.driver, params.types.clone());
    let plans = plan_models(params, &mapper, schema)?;

    let mut files = generate_models(params, &plans, &layout.model_dir);
    if params.only_model {
        tracing::debug!("onlyModel set, skipping query modules");
    } else {
        files.extend(generate_queries(params, &layout, &plans)?);
    }

    let mut seen: HashSet<&Path> = HashSet::new();
    for f in &files {
        if !seen.insert(f.path.as_path()) {
            anyhow::bail!(
                "two generated files map to {}; choose a different outPath or modelPkgName",
                f.path.display()
            );
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_codegen::tests::{params, users_schema};
    use ormgen_schema::Dialect;

    #[test]
    fn default_layout_is_sibling_model_dir() {
        let layout = OutputLayout::new(&params(Dialect::MySql)).unwrap();
        assert_eq!(layout.model_dir, PathBuf::from("dao/model"));
        assert_eq!(layout.query_dir, PathBuf::from("dao/query"));
        assert_eq!(layout.query_root, "mod.rs");
        assert_eq!(layout.model_module, "model");
    }

    #[test]
    fn out_file_and_model_pkg_are_honored() {
        let p = Parameters {
            out_file: "gen.go".to_string(),
            model_pkg_name: "entity".to_string(),
            ..params(Dialect::MySql)
        };
        let layout = OutputLayout::new(&p).unwrap();
        assert_eq!(layout.query_root, "gen.rs");
        assert_eq!(layout.model_dir, PathBuf::from("dao/entity"));

        let nested = Parameters {
            out_file: "sub/gen.rs".to_string(),
            ..params(Dialect::MySql)
        };
        assert!(OutputLayout::new(&nested).is_err());
    }

    #[test]
    fn only_model_emits_no_query_files() {
        let schema = users_schema(Dialect::MySql);
        let p = Parameters {
            only_model: true,
            ..params(Dialect::MySql)
        };
        let files = generate_files(&p, &schema).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("dao/model/mod.rs"), PathBuf::from("dao/model/users.rs")]
        );
    }

    #[test]
    fn full_generation_includes_queries() {
        let schema = users_schema(Dialect::Postgres);
        let files = generate_files(&params(Dialect::Postgres), &schema).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert!(paths.contains(&PathBuf::from("dao/query/mod.rs")));
        assert!(paths.contains(&PathBuf::from("dao/query/users.rs")));
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn overlapping_dirs_are_rejected() {
        let schema = users_schema(Dialect::Sqlite);
        let p = Parameters {
            out_path: PathBuf::from("dao/model"),
            ..params(Dialect::Sqlite)
        };
        let err = generate_files(&p, &schema).unwrap_err();
        assert!(err.to_string().contains("two generated files"));
    }
}
