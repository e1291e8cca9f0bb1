//! Layered configuration: built-in defaults, then the config file, then flags.

use crate::config::{FileParams, load_config_file};
use crate::params::{ConfigError, MergedParams, Parameters};
use std::path::Path;

/// Values given on the command line. `None` means the flag was not passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub dsn: Option<String>,
    pub db: Option<String>,
    pub tables: Option<Vec<String>>,
    pub only_model: Option<bool>,
    pub out_path: Option<String>,
    pub out_file: Option<String>,
    pub with_unit_test: Option<bool>,
    pub model_pkg_name: Option<String>,
    pub field_nullable: Option<bool>,
    pub field_with_index_tag: Option<bool>,
    pub field_with_type_tag: Option<bool>,
    pub field_signable: Option<bool>,
}

/// Resolve the effective parameters.
///
/// A config file that cannot be read or parsed is skipped with a warning;
/// resolution continues from defaults and flags.
pub fn resolve(config: Option<&Path>, cli: &CliOverrides) -> Result<Parameters, ConfigError> {
    let file = config.and_then(|path| match load_config_file(path) {
        Ok(Some(file)) => Some(file),
        Ok(None) => {
            tracing::warn!(
                "config file {} has no `database` section, ignoring it",
                path.display()
            );
            None
        }
        Err(e) => {
            tracing::warn!("ignoring config file: {e:#}");
            None
        }
    });

    merge(file.as_ref(), cli).validate()
}

/// Apply the file layer and then the flag layer over the defaults.
pub fn merge(file: Option<&FileParams>, cli: &CliOverrides) -> MergedParams {
    let mut merged = MergedParams::default();
    if let Some(file) = file {
        apply_file(&mut merged, file);
    }
    apply_cli(&mut merged, cli);
    merged
}

fn apply_file(m: &mut MergedParams, f: &FileParams) {
    set_string(&mut m.dsn, &f.dsn);
    set_string(&mut m.db, &f.db);
    if let Some(tables) = &f.tables {
        m.tables = tables.clone();
    }
    set_bool(&mut m.only_model, f.only_model);
    set_string(&mut m.out_path, &f.out_path);
    set_string(&mut m.out_file, &f.out_file);
    set_bool(&mut m.with_unit_test, f.with_unit_test);
    set_string(&mut m.model_pkg_name, &f.model_pkg_name);
    set_bool(&mut m.field_nullable, f.field_nullable);
    set_bool(&mut m.field_with_index_tag, f.field_with_index_tag);
    set_bool(&mut m.field_with_type_tag, f.field_with_type_tag);
    set_bool(&mut m.field_signable, f.field_signable);
    m.types.extend(f.types.iter().map(|(k, v)| (k.clone(), v.clone())));
}

fn apply_cli(m: &mut MergedParams, c: &CliOverrides) {
    set_string(&mut m.dsn, &c.dsn);
    set_string(&mut m.db, &c.db);
    if let Some(tables) = c.tables.as_ref().filter(|t| !t.is_empty()) {
        m.tables = tables.clone();
    }
    set_bool(&mut m.only_model, c.only_model);
    set_string(&mut m.out_path, &c.out_path);
    set_string(&mut m.out_file, &c.out_file);
    set_bool(&mut m.with_unit_test, c.with_unit_test);
    set_string(&mut m.model_pkg_name, &c.model_pkg_name);
    set_bool(&mut m.field_nullable, c.field_nullable);
    set_bool(&mut m.field_with_index_tag, c.field_with_index_tag);
    set_bool(&mut m.field_with_type_tag, c.field_with_type_tag);
    set_bool(&mut m.field_signable, c.field_signable);
}

// Empty strings count as "not given" in both layers.
fn set_string(slot: &mut String, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        *slot = v.to_string();
    }
}

fn set_bool(slot: &mut bool, value: Option<bool>) {
    if let Some(v) = value {
        *slot = v;
    }
}
