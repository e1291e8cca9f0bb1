use ormgen_schema::Dialect;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DRIVER: &str = "mysql";
pub const DEFAULT_OUT_PATH: &str = "./dao/query";

/// Raised while resolving configuration, before any connection is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("dsn cannot be empty (pass -dsn or set database.dsn in the -c config file)")]
    EmptyDsn,
    #[error("unknown db {0:?} (support mysql || postgres || sqlite || sqlserver)")]
    UnsupportedDriver(String),
    #[error("outPath cannot be empty")]
    EmptyOutPath,
}

/// Effective generation settings, fully resolved and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    pub dsn: String,
    pub driver: Dialect,
    /// Tables to generate, in order; empty means every table.
    pub tables: Vec<String>,
    pub only_model: bool,
    pub out_path: PathBuf,
    pub out_file: String,
    pub with_unit_test: bool,
    pub model_pkg_name: String,
    pub field_nullable: bool,
    pub field_with_index_tag: bool,
    pub field_with_type_tag: bool,
    pub field_signable: bool,
    pub types: BTreeMap<String, String>,
}

/// Settings after merging, before validation. Starts at the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedParams {
    pub dsn: String,
    pub db: String,
    pub tables: Vec<String>,
    pub only_model: bool,
    pub out_path: String,
    pub out_file: String,
    pub with_unit_test: bool,
    pub model_pkg_name: String,
    pub field_nullable: bool,
    pub field_with_index_tag: bool,
    pub field_with_type_tag: bool,
    pub field_signable: bool,
    pub types: BTreeMap<String, String>,
}

impl Default for MergedParams {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            db: DEFAULT_DRIVER.to_string(),
            tables: Vec::new(),
            only_model: false,
            out_path: DEFAULT_OUT_PATH.to_string(),
            out_file: String::new(),
            with_unit_test: false,
            model_pkg_name: String::new(),
            field_nullable: false,
            field_with_index_tag: false,
            field_with_type_tag: false,
            field_signable: false,
            types: BTreeMap::new(),
        }
    }
}

impl MergedParams {
    pub fn validate(self) -> Result<Parameters, ConfigError> {
        if self.dsn.trim().is_empty() {
            return Err(ConfigError::EmptyDsn);
        }
        let driver: Dialect = self
            .db
            .parse()
            .map_err(|_| ConfigError::UnsupportedDriver(self.db.clone()))?;
        if self.out_path.trim().is_empty() {
            return Err(ConfigError::EmptyOutPath);
        }

        Ok(Parameters {
            dsn: self.dsn,
            driver,
            tables: ordered_set(self.tables),
            only_model: self.only_model,
            out_path: PathBuf::from(self.out_path.trim()),
            out_file: self.out_file.trim().to_string(),
            with_unit_test: self.with_unit_test,
            model_pkg_name: self.model_pkg_name.trim().to_string(),
            field_nullable: self.field_nullable,
            field_with_index_tag: self.field_with_index_tag,
            field_with_type_tag: self.field_with_type_tag,
            field_signable: self.field_signable,
            types: self.types,
        })
    }
}

/// Trim, drop blanks and keep the first occurrence of each name.
fn ordered_set(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() || out.iter().any(|n| n == name) {
            continue;
        }
        out.push(name.to_string());
    }
    out
}
