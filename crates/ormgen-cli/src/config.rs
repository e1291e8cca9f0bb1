use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level shape of the `-c` config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Parsed but not enforced.
    #[serde(default, deserialize_with = "de_version")]
    pub version: Option<String>,
    pub database: Option<FileParams>,
}

/// The `database` section. Absent keys leave the lower layer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileParams {
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
    /// Database type -> Rust type overrides.
    #[serde(default)]
    pub types: BTreeMap<String, String>,
}

/// Load the `database` section of a config file.
///
/// YAML unless the file has a `.toml` extension. Returns `Ok(None)` when the
/// file parses but has no `database` section.
pub fn load_config_file(path: &Path) -> anyhow::Result<Option<FileParams>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let file: ConfigFile = if is_toml {
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?
    } else if raw.trim().is_empty() {
        ConfigFile::default()
    } else {
        serde_yaml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?
    };

    tracing::debug!(
        path = %path.display(),
        version = file.version.as_deref().unwrap_or(""),
        "loaded config file"
    );

    let Some(mut params) = file.database else {
        return Ok(None);
    };
    params.expand_env()?;
    Ok(Some(params))
}

impl FileParams {
    fn expand_env(&mut self) -> anyhow::Result<()> {
        for s in [
            &mut self.dsn,
            &mut self.db,
            &mut self.out_path,
            &mut self.out_file,
            &mut self.model_pkg_name,
        ]
        .into_iter()
        .flatten()
        {
            *s = expand_env_vars(s)?;
        }

        for t in self.tables.iter_mut().flatten() {
            *t = expand_env_vars(t)?;
        }

        Ok(())
    }
}

fn de_version<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // `version: 0.1` arrives as a number
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVersion {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<RawVersion>::deserialize(deserializer)?.map(|v| match v {
        RawVersion::Text(s) => s,
        RawVersion::Int(i) => i.to_string(),
        RawVersion::Float(f) => f.to_string(),
    }))
}

/// Replace `${NAME}` references with the value of the environment variable.
fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            anyhow::bail!("unterminated env var reference in {input:?}");
        };
        let key = &after[..end];
        if key.is_empty() {
            anyhow::bail!("invalid env var reference: ${{}}");
        }
        let v = std::env::var(key)
            .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
        out.push_str(&v);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
