use crate::resolve::CliOverrides;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    Generate(GenerateArgs),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateArgs {
    pub config: Option<PathBuf>,
    pub overrides: CliOverrides,
}

/// Parse Go-style flags: `-name value`, `-name=value`, or a bare `-name` for
/// booleans. Two leading dashes are accepted as well.
pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str());
    let mut out = GenerateArgs::default();
    let o = &mut out.overrides;

    while let Some(token) = it.next() {
        let Some(flag) = token
            .strip_prefix("--")
            .or_else(|| token.strip_prefix('-'))
            .filter(|f| !f.is_empty())
        else {
            anyhow::bail!("unexpected argument: {token}");
        };
        let (name, inline) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (flag, None),
        };

        let mut value = |name: &str| -> anyhow::Result<String> {
            match inline {
                Some(v) => Ok(v.to_string()),
                None => it
                    .next()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("flag needs an argument: -{name}")),
            }
        };

        match name {
            "h" | "help" => return Ok(Command::Help),
            "version" => return Ok(Command::Version),
            "c" => out.config = Some(PathBuf::from(value(name)?)),
            "dsn" => o.dsn = Some(value(name)?),
            "db" => o.db = Some(value(name)?),
            "tables" => o.tables = Some(split_csv(&value(name)?)),
            "outPath" => o.out_path = Some(value(name)?),
            "outFile" => o.out_file = Some(value(name)?),
            "modelPkgName" => o.model_pkg_name = Some(value(name)?),
            "onlyModel" => o.only_model = Some(parse_bool(name, inline)?),
            "withUnitTest" => o.with_unit_test = Some(parse_bool(name, inline)?),
            "fieldNullable" => o.field_nullable = Some(parse_bool(name, inline)?),
            "fieldWithIndexTag" => o.field_with_index_tag = Some(parse_bool(name, inline)?),
            "fieldWithTypeTag" => o.field_with_type_tag = Some(parse_bool(name, inline)?),
            "fieldSignable" => o.field_signable = Some(parse_bool(name, inline)?),
            other => anyhow::bail!("flag provided but not defined: -{other}"),
        }
    }

    Ok(Command::Generate(out))
}

fn parse_bool(name: &str, inline: Option<&str>) -> anyhow::Result<bool> {
    match inline {
        None => Ok(true),
        Some("1" | "t" | "T" | "true" | "TRUE" | "True") => Ok(true),
        Some("0" | "f" | "F" | "false" | "FALSE" | "False") => Ok(false),
        Some(v) => anyhow::bail!("invalid boolean value {v:?} for flag -{name}"),
    }
}

fn split_csv(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn print_help() {
    println!(
        "\
ormgen - generate sqlx models and queries from a database schema

USAGE:
  ormgen [OPTIONS]

OPTIONS:
  -c <FILE>                 Config file (YAML, or TOML with a .toml extension)
  -dsn <DSN>                Database connection string
  -db <DRIVER>              mysql | postgres | sqlite | sqlserver (default: mysql)
  -tables <CSV>             Tables to generate (default: all tables)
  -onlyModel                Generate models only, no query modules
  -outPath <DIR>            Query output directory (default: ./dao/query)
  -outFile <NAME>           Query root file name (default: mod.rs)
  -withUnitTest             Emit a test module per query file
  -modelPkgName <NAME>      Model module name (default: model)
  -fieldNullable            Nullable columns become Option<T>
  -fieldWithIndexTag        Document index membership on fields
  -fieldWithTypeTag         Document the column type on fields
  -fieldSignable            Map unsigned integer columns to unsigned types
  -version                  Print version
  -h, -help                 Print help

Flags given on the command line override the config file.
Booleans accept -flag, -flag=true or -flag=false."
    );
}
