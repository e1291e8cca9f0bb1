mod cli;
mod codegen;
mod config;
mod generate;
mod ident;
mod model_codegen;
mod params;
mod query_codegen;
mod resolve;
mod type_mapper;
mod write;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help => {
            cli::print_help();
            Ok(())
        }
        cli::Command::Version => {
            println!("ormgen {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        cli::Command::Generate(args) => {
            let params = resolve::resolve(args.config.as_deref(), &args.overrides)?;
            tracing::debug!(
                driver = %params.driver,
                out_path = %params.out_path.display(),
                tables = params.tables.len(),
                "resolved parameters"
            );
            generate::run(params).await
        }
    }
}

/// Log to stderr at WARN unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::from_default_env().add_directive(Level::WARN.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
