use crate::codegen::generate_files;
use crate::params::Parameters;
use crate::write::{WriteSummary, apply_generated_files};
use ormgen_schema::SchemaSource;

pub async fn run(params: Parameters) -> anyhow::Result<()> {
    tracing::info!(driver = %params.driver, "connecting");
    let source = ormgen_schema::connect(params.driver, &params.dsn)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to {} database: {e}", params.driver))?;

    generate_with(source.as_ref(), &params).await?;
    Ok(())
}

/// Introspect through `source` and write the generated files.
pub async fn generate_with(
    source: &dyn SchemaSource,
    params: &Parameters,
) -> anyhow::Result<WriteSummary> {
    let tables = if params.tables.is_empty() {
        let all = source
            .table_names()
            .await
            .map_err(|e| anyhow::anyhow!("failed to list tables: {e}"))?;
        tracing::debug!(count = all.len(), "no tables given, generating all");
        all
    } else {
        params.tables.clone()
    };

    if tables.is_empty() {
        tracing::warn!("database has no tables, nothing to generate");
        return Ok(WriteSummary::default());
    }

    let schema = source
        .load_tables(&tables)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load table metadata: {e}"))?;
    tracing::info!(tables = schema.tables.len(), "loaded schema");

    let files = generate_files(params, &schema)?;
    apply_generated_files(&files)
}
