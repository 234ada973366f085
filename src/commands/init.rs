use crate::args::InitArgs;
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and writes an initial `config.json`, taking
/// the endpoint and ward-filter overrides from the CLI when given.
///
/// # Errors
/// - Returns an error if file operations fail or an override is invalid.
pub async fn init(report_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(report_home, args.endpoint_url(), args.revenue_ward())
        .await
        .context("Unable to create the data directory and config")?;
    Ok(format!(
        "Created {} reporting on {}",
        config.config_path().display(),
        config.endpoint()
    )
    .into())
}
