//! Site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use labsite_static::{BuildResult, SiteBuilder};

use super::config::ConfigFile;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<BuildResult> {
    tracing::info!("Building site...");

    let file_config = ConfigFile::load(config_path)?;
    let config = file_config.build_config(output);

    let result = SiteBuilder::new(config)
        .build()
        .context("Build failed")?;

    tracing::info!(
        "Built {} members, {} news items, {} packages and {} publications in {}ms",
        result.members,
        result.news,
        result.packages,
        result.publications,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(result)
}
