//! Preview server command.

use std::path::Path;

use anyhow::{Context, Result};
use labsite_server::{PreviewServer, PreviewServerConfig};

use super::config::ConfigFile;

/// Run the serve command.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let file_config = ConfigFile::load(config_path)?;
    let port = port.unwrap_or(file_config.serve.port);

    tracing::info!("Starting preview server on port {}", port);

    let config = PreviewServerConfig {
        build: file_config.build_config(None),
        port,
        open,
        ..Default::default()
    };

    PreviewServer::new(config)
        .start()
        .await
        .context("Preview server failed")?;

    Ok(())
}
