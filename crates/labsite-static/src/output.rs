//! Writing the generated site to the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Errors that can occur when writing output.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Assets directory not found: {0}")]
    MissingAssets(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Writes build artifacts into a single output directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Delete the output directory if it exists and create it empty.
    pub fn prepare(&self) -> Result<(), OutputError> {
        if self.dir.exists() {
            tracing::debug!("Removing previous output {}", self.dir.display());
            fs::remove_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        }
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))
    }

    /// Write the page as `index.html`.
    pub fn write_page(&self, html: &str) -> Result<PathBuf, OutputError> {
        let path = self.dir.join("index.html");
        fs::write(&path, html).map_err(io_error(&path))?;
        tracing::info!("Generated {}", path.display());
        Ok(path)
    }

    /// Write `CNAME` containing exactly the domain.
    pub fn write_cname(&self, domain: &str) -> Result<PathBuf, OutputError> {
        let path = self.dir.join("CNAME");
        fs::write(&path, domain).map_err(io_error(&path))?;
        Ok(path)
    }

    /// Copy a directory tree into `<output>/assets`, keeping relative paths.
    ///
    /// Returns the number of files copied.
    pub fn copy_assets(&self, source: &Path) -> Result<usize, OutputError> {
        if !source.is_dir() {
            return Err(OutputError::MissingAssets(source.display().to_string()));
        }

        let dest_root = self.dir.join("assets");
        let mut copied = 0;

        for entry in WalkDir::new(source).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                OutputError::Io {
                    path: path.display().to_string(),
                    source: e.into(),
                }
            })?;

            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let dest = dest_root.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(io_error(&dest))?;
            } else {
                fs::copy(entry.path(), &dest).map_err(io_error(&dest))?;
                copied += 1;
            }
        }

        tracing::debug!(
            "Copied {} asset files from {} to {}",
            copied,
            source.display(),
            dest_root.display()
        );

        Ok(copied)
    }
}
