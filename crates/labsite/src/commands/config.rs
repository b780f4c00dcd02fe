//! Project configuration (site.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use labsite_static::{BuildConfig, Escaping, Profile};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub serve: ServeSection,
    #[serde(default)]
    pub deploy: DeploySection,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct SiteSection {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default = "default_data")]
    pub data: PathBuf,
    #[serde(default = "default_bibliography")]
    pub bibliography: PathBuf,
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_assets")]
    pub assets: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct BuildSection {
    /// Escape every configuration string interpolated into the page
    #[serde(default)]
    pub escape_html: bool,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ServeSection {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct DeploySection {
    pub remote: Option<String>,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_message")]
    pub message: String,
}

fn default_data() -> PathBuf {
    PathBuf::from("data/data.yaml")
}
fn default_bibliography() -> PathBuf {
    PathBuf::from("data/references.bib")
}
fn default_template() -> PathBuf {
    PathBuf::from("data/template.html")
}
fn default_assets() -> PathBuf {
    PathBuf::from("assets")
}
fn default_output() -> PathBuf {
    PathBuf::from("_build")
}
fn default_port() -> u16 {
    8000
}
fn default_branch() -> String {
    "gh-pages".to_string()
}
fn default_message() -> String {
    "Deploy to GitHub Pages".to_string()
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            data: default_data(),
            bibliography: default_bibliography(),
            template: default_template(),
            assets: default_assets(),
            output: default_output(),
        }
    }
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            remote: None,
            branch: default_branch(),
            message: default_message(),
        }
    }
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());

        Ok(config)
    }

    /// Build settings for the pipeline, with an optional output override.
    pub fn build_config(&self, output: Option<PathBuf>) -> BuildConfig {
        BuildConfig {
            data_path: self.site.data.clone(),
            bibliography_path: self.site.bibliography.clone(),
            template_path: self.site.template.clone(),
            assets_dir: self.site.assets.clone(),
            output_dir: output.unwrap_or_else(|| self.site.output.clone()),
            profile: self.site.profile,
            escaping: if self.build.escape_html {
                Escaping::Html
            } else {
                Escaping::Raw
            },
            year: None,
        }
    }
}
