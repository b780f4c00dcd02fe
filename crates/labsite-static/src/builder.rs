//! Site builder: runs the whole pipeline once.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Datelike;

use labsite_bib::BibError;

use crate::config::{ConfigError, SiteConfig};
use crate::escape::Escaping;
use crate::output::{OutputError, OutputWriter};
use crate::page::{assemble, Profile};
use crate::sections::Sections;
use crate::template::{load_template, Bindings, LiteralRenderer, Renderer, TemplateError};

/// Configuration for building the site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// YAML data document
    pub data_path: PathBuf,

    /// BibTeX bibliography
    pub bibliography_path: PathBuf,

    /// HTML page template
    pub template_path: PathBuf,

    /// Assets tree copied by the organization profile
    pub assets_dir: PathBuf,

    /// Output directory, deleted and recreated on every build
    pub output_dir: PathBuf,

    pub profile: Profile,

    pub escaping: Escaping,

    /// Year substituted for `{year}`; the current local year when unset
    pub year: Option<i32>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/data.yaml"),
            bibliography_path: PathBuf::from("data/references.bib"),
            template_path: PathBuf::from("data/template.html"),
            assets_dir: PathBuf::from("assets"),
            output_dir: PathBuf::from("_build"),
            profile: Profile::default(),
            escaping: Escaping::default(),
            year: None,
        }
    }
}

/// Result of a build.
#[derive(Debug)]
pub struct BuildResult {
    pub members: usize,
    pub news: usize,
    pub packages: usize,
    pub resources: usize,
    pub videos: usize,
    pub publications: usize,

    /// Number of asset files copied
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to format bibliography: {0}")]
    Bibliography(#[from] BibError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Builds the site page from its inputs.
pub struct SiteBuilder {
    config: BuildConfig,
    renderer: Box<dyn Renderer + Send + Sync>,
}

impl SiteBuilder {
    pub fn new(config: BuildConfig) -> Self {
        let renderer = LiteralRenderer::new(config.escaping);
        Self {
            config,
            renderer: Box::new(renderer),
        }
    }

    /// Replace the template renderer.
    pub fn with_renderer(mut self, renderer: impl Renderer + Send + Sync + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Build the site.
    ///
    /// Every input is read and the page fully rendered before the output
    /// directory is touched.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let config = &self.config;

        tracing::debug!("Building {} site from {}", config.profile, config.data_path.display());

        let site = SiteConfig::load(&config.data_path)?;
        let publications = labsite_bib::format_file(&config.bibliography_path)?;
        let template = load_template(&config.template_path)?;

        let sections = Sections::render(&site, &publications, config.profile, config.escaping);
        let content = assemble(&site, &sections, config.profile, config.escaping);

        let year = config.year.unwrap_or_else(|| chrono::Local::now().year());
        let html = self.renderer.render(
            &template,
            &Bindings {
                title: &site.title,
                content: &content,
                year,
                links: &site.links,
            },
        )?;

        let writer = OutputWriter::new(&config.output_dir);
        writer.prepare()?;
        writer.write_page(&html)?;

        let mut assets = 0;
        if config.profile.publishes_assets() {
            writer.write_cname(&site.domain)?;
            assets = writer.copy_assets(&config.assets_dir)?;
        }

        let duration = start.elapsed();
        tracing::info!(
            "Generated {} successfully in {}ms",
            config.output_dir.display(),
            duration.as_millis()
        );

        Ok(BuildResult {
            members: site.members.len(),
            news: site.news.len(),
            packages: site.packages.len(),
            resources: site.resources.len(),
            videos: site.videos.len(),
            publications: publications.len(),
            assets,
            duration_ms: duration.as_millis() as u64,
            output_dir: config.output_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const TEMPLATE: &str = "<html><head><title>{title}</title></head>\n<nav>{Docs}</nav>\n<body>{content}</body>\n<footer>&copy; {year}</footer></html>\n";

    const DATA: &str = r#"
title: Test Lab
intro: We study things.
domain: example.org
members: []
news:
  - date: 2024-01-01
    entry: Lab founded
packages:
  - name: Pkg
    url: https://pkg
    description: A package
links:
  - name: Docs
    url: https://x
"#;

    const BIB: &str = r#"
@article{zeta,
  author = {Zed Zulu},
  title = {Later work},
  journal = {Journal},
  year = 2021
}
@book{alpha,
  author = {Ada Alpha},
  title = {Early work},
  publisher = {Press},
  year = 2019
}
"#;

    fn project(dir: &Path) -> BuildConfig {
        fs::create_dir_all(dir.join("data")).unwrap();
        fs::write(dir.join("data/data.yaml"), DATA).unwrap();
        fs::write(dir.join("data/references.bib"), BIB).unwrap();
        fs::write(dir.join("data/template.html"), TEMPLATE).unwrap();

        BuildConfig {
            data_path: dir.join("data/data.yaml"),
            bibliography_path: dir.join("data/references.bib"),
            template_path: dir.join("data/template.html"),
            assets_dir: dir.join("assets"),
            output_dir: dir.join("_build"),
            year: Some(2025),
            ..Default::default()
        }
    }

    fn read_page(config: &BuildConfig) -> String {
        fs::read_to_string(config.output_dir.join("index.html")).unwrap()
    }

    #[test]
    fn builds_group_site() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());

        let result = SiteBuilder::new(config.clone()).build().unwrap();

        assert_eq!(result.members, 0);
        assert_eq!(result.news, 1);
        assert_eq!(result.packages, 1);
        assert_eq!(result.publications, 2);
        assert_eq!(result.assets, 0);

        let html = read_page(&config);
        assert!(html.contains("<title>Test Lab</title>"));
        assert!(html.contains("&copy; 2025"));
        assert!(html.contains("<h1 class=\"mb-4\">Home</h1>"));
        assert!(!config.output_dir.join("CNAME").exists());
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        let builder = SiteBuilder::new(config.clone());

        builder.build().unwrap();
        let first = fs::read(config.output_dir.join("index.html")).unwrap();
        builder.build().unwrap();
        let second = fs::read(config.output_dir.join("index.html")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_members_keep_heading_and_empty_list() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());

        SiteBuilder::new(config.clone()).build().unwrap();

        let html = read_page(&config);
        assert!(html.contains("<h2 class=\"mt-5\">Members</h2>\n    <ul>\n        \n    </ul>"));
    }

    #[test]
    fn link_placeholder_becomes_single_anchor() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());

        SiteBuilder::new(config.clone()).build().unwrap();

        let html = read_page(&config);
        assert_eq!(html.matches("href=\"https://x\"").count(), 1);
        assert!(html.contains("<a href=\"https://x\">Docs</a>"));
        assert!(!html.contains("{Docs}"));
    }

    #[test]
    fn template_error_leaves_output_untouched() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        fs::create_dir_all(&config.output_dir).unwrap();
        fs::write(config.output_dir.join("index.html"), "previous").unwrap();
        fs::write(&config.template_path, "<title>{title}</title>{year}").unwrap();

        let result = SiteBuilder::new(config.clone()).build();

        assert!(matches!(
            result,
            Err(BuildError::Template(TemplateError::MissingPlaceholder(_)))
        ));
        assert_eq!(read_page(&config), "previous");
    }

    #[test]
    fn publications_are_sorted_list_items() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());

        SiteBuilder::new(config.clone()).build().unwrap();

        let html = read_page(&config);
        let items: Vec<&str> = html
            .match_indices("<li>")
            .map(|(i, _)| &html[i..])
            .filter(|rest| !rest.starts_with("<li>\n"))
            .collect();
        assert_eq!(items.len(), 2);
        assert!(!items[0].starts_with("<li></li>"));
        assert!(items[0].starts_with("<li>Ada Alpha."));
        assert!(items[1].starts_with("<li>Zed Zulu."));
    }

    #[test]
    fn organization_build_publishes_cname_and_assets() {
        let temp = tempdir().unwrap();
        let mut config = project(temp.path());
        config.profile = Profile::Organization;

        let assets = temp.path().join("assets");
        fs::create_dir_all(assets.join("img")).unwrap();
        fs::write(assets.join("style.css"), "body {}").unwrap();
        fs::write(assets.join("img/logo.svg"), "<svg/>").unwrap();

        let result = SiteBuilder::new(config.clone()).build().unwrap();

        assert_eq!(
            fs::read_to_string(config.output_dir.join("CNAME")).unwrap(),
            "example.org"
        );
        assert_eq!(result.assets, 2);
        assert!(config.output_dir.join("assets/style.css").is_file());
        assert!(config.output_dir.join("assets/img/logo.svg").is_file());

        let html = read_page(&config);
        assert!(html.contains("<h1 class=\"mb-4\">Test Lab</h1>"));
        assert!(html.contains("<h2 class=\"mt-5\">What's Test Lab?</h2>"));
        assert!(html.contains("Lab founded (2024-01-01)"));
    }

    #[test]
    fn missing_data_file_fails_before_output() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        fs::remove_file(&config.data_path).unwrap();

        let result = SiteBuilder::new(config.clone()).build();

        assert!(matches!(result, Err(BuildError::Config(_))));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn bibliography_errors_propagate() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        fs::write(&config.bibliography_path, "@article{a, title = {Unclosed").unwrap();

        let result = SiteBuilder::new(config).build();

        assert!(matches!(result, Err(BuildError::Bibliography(_))));
    }

    struct Fixed;

    impl Renderer for Fixed {
        fn render(&self, _template: &str, bindings: &Bindings<'_>) -> Result<String, TemplateError> {
            Ok(format!("year={}", bindings.year))
        }
    }

    #[test]
    fn custom_renderer_is_used() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());

        SiteBuilder::new(config.clone())
            .with_renderer(Fixed)
            .build()
            .unwrap();

        assert_eq!(read_page(&config), "year=2025");
    }
}
