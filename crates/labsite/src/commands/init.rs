//! Scaffold a new site project.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Files written by `init`, relative to the project root.
const SCAFFOLD: [(&str, &str); 5] = [
    ("site.toml", DEFAULT_CONFIG),
    ("data/data.yaml", DEFAULT_DATA),
    ("data/references.bib", DEFAULT_BIBLIOGRAPHY),
    ("data/template.html", DEFAULT_TEMPLATE),
    ("assets/style.css", DEFAULT_STYLE),
];

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing site...");

    let written = scaffold(Path::new("."), yes)?;

    if written.is_empty() {
        tracing::warn!("All project files already exist. Use --yes to overwrite.");
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'labsite serve' to preview the site.");

    Ok(())
}

/// Write the project files under `root`. Existing files are kept unless
/// `overwrite` is set. Returns the files written.
fn scaffold(root: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (relative, content) in SCAFFOLD {
        let path = root.join(relative);
        if path.exists() && !overwrite {
            tracing::debug!("Keeping existing {}", relative);
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", relative))?;
        tracing::info!("Created {}", relative);
        written.push(path);
    }

    Ok(written)
}

const DEFAULT_CONFIG: &str = r#"# labsite configuration

[site]
# "group" or "organization"
profile = "group"
data = "data/data.yaml"
bibliography = "data/references.bib"
template = "data/template.html"
# Copied to <output>/assets by the organization profile
assets = "assets"
output = "_build"

[build]
# Escape HTML in data strings instead of embedding them verbatim
escape_html = false

[serve]
port = 8000

[deploy]
# remote = "git@github.com:your-lab/your-lab.github.io.git"
branch = "gh-pages"
message = "Deploy to GitHub Pages"
"#;

const DEFAULT_DATA: &str = r#"title: Our Lab
intro: We build open-source optimization software.
description: A short description shown by the organization profile.
domain: example.org

members:
  - name: Ada Lovelace
    role: PI
    github: ada
    url: https://example.org/ada
    description: Works on numerical methods.

news:
  - date: 2025-01-15
    entry: The lab website is online.
    link: https://example.org/news

packages:
  - name: Solver
    url: https://github.com/our-lab/solver
    description: A nonlinear optimization solver.

resources: []

videos: []

links:
  - name: GitHub
    url: https://github.com/our-lab
"#;

const DEFAULT_BIBLIOGRAPHY: &str = r#"@article{lovelace2024solver,
  author = {Lovelace, Ada and Babbage, Charles},
  title = {A Solver for {GPU} Optimization},
  journal = {Journal of Optimization},
  volume = {12},
  pages = {1--20},
  year = {2024}
}
"#;

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="assets/style.css">
</head>
<body>
  <nav>
    <strong>{title}</strong>
    {GitHub}
  </nav>
  <main>
    {content}
  </main>
  <footer>
    &copy; {year} {title}
  </footer>
</body>
</html>
"#;

const DEFAULT_STYLE: &str = r#"body {
  font-family: system-ui, sans-serif;
  max-width: 860px;
  margin: 2rem auto;
  padding: 0 1rem;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use labsite_static::{BuildConfig, Profile, SiteBuilder};
    use tempfile::tempdir;

    #[test]
    fn scaffolds_every_file() {
        let temp = tempdir().unwrap();

        let written = scaffold(temp.path(), false).unwrap();

        assert_eq!(written.len(), SCAFFOLD.len());
        assert!(temp.path().join("site.toml").is_file());
        assert!(temp.path().join("data/template.html").is_file());
    }

    #[test]
    fn keeps_existing_files_without_overwrite() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("site.toml"), "# mine\n").unwrap();

        let written = scaffold(temp.path(), false).unwrap();

        assert_eq!(written.len(), SCAFFOLD.len() - 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("site.toml")).unwrap(),
            "# mine\n"
        );

        scaffold(temp.path(), true).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("site.toml")).unwrap(),
            DEFAULT_CONFIG
        );
    }

    #[test]
    fn scaffolded_project_builds_with_both_profiles() {
        let temp = tempdir().unwrap();
        scaffold(temp.path(), false).unwrap();

        for profile in [Profile::Group, Profile::Organization] {
            let config = BuildConfig {
                data_path: temp.path().join("data/data.yaml"),
                bibliography_path: temp.path().join("data/references.bib"),
                template_path: temp.path().join("data/template.html"),
                assets_dir: temp.path().join("assets"),
                output_dir: temp.path().join("_build"),
                profile,
                year: Some(2025),
                ..Default::default()
            };

            let result = SiteBuilder::new(config).build().unwrap();

            assert_eq!(result.publications, 1);
            let html = fs::read_to_string(temp.path().join("_build/index.html")).unwrap();
            assert!(html.contains("<a href=\"https://github.com/our-lab\">GitHub</a>"));
            assert!(html.contains("&copy; 2025 Our Lab"));
        }

        assert!(temp.path().join("_build/assets/style.css").is_file());
    }
}
