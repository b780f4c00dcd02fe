//! Site data loaded from the YAML data document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

/// Everything the page is built from. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Page title, substituted for `{title}`
    #[serde(deserialize_with = "scalar")]
    pub title: String,

    /// Intro paragraph under the main heading
    #[serde(deserialize_with = "scalar")]
    pub intro: String,

    /// "What's ...?" paragraph (organization profile)
    #[serde(deserialize_with = "scalar")]
    pub description: String,

    /// Custom domain written to `CNAME` (organization profile)
    #[serde(deserialize_with = "scalar")]
    pub domain: String,

    /// Main heading (organization profile); falls back to `title`
    #[serde(deserialize_with = "scalar")]
    pub headline: String,

    #[serde(deserialize_with = "sequence")]
    pub members: Vec<Member>,
    #[serde(deserialize_with = "sequence")]
    pub news: Vec<NewsItem>,
    #[serde(deserialize_with = "sequence")]
    pub packages: Vec<Package>,
    #[serde(deserialize_with = "sequence")]
    pub resources: Vec<Resource>,
    #[serde(deserialize_with = "sequence")]
    pub videos: Vec<Video>,

    /// Navigation links, substituted for `{<name>}` in the template
    #[serde(deserialize_with = "sequence")]
    pub links: Vec<Link>,
}

/// A group member.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Member {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    /// Role shown by the group profile
    #[serde(deserialize_with = "scalar")]
    pub role: String,
    /// GitHub handle shown by the organization profile
    #[serde(deserialize_with = "scalar")]
    pub github: String,
    #[serde(deserialize_with = "scalar")]
    pub url: String,
    #[serde(deserialize_with = "scalar")]
    pub description: String,
}

/// A dated news entry.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NewsItem {
    #[serde(deserialize_with = "scalar")]
    pub date: String,
    #[serde(deserialize_with = "scalar")]
    pub entry: String,
    #[serde(deserialize_with = "optional_scalar")]
    pub link: Option<String>,
}

/// A software package.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Package {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub url: String,
    #[serde(deserialize_with = "scalar")]
    pub description: String,
}

/// An external resource.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Resource {
    #[serde(deserialize_with = "scalar")]
    pub description: String,
    #[serde(deserialize_with = "scalar")]
    pub url: String,
}

/// A recorded talk.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Video {
    #[serde(deserialize_with = "scalar")]
    pub presenter: String,
    #[serde(deserialize_with = "scalar")]
    pub description: String,
    #[serde(deserialize_with = "scalar")]
    pub date: String,
    /// YouTube video id
    #[serde(deserialize_with = "scalar")]
    pub youtube: String,
}

/// A navigation link.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Link {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub url: String,
}

/// Accept any YAML scalar as a string, so `date: 2024` or `name: 42` load.
fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_scalar(deserializer).map(Option::unwrap_or_default)
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a string, found {:?}",
            other
        ))),
    }
}

/// A key present with no value (`news:`) is an empty list.
fn sequence<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Errors that can occur when loading site data.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read data file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse data file {path}: {message}")]
    Parse { path: String, message: String },
}

impl SiteConfig {
    /// Load site data from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::from_yaml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })?;

        tracing::debug!(
            "Loaded {} members, {} news items, {} packages, {} resources, {} videos, {} links",
            config.members.len(),
            config.news.len(),
            config.packages.len(),
            config.resources.len(),
            config.videos.len(),
            config.links.len()
        );

        Ok(config)
    }

    /// Parse site data from YAML text. A document with no content is an
    /// empty configuration.
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

        match value {
            serde_yaml::Value::Null => Ok(Self::default()),
            value @ serde_yaml::Value::Mapping(_) => {
                serde_yaml::from_value(value).map_err(|e| e.to_string())
            }
            _ => Err("expected a mapping at the top level".to_string()),
        }
    }

    /// Main heading for the organization profile.
    pub fn headline(&self) -> &str {
        if self.headline.is_empty() {
            &self.title
        } else {
            &self.headline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_full_document() {
        let yaml = r#"
title: MadSuite
intro: Optimization on GPUs.
domain: madsuite.org
members:
  - name: Sungho Shin
    role: PI
    github: sshin23
    url: https://sshin.dev
    description: Works on solvers.
news:
  - date: 2024-05-01
    entry: Released MadNLP 0.8
    link: https://example.org/news
links:
  - name: GitHub
    url: https://github.com/MadNLP
"#;

        let config = SiteConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.title, "MadSuite");
        assert_eq!(config.domain, "madsuite.org");
        assert_eq!(config.members.len(), 1);
        assert_eq!(config.members[0].github, "sshin23");
        assert_eq!(config.news[0].date, "2024-05-01");
        assert_eq!(config.news[0].link.as_deref(), Some("https://example.org/news"));
        assert_eq!(config.links[0].name, "GitHub");
        assert!(config.packages.is_empty());
        assert!(config.videos.is_empty());
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let config = SiteConfig::from_yaml("title: Lab\nmembers:\n  - name: Ada\n").unwrap();

        assert_eq!(config.intro, "");
        assert_eq!(config.members[0].url, "");
        assert!(config.news.is_empty());
        assert!(config.links.is_empty());
    }

    #[test]
    fn empty_document_is_empty_config() {
        assert_eq!(SiteConfig::from_yaml("").unwrap(), SiteConfig::default());
        assert_eq!(
            SiteConfig::from_yaml("# only a comment\n").unwrap(),
            SiteConfig::default()
        );
    }

    #[test]
    fn accepts_numbers_and_nulls() {
        let yaml = "title: 2024\nintro:\nnews:\n  - date: 2023\n    entry: Founded\nvideos:\n";

        let config = SiteConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.title, "2024");
        assert_eq!(config.intro, "");
        assert_eq!(config.news[0].date, "2023");
        assert!(config.news[0].link.is_none());
        assert!(config.videos.is_empty());
    }

    #[test]
    fn rejects_non_mapping_documents() {
        assert!(SiteConfig::from_yaml("- a\n- b\n").is_err());
        assert!(SiteConfig::from_yaml("members: 3\n").is_err());
        assert!(SiteConfig::from_yaml("title: [unclosed\n").is_err());
    }

    #[test]
    fn headline_falls_back_to_title() {
        let mut config = SiteConfig {
            title: "MadSuite".to_string(),
            ..Default::default()
        };
        assert_eq!(config.headline(), "MadSuite");

        config.headline = "MadSuite: Optimization on GPUs".to_string();
        assert_eq!(config.headline(), "MadSuite: Optimization on GPUs");
    }

    #[test]
    fn load_reports_missing_file() {
        let temp = tempdir().unwrap();

        let result = SiteConfig::load(&temp.path().join("data.yaml"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data.yaml");
        fs::write(&path, "title: [broken\n").unwrap();

        let err = SiteConfig::load(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("data.yaml"));
    }
}
