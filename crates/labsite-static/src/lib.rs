//! Static page generator for research group websites.
//!
//! Builds a single `index.html` from a YAML data document, a BibTeX
//! bibliography and an HTML template.

pub mod builder;
pub mod config;
pub mod escape;
pub mod output;
pub mod page;
pub mod sections;
pub mod template;

pub use builder::{BuildConfig, BuildError, BuildResult, SiteBuilder};
pub use config::{ConfigError, Link, Member, NewsItem, Package, Resource, SiteConfig, Video};
pub use escape::{html_escape, Escaping};
pub use output::{OutputError, OutputWriter};
pub use page::{assemble, Profile};
pub use sections::{render_list, ListItem, Sections};
pub use template::{load_template, Bindings, LiteralRenderer, Renderer, TemplateError};
