//! Placeholder substitution into the page template.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::config::Link;
use crate::escape::Escaping;

/// Placeholders every template must contain.
pub const REQUIRED_PLACEHOLDERS: [&str; 3] = ["title", "content", "year"];

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub year: i32,
    pub links: &'a [Link],
}

/// Errors that can occur when rendering the template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template is missing the {{{0}}} placeholder")]
    MissingPlaceholder(String),
}

/// Renders a page from a template and its bindings.
pub trait Renderer {
    fn render(&self, template: &str, bindings: &Bindings<'_>) -> Result<String, TemplateError>;
}

/// Literal find-and-replace renderer.
///
/// `{title}`, `{content}` and `{year}` are substituted in a single pass, in
/// which `{{` and `}}` stand for literal braces and any other `{...}` is
/// kept as is. Each `{<link name>}` left in the result is then replaced by
/// an anchor to the link's URL.
pub struct LiteralRenderer {
    placeholder: Regex,
    escaping: Escaping,
}

impl LiteralRenderer {
    pub fn new(escaping: Escaping) -> Self {
        Self {
            placeholder: Regex::new(r"\{\{|\}\}|\{(title|content|year)\}")
                .expect("placeholder pattern is valid"),
            escaping,
        }
    }

    fn substitute(&self, template: &str, bindings: &Bindings<'_>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.len() + bindings.content.len());
        let mut seen = [false; REQUIRED_PLACEHOLDERS.len()];
        let mut last = 0;

        for caps in self.placeholder.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&template[last..whole.start()]);
            last = whole.end();

            match caps.get(1).map(|name| name.as_str()) {
                Some("title") => {
                    seen[0] = true;
                    out.push_str(&self.escaping.apply(bindings.title));
                }
                Some("content") => {
                    seen[1] = true;
                    out.push_str(bindings.content);
                }
                Some("year") => {
                    seen[2] = true;
                    out.push_str(&bindings.year.to_string());
                }
                _ if whole.as_str() == "{{" => out.push('{'),
                _ => out.push('}'),
            }
        }
        out.push_str(&template[last..]);

        if let Some(missing) = REQUIRED_PLACEHOLDERS
            .iter()
            .zip(seen)
            .find_map(|(name, found)| (!found).then_some(*name))
        {
            return Err(TemplateError::MissingPlaceholder(missing.to_string()));
        }

        Ok(out)
    }

    fn replace_links(&self, mut html: String, links: &[Link]) -> String {
        // One binding per name: first position, last URL.
        let mut unique: Vec<(&str, &str)> = Vec::new();
        for link in links {
            if link.name.is_empty() {
                tracing::warn!("Skipping link with an empty name ({})", link.url);
                continue;
            }
            match unique.iter_mut().find(|(name, _)| *name == link.name) {
                Some(binding) => binding.1 = link.url.as_str(),
                None => unique.push((link.name.as_str(), link.url.as_str())),
            }
        }

        for (name, url) in unique {
            let token = format!("{{{}}}", name);
            if !html.contains(&token) {
                tracing::debug!("Link placeholder {} not found in template", token);
                continue;
            }
            let anchor = format!(
                "\n            <a href=\"{}\">{}</a>\n            ",
                self.escaping.apply(url),
                self.escaping.apply(name)
            );
            html = html.replace(&token, &anchor);
        }

        html
    }
}

impl Default for LiteralRenderer {
    fn default() -> Self {
        Self::new(Escaping::default())
    }
}

impl Renderer for LiteralRenderer {
    fn render(&self, template: &str, bindings: &Bindings<'_>) -> Result<String, TemplateError> {
        let html = self.substitute(template, bindings)?;
        Ok(self.replace_links(html, bindings.links))
    }
}

/// Read a template file.
pub fn load_template(path: &Path) -> Result<String, TemplateError> {
    fs::read_to_string(path).map_err(|e| TemplateError::Read {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = "<title>{title}</title><nav>{Docs}</nav><main>{content}</main><footer>{year}</footer>";

    fn link(name: &str, url: &str) -> Link {
        Link {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    fn bindings<'a>(links: &'a [Link]) -> Bindings<'a> {
        Bindings {
            title: "Lab",
            content: "<p>Hi</p>",
            year: 2025,
            links,
        }
    }

    #[test]
    fn substitutes_required_placeholders() {
        let html = LiteralRenderer::default()
            .render("{title}|{content}|{year}", &bindings(&[]))
            .unwrap();

        assert_eq!(html, "Lab|<p>Hi</p>|2025");
    }

    #[test]
    fn replaces_link_placeholders() {
        let links = [link("Docs", "https://x")];

        let html = LiteralRenderer::default()
            .render(TEMPLATE, &bindings(&links))
            .unwrap();

        assert_eq!(html.matches("<a href=\"https://x\">Docs</a>").count(), 1);
        assert_eq!(html.matches("href=").count(), 1);
        assert!(!html.contains("{Docs}"));
    }

    #[test]
    fn absent_link_token_is_a_no_op() {
        let links = [link("Blog", "https://blog")];

        let html = LiteralRenderer::default()
            .render(TEMPLATE, &bindings(&links))
            .unwrap();

        assert!(!html.contains("https://blog"));
        assert!(html.contains("{Docs}"));
    }

    #[test]
    fn later_link_with_same_name_wins() {
        let links = [link("Docs", "https://old"), link("Docs", "https://new")];

        let html = LiteralRenderer::default()
            .render(TEMPLATE, &bindings(&links))
            .unwrap();

        assert!(html.contains("href=\"https://new\""));
        assert!(!html.contains("https://old"));
    }

    #[test]
    fn missing_content_placeholder_is_an_error() {
        let result = LiteralRenderer::default().render("<title>{title}</title>{year}", &bindings(&[]));

        match result {
            Err(TemplateError::MissingPlaceholder(name)) => assert_eq!(name, "content"),
            other => panic!("Expected MissingPlaceholder, got {:?}", other),
        }
    }

    #[test]
    fn doubled_braces_are_literal() {
        let links = [link("GitHub", "https://gh")];

        let html = LiteralRenderer::default()
            .render(
                "<style>a {{ color: red; }}</style>{{GitHub}}{title}{content}{year}",
                &bindings(&links),
            )
            .unwrap();

        assert!(html.starts_with("<style>a { color: red; }</style>"));
        assert!(html.contains("<a href=\"https://gh\">GitHub</a>"));
    }

    #[test]
    fn single_braces_are_kept() {
        let html = LiteralRenderer::default()
            .render("a { color: red }{title}{content}{year}", &bindings(&[]))
            .unwrap();

        assert!(html.starts_with("a { color: red }Lab"));
    }

    #[test]
    fn content_is_not_rescanned_for_placeholders() {
        let b = Bindings {
            content: "{title} and {{",
            ..bindings(&[])
        };

        let html = LiteralRenderer::default()
            .render("{content}{title}{year}", &b)
            .unwrap();

        assert_eq!(html, "{title} and {{Lab2025");
    }

    #[test]
    fn escaping_applies_to_title_and_links() {
        let links = [link("<Docs>", "https://x?a=1&b=2")];
        let renderer = LiteralRenderer::new(Escaping::Html);

        let html = renderer
            .render("{title}{<Docs>}{content}{year}", &Bindings {
                title: "A & B",
                ..bindings(&links)
            })
            .unwrap();

        assert!(html.starts_with("A &amp; B"));
        assert!(html.contains("<a href=\"https://x?a=1&amp;b=2\">&lt;Docs&gt;</a>"));
    }
}
