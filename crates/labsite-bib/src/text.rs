//! Rich text for formatted entries.

use biblatex::{Chunk, Spanned};

/// Separator between the blocks of an entry.
pub const NEWBLOCK: &str = "\n";

/// A piece of formatted text.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain text, escaped on output
    Text(String),
    /// Text from a `{...}` group; keeps its case
    Protected(Rich),
    /// Emphasised text
    Emph(Rich),
    /// Hyperlink with a label
    Href(String, Rich),
    /// Pre-rendered HTML such as `&ndash;`
    Symbol(&'static str),
}

/// A sequence of inline pieces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rich(pub Vec<Inline>);

impl Rich {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::default()
        } else {
            Self(vec![Inline::Text(s)])
        }
    }

    pub fn symbol(entity: &'static str) -> Self {
        Self(vec![Inline::Symbol(entity)])
    }

    /// Rich text from a field's chunks. Braced groups become protected
    /// runs and whitespace is collapsed.
    pub fn from_chunks(chunks: &[Spanned<Chunk>]) -> Self {
        let mut inlines: Vec<Inline> = chunks
            .iter()
            .map(|chunk| match &chunk.v {
                Chunk::Normal(s) => Inline::Text(squash(s)),
                Chunk::Verbatim(s) => Inline::Protected(Rich::text(squash(s))),
                Chunk::Math(s) => Inline::Text(format!("${}$", s)),
            })
            .collect();

        if let Some(Inline::Text(s)) = inlines.first_mut() {
            *s = s.trim_start().to_string();
        }
        if let Some(Inline::Text(s)) = inlines.last_mut() {
            *s = s.trim_end().to_string();
        }
        inlines.retain(|inline| !matches!(inline, Inline::Text(s) if s.is_empty()));

        Self(inlines)
    }

    pub fn emph(self) -> Self {
        if self.is_empty() {
            self
        } else {
            Self(vec![Inline::Emph(self)])
        }
    }

    pub fn href(self, url: impl Into<String>) -> Self {
        Self(vec![Inline::Href(url.into(), self)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|inline| match inline {
            Inline::Text(s) => s.is_empty(),
            Inline::Protected(r) | Inline::Emph(r) | Inline::Href(_, r) => r.is_empty(),
            Inline::Symbol(_) => false,
        })
    }

    pub fn append(&mut self, other: Rich) {
        self.0.extend(other.0);
    }

    /// Uppercase the first letter and lowercase the rest, leaving protected
    /// runs untouched. A protected run before any letter counts as the start.
    pub fn sentence_case(self) -> Self {
        let mut first = true;
        let inlines = self
            .0
            .into_iter()
            .map(|inline| match inline {
                Inline::Text(s) => {
                    let mut out = String::with_capacity(s.len());
                    for c in s.chars() {
                        if first && c.is_alphabetic() {
                            out.extend(c.to_uppercase());
                            first = false;
                        } else {
                            out.extend(c.to_lowercase());
                        }
                    }
                    Inline::Text(out)
                }
                other => {
                    first = false;
                    other
                }
            })
            .collect();
        Self(inlines)
    }

    /// Lowercase everything outside protected runs.
    pub fn lowercase(self) -> Self {
        let inlines = self
            .0
            .into_iter()
            .map(|inline| match inline {
                Inline::Text(s) => Inline::Text(s.to_lowercase()),
                Inline::Emph(r) => Inline::Emph(r.lowercase()),
                Inline::Href(url, r) => Inline::Href(url, r.lowercase()),
                other => other,
            })
            .collect();
        Self(inlines)
    }

    /// Last visible character, looking through nested markup.
    fn last_char(&self) -> Option<char> {
        self.0.iter().rev().find_map(|inline| match inline {
            Inline::Text(s) => s.chars().last(),
            Inline::Protected(r) | Inline::Emph(r) | Inline::Href(_, r) => r.last_char(),
            Inline::Symbol(_) => Some(';'),
        })
    }

    /// Append a period unless the text already ends with terminal punctuation.
    pub fn add_period(mut self) -> Self {
        if !self.is_empty() && !matches!(self.last_char(), Some('.' | '?' | '!')) {
            self.0.push(Inline::Text(".".to_string()));
        }
        self
    }

    /// Join the non-empty parts with a separator.
    pub fn join(parts: impl IntoIterator<Item = Rich>, sep: &str) -> Self {
        Self::join_with(parts, Inline::Text(sep.to_string()))
    }

    /// Join the non-empty parts with the block separator.
    pub fn join_blocks(parts: impl IntoIterator<Item = Rich>) -> Self {
        Self::join_with(parts, Inline::Symbol(NEWBLOCK))
    }

    fn join_with(parts: impl IntoIterator<Item = Rich>, sep: Inline) -> Self {
        let mut out = Rich::default();
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            if !out.is_empty() {
                out.0.push(sep.clone());
            }
            out.append(part);
        }
        out
    }

    /// Render as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, out: &mut String) {
        for inline in &self.0 {
            match inline {
                Inline::Text(s) => out.push_str(&escape(s)),
                Inline::Protected(r) => {
                    out.push_str("<span class=\"bibtex-protected\">");
                    r.write_html(out);
                    out.push_str("</span>");
                }
                Inline::Emph(r) => {
                    out.push_str("<em>");
                    r.write_html(out);
                    out.push_str("</em>");
                }
                Inline::Href(url, r) => {
                    out.push_str("<a href=\"");
                    out.push_str(&escape_attr(url));
                    out.push_str("\">");
                    r.write_html(out);
                    out.push_str("</a>");
                }
                Inline::Symbol(entity) => out.push_str(entity),
            }
        }
    }
}

/// Collapse runs of ASCII whitespace; non-breaking spaces survive.
fn squash(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape(s).replace('"', "&quot;")
}
