//! Interpolation of configuration strings into HTML.

use std::borrow::Cow;

use serde::Deserialize;

/// How configuration strings are embedded into the page.
///
/// `Raw` embeds strings verbatim, so data files may contain markup (and
/// anything else). `Html` escapes every interpolated string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escaping {
    #[default]
    Raw,
    Html,
}

impl Escaping {
    /// Apply the escaping mode to a configuration string.
    pub fn apply<'a>(&self, s: &'a str) -> Cow<'a, str> {
        match self {
            Self::Raw => Cow::Borrowed(s),
            Self::Html => Cow::Owned(html_escape(s)),
        }
    }
}

/// Escape HTML special characters including single quotes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
