//! List sections rendered as `<li>` fragments.

use labsite_bib::FormattedEntry;

use crate::config::{Member, NewsItem, Package, Resource, SiteConfig, Video};
use crate::escape::Escaping;
use crate::page::Profile;

/// An item that renders as one list fragment.
pub trait ListItem {
    /// Render this item with the layout of the given profile.
    fn render(&self, profile: Profile, escaping: Escaping) -> String;
}

/// Render every item and join the fragments with newlines.
///
/// An empty slice renders as the empty string.
pub fn render_list<T: ListItem>(items: &[T], profile: Profile, escaping: Escaping) -> String {
    items
        .iter()
        .map(|item| item.render(profile, escaping))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ListItem for Member {
    fn render(&self, profile: Profile, escaping: Escaping) -> String {
        let name = escaping.apply(&self.name);
        let url = escaping.apply(&self.url);
        let description = escaping.apply(&self.description);

        let tag = match profile {
            Profile::Group => format!("({})", escaping.apply(&self.role)),
            Profile::Organization => {
                let github = escaping.apply(&self.github);
                format!(
                    "(<a href=\"https://github.com/{}\">@{}</a>)",
                    github, github
                )
            }
        };

        format!(
            "\n        <li>\n            <a href=\"{}\"><strong>{}</strong></a> {}: {}\n        </li>\n        ",
            url, name, tag, description
        )
    }
}

impl ListItem for NewsItem {
    fn render(&self, profile: Profile, escaping: Escaping) -> String {
        let date = escaping.apply(&self.date);
        let entry = escaping.apply(&self.entry);

        match profile {
            Profile::Group => format!(
                "\n        <li>\n        <strong>{}</strong>: {} \n        </li>\n        ",
                date, entry
            ),
            Profile::Organization => {
                let when = match &self.link {
                    Some(link) => format!("<a href=\"{}\">{}</a>", escaping.apply(link), date),
                    None => date.into_owned(),
                };
                format!(
                    "\n        <li>\n        {} ({})\n        </li>\n        ",
                    entry, when
                )
            }
        }
    }
}

impl ListItem for Package {
    fn render(&self, _profile: Profile, escaping: Escaping) -> String {
        format!(
            "\n        <li>\n            <strong><a href=\"{}\">{}</a></strong>: {}\n        </li>\n        ",
            escaping.apply(&self.url),
            escaping.apply(&self.name),
            escaping.apply(&self.description)
        )
    }
}

impl ListItem for Resource {
    fn render(&self, _profile: Profile, escaping: Escaping) -> String {
        format!(
            "\n        <li>\n        {} [ <a href=\"{}\">Link</a> ]\n        </li>\n        ",
            escaping.apply(&self.description),
            escaping.apply(&self.url)
        )
    }
}

impl ListItem for Video {
    fn render(&self, _profile: Profile, escaping: Escaping) -> String {
        format!(
            r#"
        <li>
        {}, {}, {}<br>
        <div style="max-width: 800px">
        <div style="aspect-ratio: 16 / 9; width: 100%;">
        <iframe
        src="https://www.youtube.com/embed/{}"
        frameborder="0"
        allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
        allowfullscreen
        style="width: 100%; height: 100%;"
        ></iframe>
        </div>
        </div>
        </li>
        "#,
            escaping.apply(&self.presenter),
            escaping.apply(&self.description),
            escaping.apply(&self.date),
            escaping.apply(&self.youtube)
        )
    }
}

/// Publications are already HTML; the formatter escapes their text.
impl ListItem for FormattedEntry {
    fn render(&self, _profile: Profile, _escaping: Escaping) -> String {
        format!("<li>{}</li>", self.html)
    }
}

/// The rendered fragment of every list section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    pub members: String,
    pub news: String,
    pub packages: String,
    pub resources: String,
    pub videos: String,
    pub publications: String,
}

impl Sections {
    /// Render all list sections of a site.
    pub fn render(
        site: &SiteConfig,
        publications: &[FormattedEntry],
        profile: Profile,
        escaping: Escaping,
    ) -> Self {
        Self {
            members: render_list(&site.members, profile, escaping),
            news: render_list(&site.news, profile, escaping),
            packages: render_list(&site.packages, profile, escaping),
            resources: render_list(&site.resources, profile, escaping),
            videos: render_list(&site.videos, profile, escaping),
            publications: render_list(publications, profile, escaping),
        }
    }
}
