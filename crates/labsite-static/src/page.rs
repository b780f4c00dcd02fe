//! Page layout profiles and content assembly.

use serde::Deserialize;

use crate::config::SiteConfig;
use crate::escape::Escaping;
use crate::sections::Sections;

/// Named page layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Research group page: members, news, packages, publications
    #[default]
    Group,
    /// Organization page: adds description, resources and videos, and
    /// publishes `CNAME` and `assets/`
    #[serde(alias = "org")]
    Organization,
}

/// A block of the page below the main heading and intro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Description,
    News,
    Resources,
    Members,
    Packages,
    Publications,
    Videos,
}

impl Profile {
    /// Blocks of this profile, in page order.
    pub fn blocks(&self) -> &'static [Block] {
        match self {
            Self::Group => &[
                Block::Members,
                Block::News,
                Block::Packages,
                Block::Publications,
            ],
            Self::Organization => &[
                Block::Description,
                Block::News,
                Block::Resources,
                Block::Members,
                Block::Packages,
                Block::Publications,
                Block::Videos,
            ],
        }
    }

    /// Whether builds publish `CNAME` and copy the assets tree.
    pub fn publishes_assets(&self) -> bool {
        matches!(self, Self::Organization)
    }

    fn heading(&self, site: &SiteConfig) -> String {
        match self {
            Self::Group => "Home".to_string(),
            Self::Organization => site.headline().to_string(),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::Organization => write!(f, "organization"),
        }
    }
}

/// Assemble the page content from the rendered sections.
pub fn assemble(
    site: &SiteConfig,
    sections: &Sections,
    profile: Profile,
    escaping: Escaping,
) -> String {
    let mut content = String::from("\n");

    content.push_str(&format!(
        "    <h1 class=\"mb-4\">{}</h1>\n",
        escaping.apply(&profile.heading(site))
    ));
    push_paragraph(&mut content, &escaping.apply(&site.intro));

    for block in profile.blocks() {
        match block {
            Block::Description => {
                push_heading(
                    &mut content,
                    &format!("What's {}?", escaping.apply(&site.title)),
                );
                push_paragraph(&mut content, &escaping.apply(&site.description));
            }
            Block::News => push_list(&mut content, "News", &sections.news),
            Block::Resources => push_list(&mut content, "Useful Resources", &sections.resources),
            Block::Members => push_list(&mut content, "Members", &sections.members),
            Block::Packages => push_list(&mut content, "Packages", &sections.packages),
            Block::Publications => {
                push_list(&mut content, "Publications", &sections.publications)
            }
            Block::Videos => push_list(&mut content, "Videos", &sections.videos),
        }
    }

    content.push_str("    ");
    content
}

fn push_heading(out: &mut String, heading: &str) {
    out.push_str(&format!("    <h2 class=\"mt-5\">{}</h2>\n", heading));
}

fn push_paragraph(out: &mut String, text: &str) {
    out.push_str(&format!("    <p>\n        {}\n    </p>\n", text));
}

fn push_list(out: &mut String, heading: &str, items: &str) {
    push_heading(out, heading);
    out.push_str(&format!("    <ul>\n        {}\n    </ul>\n", items));
}
