//! The "plain" bibliography style.
//!
//! Entries are sorted by author, year and title and formatted as a run of
//! blocks: authors, title, venue and date, note, then web references.

use biblatex::{Bibliography, Entry, EntryType, Person};

use crate::database::{field_text, persons, BibError};
use crate::text::Rich;

/// A formatted bibliography entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedEntry {
    /// Citation key of the source entry
    pub key: String,
    /// Self-contained HTML fragment
    pub html: String,
}

/// Entry types the plain style has a template for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Article,
    Book,
    Booklet,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    Misc,
    PhdThesis,
    Proceedings,
    TechReport,
    Unpublished,
}

impl Kind {
    fn of(entry_type: &EntryType) -> Option<Self> {
        let kind = match entry_type {
            EntryType::Article => Kind::Article,
            EntryType::Book => Kind::Book,
            EntryType::Booklet => Kind::Booklet,
            EntryType::InBook => Kind::InBook,
            EntryType::InCollection => Kind::InCollection,
            EntryType::InProceedings => Kind::InProceedings,
            EntryType::Manual => Kind::Manual,
            EntryType::MastersThesis => Kind::MastersThesis,
            EntryType::Misc => Kind::Misc,
            EntryType::PhdThesis => Kind::PhdThesis,
            EntryType::Proceedings => Kind::Proceedings,
            EntryType::TechReport => Kind::TechReport,
            EntryType::Unpublished => Kind::Unpublished,
            EntryType::Unknown(name) if name.eq_ignore_ascii_case("conference") => {
                Kind::InProceedings
            }
            _ => return None,
        };
        Some(kind)
    }

    /// Book-like entries sort by editor when they have no author.
    fn editor_sorts(self) -> bool {
        matches!(self, Kind::Book | Kind::InBook)
    }
}

/// Sort and format every entry of a bibliography.
pub fn format_entries(bib: &Bibliography) -> Result<Vec<FormattedEntry>, BibError> {
    let mut entries: Vec<(SortKey, &Entry)> = bib.iter().map(|e| (sort_key(e), e)).collect();
    // Stable: entries with equal keys keep their file order.
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    entries
        .into_iter()
        .map(|(_, entry)| {
            Ok(FormattedEntry {
                key: entry.key.clone(),
                html: format_entry(entry)?.to_html(),
            })
        })
        .collect()
}

type SortKey = (String, String, String);

/// The `author_year_title` sort key.
fn sort_key(entry: &Entry) -> SortKey {
    let book_like = Kind::of(&entry.entry_type).is_some_and(Kind::editor_sorts);
    let role = if book_like && entry.get("author").is_none() {
        "editor"
    } else {
        "author"
    };
    let persons_key = persons(entry, role)
        .unwrap_or_default()
        .iter()
        .map(person_key)
        .collect::<Vec<_>>()
        .join("   ");

    (
        persons_key,
        field_text(entry, "year").unwrap_or_default(),
        field_text(entry, "title").unwrap_or_default(),
    )
}

/// Last names, then given names, then lineage, lowercased.
fn person_key(person: &Person) -> String {
    let last = [person.prefix.as_str(), person.name.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    [last.as_str(), person.given_name.as_str(), person.suffix.as_str()]
        .join("  ")
        .to_lowercase()
}

/// Format a single entry as rich text.
pub fn format_entry(entry: &Entry) -> Result<Rich, BibError> {
    let kind = Kind::of(&entry.entry_type).ok_or_else(|| BibError::UnsupportedType {
        key: entry.key.clone(),
        entry_type: entry.entry_type.to_string(),
    })?;
    let f = Fields { entry };

    let blocks = match kind {
        Kind::Article => vec![
            sentence([f.names("author")?]),
            f.title("title")?,
            sentence([
                f.required("journal")?.emph(),
                f.volume_and_pages(),
                f.date()?,
            ]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::Book => vec![
            f.author_or_editor()?,
            sentence([f.required("title")?.emph()]),
            sentence([f.volume_and_series(true)]),
            sentence([
                f.required("publisher")?,
                f.optional("address"),
                f.edition(),
                f.date()?,
            ]),
            sentence([f.isbn()]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::Booklet => vec![
            sentence([f.person_list("author")?]),
            f.title("title")?,
            sentence([f.optional("howpublished"), f.optional("address"), f.date()?]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::InBook => vec![
            f.author_or_editor()?,
            sentence([f.required("title")?.emph(), f.chapter_and_pages()]),
            sentence([f.volume_and_series(true)]),
            sentence([
                f.required("publisher")?,
                f.optional("address"),
                f.edition(),
                f.date()?,
            ]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::InCollection => vec![
            sentence([f.names("author")?]),
            f.title("title")?,
            words([
                Rich::text("In"),
                sentence([
                    f.editor()?,
                    f.required("booktitle")?.emph(),
                    f.volume_and_series(false),
                    f.chapter_and_pages(),
                ]),
            ]),
            sentence([
                f.optional("publisher"),
                f.optional("address"),
                f.edition(),
                f.date()?,
            ]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::InProceedings => vec![
            sentence([f.names("author")?]),
            f.title("title")?,
            words([
                Rich::text("In"),
                sentence([
                    f.editor()?,
                    f.required("booktitle")?.emph(),
                    f.volume_and_series(false),
                    f.pages(),
                ]),
                f.address_organization_publisher_date(true)?,
            ]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::Manual => vec![
            sentence([f.person_list("author")?]),
            sentence([f.required("title")?.emph()]),
            sentence([
                f.optional("organization"),
                f.optional("address"),
                f.edition(),
                f.optional_date(),
            ]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::MastersThesis => vec![
            sentence([f.names("author")?]),
            f.title("title")?,
            sentence([
                Rich::text("Master's thesis"),
                f.required("school")?,
                f.optional("address"),
                f.date()?,
            ]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::Misc => vec![
            sentence([f.person_list("author")?]),
            f.optional_title("title"),
            sentence([f.optional("howpublished"), f.optional_date()]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::PhdThesis => vec![
            sentence([f.names("author")?]),
            sentence([f.required("title")?.emph()]),
            sentence([
                f.optional("type").or_text("PhD thesis"),
                f.required("school")?,
                f.optional("address"),
                f.date()?,
            ]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::Proceedings => {
            let mut blocks = if entry.get("editor").is_some() {
                vec![
                    f.editor()?.add_period(),
                    sentence([
                        f.required("title")?.emph(),
                        f.volume_and_series(false),
                        f.address_organization_publisher_date(true)?,
                    ]),
                ]
            } else {
                vec![
                    sentence([f.optional("organization")]),
                    sentence([
                        f.required("title")?.emph(),
                        f.volume_and_series(false),
                        f.address_organization_publisher_date(false)?,
                    ]),
                ]
            };
            blocks.push(sentence([f.optional("note")]));
            blocks.push(f.web_refs());
            blocks
        }
        Kind::TechReport => vec![
            sentence([f.names("author")?]),
            f.title("title")?,
            sentence([
                words([
                    f.optional("type").or_text("Technical Report"),
                    f.optional("number"),
                ]),
                f.required("institution")?,
                f.optional("address"),
                f.date()?,
            ]),
            sentence([f.optional("note")]),
            f.web_refs(),
        ],
        Kind::Unpublished => vec![
            sentence([f.names("author")?]),
            f.title("title")?,
            sentence([f.required("note")?, f.optional_date()]),
            f.web_refs(),
        ],
    };

    Ok(Rich::join_blocks(blocks))
}

/// Comma-joined parts closed with a period.
fn sentence<const N: usize>(parts: [Rich; N]) -> Rich {
    Rich::join(parts, ", ").add_period()
}

/// Space-joined parts.
fn words<const N: usize>(parts: [Rich; N]) -> Rich {
    Rich::join(parts, " ")
}

trait OrText {
    fn or_text(self, fallback: &str) -> Rich;
}

impl OrText for Rich {
    fn or_text(self, fallback: &str) -> Rich {
        if self.is_empty() {
            Rich::text(fallback)
        } else {
            self
        }
    }
}

/// Field accessors for one entry.
struct Fields<'a> {
    entry: &'a Entry,
}

impl Fields<'_> {
    fn missing(&self, field: &str) -> BibError {
        BibError::MissingField {
            key: self.entry.key.clone(),
            field: field.to_string(),
        }
    }

    fn raw(&self, name: &str) -> Option<String> {
        field_text(self.entry, name)
    }

    fn field(&self, name: &str) -> Option<Rich> {
        self.entry
            .get(name)
            .map(Rich::from_chunks)
            .filter(|rich| !rich.is_empty())
    }

    fn required(&self, name: &str) -> Result<Rich, BibError> {
        self.field(name).ok_or_else(|| self.missing(name))
    }

    fn optional(&self, name: &str) -> Rich {
        self.field(name).unwrap_or_default()
    }

    /// Sentence-cased title, as its own sentence.
    fn title(&self, name: &str) -> Result<Rich, BibError> {
        Ok(sentence([self.required(name)?.sentence_case()]))
    }

    fn optional_title(&self, name: &str) -> Rich {
        self.field(name)
            .map(|title| sentence([title.sentence_case()]))
            .unwrap_or_default()
    }

    /// Joined names of a role; empty when the role is absent.
    fn person_list(&self, role: &str) -> Result<Rich, BibError> {
        Ok(Rich::text(join_names(&persons(self.entry, role)?)))
    }

    fn names(&self, role: &str) -> Result<Rich, BibError> {
        let names = self.person_list(role)?;
        if names.is_empty() {
            return Err(self.missing(role));
        }
        Ok(names)
    }

    /// `A and B, editors`.
    fn editor(&self) -> Result<Rich, BibError> {
        let editors = persons(self.entry, "editor")?;
        let label = match editors.len() {
            0 => return Ok(Rich::default()),
            1 => "editor",
            _ => "editors",
        };
        Ok(Rich::text(format!("{}, {}", join_names(&editors), label)))
    }

    fn author_or_editor(&self) -> Result<Rich, BibError> {
        if self.entry.get("author").is_some() {
            Ok(sentence([self.names("author")?]))
        } else if self.entry.get("editor").is_some() {
            Ok(sentence([self.editor()?]))
        } else {
            Err(self.missing("author"))
        }
    }

    fn month(&self) -> Rich {
        match self.raw("month") {
            Some(month) => match month_name(&month) {
                Some(name) => Rich::text(name),
                None => self.optional("month"),
            },
            None => Rich::default(),
        }
    }

    /// `month year`; the year is required.
    fn date(&self) -> Result<Rich, BibError> {
        Ok(words([self.month(), self.required("year")?]))
    }

    fn optional_date(&self) -> Rich {
        self.date().unwrap_or_default()
    }

    fn pages(&self) -> Rich {
        self.raw("pages").map(|p| dashify(&p)).unwrap_or_default()
    }

    /// `volume(number):pages`, or `pages N` without a volume.
    fn volume_and_pages(&self) -> Rich {
        let pages = self.pages();
        if pages.is_empty() {
            return Rich::default();
        }

        match self.field("volume") {
            Some(mut out) => {
                if let Some(number) = self.field("number") {
                    out.append(Rich::text("("));
                    out.append(number);
                    out.append(Rich::text(")"));
                }
                out.append(Rich::text(":"));
                out.append(pages);
                out
            }
            None => words([Rich::text("pages"), pages]),
        }
    }

    /// `Volume N of <em>Series</em>`, `Number N in Series`, or the series alone.
    fn volume_and_series(&self, capitalize: bool) -> Rich {
        let series = self.optional("series");

        if let Some(volume) = self.field("volume") {
            let out = together(if capitalize { "Volume" } else { "volume" }, volume);
            if series.is_empty() {
                out
            } else {
                words([out, Rich::text("of"), series.emph()])
            }
        } else if let Some(number) = self.field("number") {
            let out = together(if capitalize { "Number" } else { "number" }, number);
            if series.is_empty() {
                out
            } else {
                words([out, Rich::text("in"), series])
            }
        } else {
            series
        }
    }

    fn chapter_and_pages(&self) -> Rich {
        let chapter = self
            .field("chapter")
            .map(|c| together("chapter", c))
            .unwrap_or_default();
        let pages = self
            .raw("pages")
            .map(|p| together("pages", dashify(&p)))
            .unwrap_or_default();
        Rich::join([chapter, pages], ", ")
    }

    fn edition(&self) -> Rich {
        self.field("edition")
            .map(|e| words([e.lowercase(), Rich::text("edition")]))
            .unwrap_or_default()
    }

    fn isbn(&self) -> Rich {
        self.field("isbn")
            .map(|i| words([Rich::text("ISBN"), i]))
            .unwrap_or_default()
    }

    fn address_organization_publisher_date(
        &self,
        include_organization: bool,
    ) -> Result<Rich, BibError> {
        let organization = if include_organization {
            self.optional("organization")
        } else {
            Rich::default()
        };

        if self.entry.get("address").is_some() {
            Ok(words([
                sentence([self.optional("address"), self.date()?]),
                sentence([organization, self.optional("publisher")]),
            ]))
        } else {
            Ok(sentence([organization, self.optional("publisher"), self.date()?]))
        }
    }

    /// URL with its visit date, then arXiv, PubMed and DOI links.
    fn web_refs(&self) -> Rich {
        let url = self
            .raw("url")
            .map(|u| {
                let mut out = words([Rich::text("URL:"), Rich::text(u.as_str()).href(u.as_str())]);
                if let Some(visited) = self.field("urldate") {
                    out.append(Rich::text(" (visited on "));
                    out.append(visited);
                    out.append(Rich::text(")"));
                }
                out
            })
            .unwrap_or_default();
        let eprint = self.link("eprint", "arXiv:", "https://arxiv.org/abs/");
        let pubmed = self.link("pubmed", "PMID:", "https://www.ncbi.nlm.nih.gov/pubmed/");
        let doi = self.link("doi", "doi:", "https://doi.org/");

        sentence([url, eprint, pubmed, doi])
    }

    /// `<a href="{base}{id}">{label}{id}</a>` for an identifier field.
    fn link(&self, name: &str, label: &str, base: &str) -> Rich {
        self.raw(name)
            .map(|id| Rich::text(format!("{}{}", label, id)).href(format!("{}{}", base, id)))
            .unwrap_or_default()
    }
}

/// Full month name for the standard three-letter month macros.
fn month_name(value: &str) -> Option<&'static str> {
    const MONTHS: [(&str, &str); 12] = [
        ("jan", "January"),
        ("feb", "February"),
        ("mar", "March"),
        ("apr", "April"),
        ("may", "May"),
        ("jun", "June"),
        ("jul", "July"),
        ("aug", "August"),
        ("sep", "September"),
        ("oct", "October"),
        ("nov", "November"),
        ("dec", "December"),
    ];

    MONTHS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(value))
        .map(|(_, name)| *name)
}

/// Label and value joined by a non-breaking space.
fn together(label: &str, value: Rich) -> Rich {
    let mut out = Rich::text(label);
    out.append(Rich::symbol("&nbsp;"));
    out.append(value);
    out
}

/// Replace each run of dashes in a page range with an en dash.
fn dashify(pages: &str) -> Rich {
    let is_dash = |c: char| matches!(c, '-' | '\u{2013}' | '\u{2014}');
    let mut out = Rich::default();
    let mut rest = pages;
    while let Some(start) = rest.find(is_dash) {
        out.append(Rich::text(&rest[..start]));
        out.append(Rich::symbol("&ndash;"));
        rest = rest[start..].trim_start_matches(is_dash);
    }
    out.append(Rich::text(rest));
    out
}

/// `A`, `A and B`, `A, B, and C`.
fn join_names(persons: &[Person]) -> String {
    let names: Vec<String> = persons.iter().map(format_name).collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// Given names, von part, last name, then `, Jr`.
fn format_name(person: &Person) -> String {
    let mut name = [
        person.given_name.as_str(),
        person.prefix.as_str(),
        person.name.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ");
    if !person.suffix.is_empty() {
        name.push_str(", ");
        name.push_str(&person.suffix);
    }
    name
}
