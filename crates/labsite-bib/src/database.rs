//! Loading BibTeX databases.

use biblatex::{Bibliography, ChunksExt, Entry, ParseErrorKind, Person, Type};

/// Errors that can occur when reading or formatting a bibliography.
#[derive(Debug, thiserror::Error)]
pub enum BibError {
    #[error("Failed to read bibliography {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Undefined macro '{name}' at line {line}")]
    UndefinedMacro { name: String, line: usize },

    #[error("Duplicate entry key: {0}")]
    DuplicateKey(String),

    #[error("Unsupported entry type '{entry_type}' in entry {key}")]
    UnsupportedType { key: String, entry_type: String },

    #[error("Entry {key} is missing required field '{field}'")]
    MissingField { key: String, field: String },

    #[error("Entry {key} has an invalid '{field}' field: {message}")]
    InvalidField {
        key: String,
        field: String,
        message: String,
    },
}

/// Parse a BibTeX database. Entries keep their file order.
pub fn parse_bibtex(source: &str) -> Result<Bibliography, BibError> {
    Bibliography::parse(source).map_err(|e| {
        let line = line_of(source, e.span.start);
        let message = e.to_string();
        match e.kind {
            ParseErrorKind::DuplicateKey(key) => BibError::DuplicateKey(key),
            ParseErrorKind::UnknownAbbreviation(name) => BibError::UndefinedMacro { name, line },
            _ => BibError::Syntax { line, message },
        }
    })
}

fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Decoded text of a field, or `None` when it is absent or blank.
pub fn field_text(entry: &Entry, name: &str) -> Option<String> {
    let text = entry.get(name)?.format_verbatim();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// The persons of a role (`author` or `editor`); empty when absent.
pub fn persons(entry: &Entry, role: &str) -> Result<Vec<Person>, BibError> {
    match entry.get(role) {
        None => Ok(Vec::new()),
        Some(chunks) => Vec::<Person>::from_chunks(chunks).map_err(|e| BibError::InvalidField {
            key: entry.key.clone(),
            field: role.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_in_order() {
        let source = r#"
@article{shin2024,
  author  = {Sungho Shin and Francois Pacaud},
  title   = {Accelerating {GPU} solvers},
  journal = "Electric Power Systems Research",
  year    = 2024,
}

@misc{madnlp, title = {MadNLP}, year = {2021}}
"#;

        let bib = parse_bibtex(source).unwrap();
        let entries: Vec<&Entry> = bib.iter().collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "shin2024");
        assert_eq!(
            field_text(entries[0], "journal").as_deref(),
            Some("Electric Power Systems Research")
        );
        assert_eq!(field_text(entries[0], "year").as_deref(), Some("2024"));
        assert_eq!(entries[1].key, "madnlp");
        assert_eq!(field_text(entries[1], "title").as_deref(), Some("MadNLP"));
    }

    #[test]
    fn expands_string_macros_and_concatenation() {
        let source = r#"
@string{ieee = "IEEE Transactions"}
@comment{ anything here }
@article{a, title = {T}, journal = ieee # { on Power}, year = 2020}
"#;

        let bib = parse_bibtex(source).unwrap();
        let entry = bib.get("a").unwrap();

        assert_eq!(
            field_text(entry, "journal").as_deref(),
            Some("IEEE Transactions on Power")
        );
    }

    #[test]
    fn normalizes_whitespace_in_values() {
        let bib = parse_bibtex("@misc{a, title = {A   title\n    over lines}}").unwrap();

        assert_eq!(
            field_text(bib.get("a").unwrap(), "title").as_deref(),
            Some("A title over lines")
        );
    }

    #[test]
    fn blank_fields_are_absent() {
        let bib = parse_bibtex("@misc{a, note = {  }}").unwrap();
        let entry = bib.get("a").unwrap();

        assert_eq!(field_text(entry, "note"), None);
        assert_eq!(field_text(entry, "title"), None);
    }

    #[test]
    fn splits_persons_on_and() {
        let bib =
            parse_bibtex("@misc{a, author = {Lovelace, Ada and Charles Babbage and others}}")
                .unwrap();

        let authors = persons(bib.get("a").unwrap(), "author").unwrap();

        assert_eq!(authors.len(), 3);
        assert_eq!(authors[0].name, "Lovelace");
        assert_eq!(authors[0].given_name, "Ada");
        assert_eq!(authors[1].name, "Babbage");
        assert_eq!(authors[1].given_name, "Charles");
        assert_eq!(authors[2].name, "others");
        assert!(persons(bib.get("a").unwrap(), "editor").unwrap().is_empty());
    }

    #[test]
    fn errors_on_unbalanced_braces() {
        let result = parse_bibtex("@article{a,\n  title = {Broken\n");

        assert!(matches!(result, Err(BibError::Syntax { .. })));
    }

    #[test]
    fn errors_on_undefined_macro() {
        let result = parse_bibtex("@misc{a,\n journal = nowhere}");

        assert!(matches!(
            result,
            Err(BibError::UndefinedMacro { ref name, .. }) if name == "nowhere"
        ));
    }

    #[test]
    fn errors_on_duplicate_keys() {
        let result = parse_bibtex("@misc{dup, title = {A}}\n@misc{dup, title = {B}}");

        assert!(matches!(result, Err(BibError::DuplicateKey(ref key)) if key == "dup"));
    }

    #[test]
    fn reports_line_of_error() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 4), 3);
        assert_eq!(line_of("a\n", 99), 2);
    }

    #[test]
    fn empty_source_has_no_entries() {
        let bib = parse_bibtex("% just a comment line\n").unwrap();

        assert_eq!(bib.iter().count(), 0);
    }
}
