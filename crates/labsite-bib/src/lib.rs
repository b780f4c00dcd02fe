//! BibTeX parsing and "plain" style formatting for publication lists.
//!
//! This crate loads a BibTeX database with `biblatex`, sorts it the way the
//! plain style does, and renders every entry as a self-contained HTML
//! fragment.

pub mod database;
pub mod style;
pub mod text;

use std::fs;
use std::path::Path;

pub use database::{parse_bibtex, BibError};
pub use style::{format_entries, format_entry, FormattedEntry};

/// Parse BibTeX source and format it with the plain style.
pub fn format_bibliography(source: &str) -> Result<Vec<FormattedEntry>, BibError> {
    let bib = parse_bibtex(source)?;
    format_entries(&bib)
}

/// Read a `.bib` file and format it with the plain style.
pub fn format_file(path: &Path) -> Result<Vec<FormattedEntry>, BibError> {
    let source = fs::read_to_string(path).map_err(|e| BibError::Read {
        path: path.display().to_string(),
        source: e,
    })?;

    let entries = format_bibliography(&source)?;
    tracing::debug!("Formatted {} entries from {}", entries.len(), path.display());

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn formats_file_from_disk() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("references.bib");
        fs::write(
            &path,
            "@misc{a, title = {First}, year = 2020}\n@misc{b, title = {Second}, year = 2021}\n",
        )
        .unwrap();

        let entries = format_file(&path).unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.html.is_empty()));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp = tempdir().unwrap();

        let result = format_file(&temp.path().join("absent.bib"));

        assert!(matches!(result, Err(BibError::Read { .. })));
    }
}
