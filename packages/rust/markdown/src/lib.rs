//! Heading extraction from lesson Markdown files.
//!
//! Lesson bodies are read line by line, top to bottom, and reading stops as
//! soon as the requested headings have been found:
//! - activities and topics take their title from the first `# ` line
//! - containers carry up to two `## ` sub-titles (Spanish first, then Portuguese)

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, instrument};

use lessonmap_shared::{LessonmapError, Result};

/// Number of `## ` headers a container contributes at most.
pub const MAX_CONTAINER_TITLES: usize = 2;

const TITLE_PREFIX: &str = "# ";
const SUBTITLE_PREFIX: &str = "## ";

// ---------------------------------------------------------------------------
// Reader-based extraction
// ---------------------------------------------------------------------------

/// Text of the first line starting with `# `, trimmed.
///
/// Returns `None` when the input ends before such a line appears.
pub fn first_heading<R: BufRead>(reader: R) -> io::Result<Option<String>> {
    for line in reader.lines() {
        let line = line?;
        if let Some(text) = line.strip_prefix(TITLE_PREFIX) {
            return Ok(Some(text.trim().to_string()));
        }
    }
    Ok(None)
}

/// Trimmed text of the first [`MAX_CONTAINER_TITLES`] lines starting with `## `,
/// in file order.
pub fn container_titles<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut titles = Vec::with_capacity(MAX_CONTAINER_TITLES);

    for line in reader.lines() {
        let line = line?;
        if let Some(text) = line.strip_prefix(SUBTITLE_PREFIX) {
            titles.push(text.trim().to_string());
            if titles.len() == MAX_CONTAINER_TITLES {
                break;
            }
        }
    }

    Ok(titles)
}

// ---------------------------------------------------------------------------
// File-based extraction
// ---------------------------------------------------------------------------

/// Read the title of an activity or topic file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_first_heading(path: &Path) -> Result<Option<String>> {
    let reader = open(path)?;
    let title = first_heading(reader).map_err(|e| LessonmapError::io(path, e))?;
    debug!(found = title.is_some(), "read title");
    Ok(title)
}

/// Read the bilingual sub-titles of a container file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_container_titles(path: &Path) -> Result<Vec<String>> {
    let reader = open(path)?;
    let titles = container_titles(reader).map_err(|e| LessonmapError::io(path, e))?;
    debug!(count = titles.len(), "read container titles");
    Ok(titles)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| LessonmapError::io(path, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_heading_is_trimmed() {
        let md = "intro line\n#   Variables y tipos  \r\n\n# Second\n";
        let title = first_heading(md.as_bytes()).unwrap();
        assert_eq!(title.as_deref(), Some("Variables y tipos"));
    }

    #[test]
    fn first_heading_ignores_subheadings() {
        let md = "## Not this\n### Nor this\n#NoSpace\n# Yes\n";
        assert_eq!(first_heading(md.as_bytes()).unwrap().as_deref(), Some("Yes"));
    }

    #[test]
    fn first_heading_missing() {
        let md = "no headings here\n## only a subtitle\n";
        assert_eq!(first_heading(md.as_bytes()).unwrap(), None);
        assert_eq!(first_heading("".as_bytes()).unwrap(), None);
    }

    #[test]
    fn first_heading_must_start_the_line() {
        let md = "  # indented\n";
        assert_eq!(first_heading(md.as_bytes()).unwrap(), None);
    }

    #[test]
    fn container_titles_capped_at_two() {
        let md = "# Programa\n## Desarrollo Web\ntext\n## Desenvolvimento Web\n## Third\n";
        let titles = container_titles(md.as_bytes()).unwrap();
        assert_eq!(titles, vec!["Desarrollo Web", "Desenvolvimento Web"]);
    }

    #[test]
    fn container_titles_partial() {
        let md = "# Programa\n## Solo uno\n### deeper\n";
        assert_eq!(container_titles(md.as_bytes()).unwrap(), vec!["Solo uno"]);

        let md = "# Only an H1\n";
        assert!(container_titles(md.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("01_intro_ES.md");
        std::fs::write(&path, "# Introducción\n\nContenido.\n").unwrap();

        assert_eq!(
            read_first_heading(&path).unwrap().as_deref(),
            Some("Introducción")
        );
        assert!(read_container_titles(&path).unwrap().is_empty());
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_first_heading(&dir.path().join("gone.md")).unwrap_err();
        assert!(matches!(err, LessonmapError::Io { .. }));
    }
}
