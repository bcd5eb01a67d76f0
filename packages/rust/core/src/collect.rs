//! Collection assembler.
//!
//! Two passes over the tree: sidecars first, so every content file can be
//! paired with its metadata, then the Markdown files themselves. The result
//! is sorted by (track, skill, module, type, sequence).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use lessonmap_shared::{ContentType, LessonmapError, Record, Result, SidecarConfig};

use crate::classify;
use crate::record::{Titles, build_records};
use crate::report::{ScanIssue, ScanReporter};
use crate::sidecar::{SidecarOptions, load_sidecar};

/// Sidecar configs keyed by [`classify::config_key`].
pub type SidecarIndex = HashMap<String, SidecarConfig>;

/// Scan `root` and build the sorted record collection.
///
/// Per-file failures are reported and skipped; only an unreadable root is an
/// error.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn assemble(
    root: &Path,
    opts: SidecarOptions,
    reporter: &dyn ScanReporter,
) -> Result<Vec<Record>> {
    let files = walk_files(root, reporter)?;

    reporter.phase("Loading sidecars");
    let sidecars = index_sidecars(root, &files, opts, reporter);

    reporter.phase("Reading content");
    let no_sidecar = SidecarConfig::default();
    let mut records = Vec::new();
    let mut processed = 0;

    for path in files.iter().filter(|p| has_name(p, classify::is_markdown)) {
        let classification = classify::classify(root, path);
        match read_titles(path, classification.content_type) {
            Ok(titles) => {
                let sidecar = sidecars
                    .get(&classification.config_key)
                    .unwrap_or(&no_sidecar);
                records.extend(build_records(&classification, sidecar, titles));
                processed += 1;
                reporter.file_processed(&classification.relative_path, processed);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable content file");
                reporter.issue(&ScanIssue::error(Some(path), e.to_string()));
            }
        }
    }

    sort_records(&mut records);

    info!(
        files = processed,
        sidecars = sidecars.len(),
        records = records.len(),
        "collection assembled"
    );

    Ok(records)
}

/// Load every sidecar in `files`. Later duplicates of a key replace earlier ones.
pub fn index_sidecars(
    root: &Path,
    files: &[PathBuf],
    opts: SidecarOptions,
    reporter: &dyn ScanReporter,
) -> SidecarIndex {
    let mut index = SidecarIndex::new();

    for path in files.iter().filter(|p| has_name(p, classify::is_sidecar)) {
        let key = classify::config_key(&classify::relative_segments(root, path));
        let config = load_sidecar(path, opts, reporter);
        debug!(%key, path = %path.display(), "indexed sidecar");
        if index.insert(key.clone(), config).is_some() {
            debug!(%key, "sidecar key seen before, keeping the later one");
        }
    }

    index
}

/// Stable sort by (track, skill, module, type, sequence), absent values first.
pub fn sort_records(records: &mut [Record]) {
    records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
}

fn sort_key(record: &Record) -> (&str, &str, &str, &str, &str) {
    (
        record.track.as_deref().unwrap_or_default(),
        record.skill.as_deref().unwrap_or_default(),
        record.module.as_deref().unwrap_or_default(),
        record.content_type.as_str(),
        record.sequence.as_deref().unwrap_or_default(),
    )
}

fn read_titles(path: &Path, content_type: ContentType) -> Result<Titles> {
    match content_type {
        ContentType::Activity | ContentType::Topic => {
            lessonmap_markdown::read_first_heading(path).map(Titles::Single)
        }
        ContentType::Container => {
            lessonmap_markdown::read_container_titles(path).map(Titles::Container)
        }
        ContentType::Config => Ok(Titles::Single(None)),
    }
}

/// Every regular file under `root` (including symlinks to files), sorted by
/// name within each directory.
///
/// Unreadable entries below the root are reported and skipped.
pub(crate) fn walk_files(root: &Path, reporter: &dyn ScanReporter) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(LessonmapError::Walk(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            // `Path::is_file` follows the link, so symlinked files are kept.
            Ok(entry) if entry.path().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                reporter.issue(&ScanIssue::error(e.path(), e.to_string()));
            }
        }
    }

    debug!(count = files.len(), "walked tree");
    Ok(files)
}

fn has_name(path: &Path, predicate: fn(&str) -> bool) -> bool {
    path.file_name()
        .is_some_and(|name| predicate(&name.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CollectingReporter, IssueLevel, SilentReporter};
    use lessonmap_shared::{Lang, RECORD_KEYS};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "README.md", "# Curriculum\n");
        write(root, "web/README.md", "# Web\n## Desarrollo Web\n## Desenvolvimento Web\n");
        write(root, "web/01-js/README.md", "## JavaScript\n");
        write(root, "web/01-js/02-basics/README.md", "## Básicos\n## Básicos PT\n");
        write(
            root,
            "web/01-js/02-basics/activities/README.md",
            "## Actividades\n## Atividades\n",
        );
        write(root, "web/01-js/02-basics/activities/02_loops_ES.md", "# Bucles\n");
        write(root, "web/01-js/02-basics/activities/01_vars_ES.md", "# Variables\n");
        write(root, "web/01-js/02-basics/activities/01_vars_PT.md", "# Variáveis\n");
        write(
            root,
            "web/01-js/02-basics/activities/01_vars_CONFIG.json",
            r#"{"learning": "Variables", "time": "30",
               "discord_URL": {"ES": "https://discord.com/channels/1/2/3", "PT": "https://discord.com/channels/1/4/5"}}"#,
        );
        write(root, "web/01-js/02-basics/topics/01_scope_ES.md", "intro\n# Alcance\n");
        write(root, "web/01-js/02-basics/notes.txt", "ignored");
        dir
    }

    #[test]
    fn assembles_sample_tree() {
        let dir = sample_tree();
        let reporter = CollectingReporter::new();
        let records = assemble(dir.path(), SidecarOptions::default(), &reporter).unwrap();

        assert!(reporter.issues().is_empty());
        // root README (untitled) + 2 track + 1 skill + 2 module + 2 nested + 3 activities + 1 topic
        assert_eq!(records.len(), 12);

        let vars: Vec<&Record> = records
            .iter()
            .filter(|r| r.path.contains("01_vars"))
            .collect();
        assert_eq!(vars.len(), 2);
        for r in &vars {
            assert_eq!(r.learning.as_deref(), Some("Variables"));
            assert_eq!(r.time.as_deref(), Some("30"));
        }
        let pt = vars.iter().find(|r| r.lang == Some(Lang::Pt)).unwrap();
        assert_eq!(pt.discord_message_id.as_deref(), Some("5"));

        let loops = records.iter().find(|r| r.path.contains("02_loops")).unwrap();
        assert_eq!(loops.learning, None);
        assert_eq!(loops.discord_url, None);
    }

    #[test]
    fn records_sorted_by_hierarchy_type_and_sequence() {
        let dir = sample_tree();
        let records = assemble(dir.path(), SidecarOptions::default(), &SilentReporter).unwrap();

        assert_eq!(records[0].path, "README.md");
        let modules: Vec<(&str, &str)> = records
            .iter()
            .filter(|r| r.module.as_deref() == Some("02-basics"))
            .map(|r| (r.content_type.as_str(), r.sequence.as_deref().unwrap_or("")))
            .collect();
        assert_eq!(
            modules,
            vec![
                ("activity", "01"),
                ("activity", "01"),
                ("activity", "02"),
                ("container", "00"),
                ("container", "00"),
                ("container", "02"),
                ("container", "02"),
                ("topic", "01"),
            ]
        );
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let dir = sample_tree();
        let records = assemble(dir.path(), SidecarOptions::default(), &SilentReporter).unwrap();

        let track_titles: Vec<&str> = records
            .iter()
            .filter(|r| r.path == "web/README.md")
            .filter_map(|r| r.title.as_deref())
            .collect();
        assert_eq!(track_titles, vec!["Desarrollo Web", "Desenvolvimento Web"]);

        let vars_langs: Vec<Option<Lang>> = records
            .iter()
            .filter(|r| r.path.contains("01_vars"))
            .map(|r| r.lang)
            .collect();
        assert_eq!(vars_langs, vec![Some(Lang::Es), Some(Lang::Pt)]);
    }

    #[test]
    fn every_record_has_the_full_key_set() {
        let dir = sample_tree();
        let records = assemble(dir.path(), SidecarOptions::default(), &SilentReporter).unwrap();
        let json = serde_json::to_value(&records).unwrap();

        for row in json.as_array().unwrap() {
            let keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
            assert_eq!(keys, RECORD_KEYS);
        }
    }

    #[test]
    fn malformed_sidecar_degrades_to_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "t/s/m/activities/01_x_ES.md", "# X\n");
        write(dir.path(), "t/s/m/activities/01_x_CONFIG.json", "{ broken");

        let reporter = CollectingReporter::new();
        let records = assemble(dir.path(), SidecarOptions::default(), &reporter).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("X"));
        assert_eq!(records[0].learning, None);
        let issues = reporter.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, IssueLevel::Warning);
    }

    #[test]
    fn sidecar_index_keys_drop_the_config_suffix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "t/a_CONFIG.json", r#"{"time": "first"}"#);
        write(dir.path(), "t/a_OLD.json", "{}");
        write(dir.path(), "t/a_x_CONFIG.json", r#"{"time": "other key"}"#);
        let files = walk_files(dir.path(), &SilentReporter).unwrap();

        let index = index_sidecars(dir.path(), &files, SidecarOptions::default(), &SilentReporter);
        assert_eq!(index.len(), 2);
        assert_eq!(index["t/a"].time.as_deref(), Some("first"));
        assert_eq!(index["t/a_x"].time.as_deref(), Some("other key"));
    }

    #[test]
    fn non_utf8_content_is_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "t/README.md", "## Ok\n");
        let bad = dir.path().join("t/s/m/activities/01_bad_ES.md");
        std::fs::create_dir_all(bad.parent().unwrap()).unwrap();
        std::fs::write(&bad, [0xff, 0xfe, b'\n']).unwrap();

        let reporter = CollectingReporter::new();
        let records = assemble(dir.path(), SidecarOptions::default(), &reporter).unwrap();

        assert_eq!(records.len(), 1);
        let issues = reporter.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, IssueLevel::Error);
        assert_eq!(issues[0].path.as_deref(), Some(bad.as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_lesson_is_collected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shared/01_x_ES.md", "# Compartida\n");
        write(dir.path(), "shared/01_x_CONFIG.json", r#"{"time": "15"}"#);
        let activities = dir.path().join("t/s/m/activities");
        std::fs::create_dir_all(&activities).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("shared/01_x_ES.md"),
            activities.join("01_x_ES.md"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("shared/01_x_CONFIG.json"),
            activities.join("01_x_CONFIG.json"),
        )
        .unwrap();

        let reporter = CollectingReporter::new();
        let records = assemble(dir.path(), SidecarOptions::default(), &reporter).unwrap();

        assert!(reporter.issues().is_empty());
        let linked = records
            .iter()
            .find(|r| r.path == "t/s/m/activities/01_x_ES.md")
            .unwrap();
        assert_eq!(linked.content_type, ContentType::Activity);
        assert_eq!(linked.title.as_deref(), Some("Compartida"));
        assert_eq!(linked.time.as_deref(), Some("15"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = assemble(
            &dir.path().join("nope"),
            SidecarOptions::default(),
            &SilentReporter,
        )
        .unwrap_err();
        assert!(matches!(err, LessonmapError::Walk(_)));
    }
}
