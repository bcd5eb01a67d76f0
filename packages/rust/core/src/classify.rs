//! Path classifier.
//!
//! Everything here is derived from a file's location and name alone; file
//! contents are never read. Segment names are not validated, any string is a
//! valid track, skill or module.

use std::path::{Component, Path};

use lessonmap_shared::{ContentType, Lang};

/// File name suffix of sidecar configuration files.
pub const SIDECAR_SUFFIX: &str = "_CONFIG.json";
/// Extension of content files.
pub const MARKDOWN_EXT: &str = ".md";
/// File name of hierarchy-node descriptions.
pub const CONTAINER_FILE: &str = "README.md";

const ACTIVITIES_DIR: &str = "activities";
const TOPICS_DIR: &str = "topics";

/// Sequence given to containers that live inside an activities/topics directory.
const NESTED_CONTAINER_SEQUENCE: &str = "00";

/// Position of a file in the track/skill/module hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub track: Option<String>,
    pub skill: Option<String>,
    pub module: Option<String>,
}

/// Everything the classifier knows about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub hierarchy: Hierarchy,
    pub content_type: ContentType,
    pub lang: Option<Lang>,
    pub sequence: Option<String>,
    /// Path relative to the scan root, `/`-separated.
    pub relative_path: String,
    /// Key shared with the matching sidecar, see [`config_key`].
    pub config_key: String,
}

/// Classify the file at `path`, found while scanning `root`.
pub fn classify(root: &Path, path: &Path) -> Classification {
    let segments = relative_segments(root, path);
    let (dirs, file_name) = split_file_name(&segments);
    let content_type = content_type(dirs, file_name);

    Classification {
        hierarchy: hierarchy(&segments),
        content_type,
        lang: lang(file_name),
        sequence: sequence(content_type, dirs, file_name),
        relative_path: segments.join("/"),
        config_key: config_key(&segments),
    }
}

pub fn is_sidecar(file_name: &str) -> bool {
    file_name.ends_with(SIDECAR_SUFFIX)
}

pub fn is_markdown(file_name: &str) -> bool {
    file_name.ends_with(MARKDOWN_EXT)
}

/// Path segments of `path` below `root`.
///
/// `.` and `..` components are dropped; a path outside `root` keeps all of
/// its normal components.
pub fn relative_segments(root: &Path, path: &Path) -> Vec<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// First three directory segments as track, skill and module.
///
/// A trailing content file name (Markdown or sidecar) is not a level.
pub fn hierarchy(segments: &[String]) -> Hierarchy {
    let levels = match segments.split_last() {
        Some((last, dirs)) if is_markdown(last) || is_sidecar(last) => dirs,
        _ => segments,
    };

    Hierarchy {
        track: levels.first().cloned(),
        skill: levels.get(1).cloned(),
        module: levels.get(2).cloned(),
    }
}

/// Content type by precedence: sidecar, activity, topic, then container.
pub fn content_type(dirs: &[String], file_name: &str) -> ContentType {
    let lesson_file = is_markdown(file_name) && file_name != CONTAINER_FILE;

    if is_sidecar(file_name) {
        ContentType::Config
    } else if lesson_file && has_segment(dirs, ACTIVITIES_DIR) {
        ContentType::Activity
    } else if lesson_file && has_segment(dirs, TOPICS_DIR) {
        ContentType::Topic
    } else {
        ContentType::Container
    }
}

/// Language from a `_ES.md` / `_PT.md` suffix.
pub fn lang(file_name: &str) -> Option<Lang> {
    if file_name.ends_with("_ES.md") {
        Some(Lang::Es)
    } else if file_name.ends_with("_PT.md") {
        Some(Lang::Pt)
    } else {
        None
    }
}

/// Two-character ordering token.
///
/// Lessons use the first two characters of their file name. Containers use
/// `00` inside an activities/topics directory and otherwise the first two
/// characters of their directory name; a container at the scan root has none.
/// The characters are taken verbatim, digits or not.
pub fn sequence(content_type: ContentType, dirs: &[String], file_name: &str) -> Option<String> {
    match content_type {
        ContentType::Activity | ContentType::Topic => Some(first_two(file_name)),
        ContentType::Container => {
            if has_segment(dirs, ACTIVITIES_DIR) || has_segment(dirs, TOPICS_DIR) {
                Some(NESTED_CONTAINER_SEQUENCE.to_string())
            } else {
                dirs.last().map(|dir| first_two(dir))
            }
        }
        ContentType::Config => None,
    }
}

/// Key that pairs a content file with its sidecar.
///
/// The file name loses its extension and its last `_`-separated part, so
/// `intro_ES.md`, `intro_PT.md` and `intro_CONFIG.json` in the same directory
/// all map to `<dir>/intro`.
pub fn config_key(segments: &[String]) -> String {
    let Some((file_name, dirs)) = segments.split_last() else {
        return String::new();
    };

    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name.as_str(), |(stem, _ext)| stem);
    let prefix = stem.rsplit_once('_').map_or(stem, |(prefix, _)| prefix);

    let mut parts: Vec<&str> = dirs.iter().map(String::as_str).collect();
    parts.push(prefix);
    parts.join("/")
}

/// Whether a `/`-separated relative path has a directory named `activities` or `topics`.
pub(crate) fn in_lesson_dir(relative_path: &str) -> bool {
    relative_path
        .split('/')
        .any(|s| s == ACTIVITIES_DIR || s == TOPICS_DIR)
}

fn split_file_name(segments: &[String]) -> (&[String], &str) {
    match segments.split_last() {
        Some((file_name, dirs)) => (dirs, file_name.as_str()),
        None => (&[][..], ""),
    }
}

fn has_segment(dirs: &[String], name: &str) -> bool {
    dirs.iter().any(|d| d == name)
}

fn first_two(s: &str) -> String {
    s.chars().take(2).collect()
}
