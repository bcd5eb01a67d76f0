//! Sidecar (`_CONFIG.json`) loading and normalization.
//!
//! Sidecars are hand-edited and often pasted from rich-text editors, so the
//! raw text may carry control bytes or unescaped backslashes. Loading is
//! forgiving: anything unreadable becomes an empty [`SidecarConfig`] and an
//! issue on the reporter. Rewriting the files is a separate, explicit pass
//! ([`normalize_sidecars`]).

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use lessonmap_shared::{LessonmapError, Result, SidecarConfig};

use crate::collect::walk_files;
use crate::classify::is_sidecar;
use crate::report::{ScanIssue, ScanReporter};

/// How raw sidecar text is treated before parsing.
#[derive(Debug, Clone, Copy)]
pub struct SidecarOptions {
    /// Strip control characters and escape stray backslashes.
    pub sanitize: bool,
}

impl Default for SidecarOptions {
    fn default() -> Self {
        Self { sanitize: true }
    }
}

/// Outcome of a normalization pass over a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    /// Sidecars found.
    pub scanned: usize,
    /// Sidecars whose content changed on disk.
    pub rewritten: usize,
    /// Sidecars that could not be read, parsed or written.
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a sidecar, falling back to an empty config on any failure.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_sidecar(
    path: &Path,
    opts: SidecarOptions,
    reporter: &dyn ScanReporter,
) -> SidecarConfig {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "could not read sidecar");
            reporter.issue(&ScanIssue::error(
                Some(path),
                format!("could not read sidecar: {e}"),
            ));
            return SidecarConfig::default();
        }
    };

    match parse_sidecar(&raw, opts) {
        Ok(config) => {
            debug!(?config, "loaded sidecar");
            config
        }
        Err(e) => {
            warn!(error = %e, "malformed sidecar, using empty config");
            reporter.issue(&ScanIssue::warning(Some(path), e.to_string()));
            SidecarConfig::default()
        }
    }
}

/// Parse sidecar text into the recognized fields.
pub fn parse_sidecar(raw: &str, opts: SidecarOptions) -> Result<SidecarConfig> {
    let value = parse_value(raw, opts)?;
    let Value::Object(map) = value else {
        return Err(LessonmapError::parse("sidecar is not a JSON object"));
    };
    Ok(sidecar_from_map(&map))
}

fn parse_value(raw: &str, opts: SidecarOptions) -> Result<Value> {
    let result = if opts.sanitize {
        serde_json::from_str(&sanitize_json_text(raw))
    } else {
        serde_json::from_str(raw)
    };
    result.map_err(|e| LessonmapError::parse(format!("invalid sidecar JSON: {e}")))
}

fn sidecar_from_map(map: &Map<String, Value>) -> SidecarConfig {
    let (discord_url_es, discord_url_pt) = match map.get("discord_URL") {
        Some(Value::Object(by_lang)) => (text_field(by_lang, "ES"), text_field(by_lang, "PT")),
        Some(_) => (text_field(map, "discord_URL"), text_field(map, "discord_URL_PT")),
        None => (None, text_field(map, "discord_URL_PT")),
    };

    SidecarConfig {
        learning: text_field(map, "learning"),
        difficulty: text_field(map, "difficulty"),
        time: text_field(map, "time"),
        directions: text_field(map, "directions"),
        discord_url_es,
        discord_url_pt,
    }
}

/// A scalar field rendered as text; `null`, arrays and objects are ignored.
fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            debug!(key, kind = value_kind(other), "ignoring non-scalar sidecar field");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        _ => "scalar",
    }
}

// ---------------------------------------------------------------------------
// Sanitizing
// ---------------------------------------------------------------------------

/// Remove control characters and escape backslashes that do not begin a
/// valid JSON escape sequence.
///
/// Valid escapes are left alone, so sanitizing already-clean text only drops
/// insignificant whitespace control characters (newlines, tabs).
pub fn sanitize_json_text(raw: &str) -> String {
    static CONTROL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[\x00-\x1f\x7f]").expect("valid regex"));

    let stripped = CONTROL_RE.replace_all(raw, "");
    escape_stray_backslashes(&stripped)
}

fn escape_stray_backslashes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }

        match chars.get(i + 1) {
            Some(&next @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')) => {
                out.push('\\');
                out.push(next);
                i += 2;
            }
            Some('u') if is_unicode_escape(&chars[i + 2..]) => {
                out.push_str("\\u");
                i += 2;
            }
            _ => {
                out.push_str("\\\\");
                i += 1;
            }
        }
    }

    out
}

fn is_unicode_escape(rest: &[char]) -> bool {
    rest.len() >= 4 && rest[..4].iter().all(char::is_ascii_hexdigit)
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Rewrite one sidecar as pretty-printed JSON.
///
/// Key order and non-ASCII text are preserved. Returns `true` when the file
/// content changed; an already-normalized file is left untouched.
pub fn normalize_sidecar(path: &Path, opts: SidecarOptions) -> Result<bool> {
    let raw = std::fs::read_to_string(path).map_err(|e| LessonmapError::io(path, e))?;
    let value = parse_value(&raw, opts)?;
    let pretty = serde_json::to_string_pretty(&value)
        .map_err(|e| LessonmapError::Serialization(e.to_string()))?;

    if pretty == raw {
        return Ok(false);
    }

    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, &pretty).map_err(|e| LessonmapError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| LessonmapError::io(path, e))?;
    Ok(true)
}

/// Normalize every sidecar under `root`.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn normalize_sidecars(
    root: &Path,
    opts: SidecarOptions,
    reporter: &dyn ScanReporter,
) -> Result<NormalizeSummary> {
    reporter.phase("Normalizing sidecars");
    let mut summary = NormalizeSummary::default();

    for path in walk_files(root, reporter)? {
        if !path
            .file_name()
            .is_some_and(|name| is_sidecar(&name.to_string_lossy()))
        {
            continue;
        }

        summary.scanned += 1;
        match normalize_sidecar(&path, opts) {
            Ok(true) => {
                debug!(path = %path.display(), "rewrote sidecar");
                summary.rewritten += 1;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not normalize sidecar");
                reporter.issue(&ScanIssue::error(Some(&path), e.to_string()));
                summary.failed += 1;
            }
        }
    }

    info!(
        scanned = summary.scanned,
        rewritten = summary.rewritten,
        failed = summary.failed,
        "sidecar normalization complete"
    );

    Ok(summary)
}
