//! Core domain types for lessonmap exports.

use serde::{Deserialize, Serialize};

/// Output columns, in the order every export writes them.
pub const RECORD_KEYS: [&str; 16] = [
    "track",
    "skill",
    "module",
    "title",
    "type",
    "lang",
    "sequence",
    "learning",
    "difficulty",
    "time",
    "directions",
    "path",
    "discord_URL",
    "discord_channel_id",
    "discord_message_id",
    "slug",
];

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// What a content file represents within the curriculum tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A `_CONFIG.json` sidecar.
    Config,
    /// A lesson file under an `activities` directory.
    Activity,
    /// A lesson file under a `topics` directory.
    Topic,
    /// A README-like file describing a hierarchy node.
    Container,
}

impl ContentType {
    /// Lowercase name as it appears in exports and sort keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Activity => "activity",
            Self::Topic => "topic",
            Self::Container => "container",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lang
// ---------------------------------------------------------------------------

/// Content language, taken from the `_ES` / `_PT` file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lang {
    #[serde(rename = "ES")]
    Es,
    #[serde(rename = "PT")]
    Pt,
}

impl Lang {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es => "ES",
            Self::Pt => "PT",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

/// File formats the exporter can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
}

impl ExportFormat {
    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// SidecarConfig
// ---------------------------------------------------------------------------

/// Supplementary metadata loaded from a `_CONFIG.json` sidecar.
///
/// Every field is optional; a missing or unreadable sidecar is
/// `SidecarConfig::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarConfig {
    pub learning: Option<String>,
    pub difficulty: Option<String>,
    pub time: Option<String>,
    pub directions: Option<String>,
    /// Discord thread for the Spanish content.
    pub discord_url_es: Option<String>,
    /// Discord thread for the Portuguese content.
    pub discord_url_pt: Option<String>,
}

impl SidecarConfig {
    /// The Discord URL that applies to content in `lang`.
    ///
    /// Portuguese content gets the PT link; everything else gets the ES link.
    pub fn discord_url_for(&self, lang: Option<Lang>) -> Option<&str> {
        match lang {
            Some(Lang::Pt) => self.discord_url_pt.as_deref(),
            _ => self.discord_url_es.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One normalized row of the export.
///
/// Field order is the column order of every tabular export. `None` values are
/// serialized as `null` (JSON/YAML) or an empty cell (CSV), never skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub track: Option<String>,
    pub skill: Option<String>,
    pub module: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub lang: Option<Lang>,
    pub sequence: Option<String>,
    pub learning: Option<String>,
    pub difficulty: Option<String>,
    pub time: Option<String>,
    pub directions: Option<String>,
    /// Path relative to the scan root, `/`-separated.
    pub path: String,
    #[serde(rename = "discord_URL")]
    pub discord_url: Option<String>,
    pub discord_channel_id: Option<String>,
    pub discord_message_id: Option<String>,
    pub slug: String,
}
