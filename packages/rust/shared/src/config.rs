//! Application configuration for lessonmap.
//!
//! User config lives at `~/.lessonmap/lessonmap.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LessonmapError, Result};
use crate::types::ExportFormat;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lessonmap.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lessonmap";

/// Ingestion endpoint that receives the full collection after each scan.
pub const DEFAULT_ENDPOINT: &str =
    "https://us-central1-laboratoria-prologue.cloudfunctions.net/dj-curriculum-get";

// ---------------------------------------------------------------------------
// Config structs (matching lessonmap.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scan and export defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Remote ingestion settings.
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory to scan.
    #[serde(default = "default_dir")]
    pub root: String,

    /// Directory the export files are written to.
    #[serde(default = "default_dir")]
    pub output_dir: String,

    /// Formats written for the full collection and every subset.
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,

    /// Repair control characters and stray backslashes before parsing sidecars.
    #[serde(default = "default_true")]
    pub sanitize_sidecars: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            root: default_dir(),
            output_dir: default_dir(),
            formats: default_formats(),
            sanitize_sidecars: true,
        }
    }
}

fn default_dir() -> String {
    ".".into()
}
fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Csv, ExportFormat::Json]
}
fn default_true() -> bool {
    true
}

/// `[remote]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Whether the collection is pushed after a scan.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Endpoint receiving the JSON POST.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

// ---------------------------------------------------------------------------
// Scan settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime scan configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Root of the curriculum tree.
    pub root: PathBuf,
    /// Where export files are written.
    pub output_dir: PathBuf,
    /// Export formats, in write order.
    pub formats: Vec<ExportFormat>,
    /// Push target; `None` disables the push.
    pub endpoint: Option<Url>,
    /// Repair sidecar text before parsing.
    pub sanitize_sidecars: bool,
    /// Rewrite sidecars as pretty JSON before scanning.
    pub normalize_sidecars: bool,
}

impl TryFrom<&AppConfig> for ScanSettings {
    type Error = LessonmapError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let endpoint = if config.remote.enabled {
            Some(parse_endpoint(&config.remote.endpoint)?)
        } else {
            None
        };

        Ok(Self {
            root: PathBuf::from(&config.defaults.root),
            output_dir: PathBuf::from(&config.defaults.output_dir),
            formats: config.defaults.formats.clone(),
            endpoint,
            sanitize_sidecars: config.defaults.sanitize_sidecars,
            normalize_sidecars: false,
        })
    }
}

/// Parse and check an ingestion endpoint URL.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| LessonmapError::config(format!("invalid endpoint '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LessonmapError::config(format!(
            "endpoint '{raw}' must use http or https, not {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lessonmap/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LessonmapError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lessonmap/lessonmap.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LessonmapError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LessonmapError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LessonmapError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LessonmapError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LessonmapError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
