//! Shared types, error model, and configuration for lessonmap.
//!
//! This crate is the foundation depended on by all other lessonmap crates.
//! It provides:
//! - [`LessonmapError`], the unified error type
//! - Domain types ([`Record`], [`ContentType`], [`Lang`], [`SidecarConfig`])
//! - Configuration ([`AppConfig`], [`ScanSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_ENDPOINT, DefaultsConfig, RemoteConfig, ScanSettings, config_dir,
    config_file_path, init_config, load_config, load_config_from, parse_endpoint,
};
pub use error::{LessonmapError, Result};
pub use types::{ContentType, ExportFormat, Lang, RECORD_KEYS, Record, SidecarConfig};
