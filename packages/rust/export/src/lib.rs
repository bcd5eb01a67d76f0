//! Export sinks for lessonmap collections.
//!
//! A collection is written as `<stem>.csv`, `<stem>.json` and/or `<stem>.yaml`
//! in the output directory, and may be pushed to a remote ingestion endpoint.
//! Files are written atomically (temp file, then rename) and reported with
//! their SHA-256 checksum.

mod remote;

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use lessonmap_shared::{ExportFormat, LessonmapError, Record, Result};

pub use remote::{PushOutcome, push_records};

/// Metadata for a single written export file.
#[derive(Debug, Clone, Serialize)]
pub struct ExportMeta {
    pub filename: String,
    pub path: PathBuf,
    pub format: ExportFormat,
    pub sha256: String,
    pub size_bytes: usize,
    pub rows: usize,
}

/// Write `records` as `<out_dir>/<stem>.<ext>`.
///
/// Returns `None` when nothing was written: a CSV needs at least one row to
/// derive its header, so an empty collection skips the CSV sink.
#[instrument(skip(records), fields(rows = records.len()))]
pub fn write_export(
    out_dir: &Path,
    stem: &str,
    format: ExportFormat,
    records: &[Record],
) -> Result<Option<ExportMeta>> {
    let filename = format!("{stem}.{}", format.extension());
    let path = out_dir.join(&filename);

    let content = match format {
        ExportFormat::Csv => {
            if records.is_empty() {
                warn!(file = %filename, "no rows to write, skipping CSV export");
                return Ok(None);
            }
            to_csv(records)?
        }
        ExportFormat::Json => to_json(records)?,
        ExportFormat::Yaml => to_yaml(records)?,
    };

    write_atomic(&path, content.as_bytes())?;

    let meta = ExportMeta {
        filename,
        path,
        format,
        sha256: sha256_hex(content.as_bytes()),
        size_bytes: content.len(),
        rows: records.len(),
    };
    debug!(file = %meta.filename, size = meta.size_bytes, sha256 = %meta.sha256, "wrote export");

    Ok(Some(meta))
}

/// Write `records` in every requested format.
pub fn write_all(
    out_dir: &Path,
    stem: &str,
    formats: &[ExportFormat],
    records: &[Record],
) -> Result<Vec<ExportMeta>> {
    std::fs::create_dir_all(out_dir).map_err(|e| LessonmapError::io(out_dir, e))?;

    let mut metas = Vec::with_capacity(formats.len());
    for &format in formats {
        if let Some(meta) = write_export(out_dir, stem, format, records)? {
            metas.push(meta);
        }
    }

    info!(stem, files = metas.len(), rows = records.len(), "data saved");
    Ok(metas)
}

// ---------------------------------------------------------------------------
// Serializers
// ---------------------------------------------------------------------------

/// Header row from the record fields, then one row per record.
pub fn to_csv(records: &[Record]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| LessonmapError::Serialization(format!("CSV row: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LessonmapError::Serialization(format!("CSV flush: {e}")))?;
    String::from_utf8(bytes).map_err(|e| LessonmapError::Serialization(e.to_string()))
}

/// Indented JSON array mirroring the records.
pub fn to_json(records: &[Record]) -> Result<String> {
    serde_json::to_string_pretty(records)
        .map_err(|e| LessonmapError::Serialization(format!("JSON: {e}")))
}

/// Block-style YAML sequence mirroring the records.
pub fn to_yaml(records: &[Record]) -> Result<String> {
    serde_yaml::to_string(records).map_err(|e| LessonmapError::Serialization(format!("YAML: {e}")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = target.with_file_name(format!(".{name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| LessonmapError::io(&temp, e))?;
    std::fs::rename(&temp, target).map_err(|e| LessonmapError::io(target, e))?;
    Ok(())
}

fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
