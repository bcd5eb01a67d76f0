//! End-to-end `scan` pipeline: normalize → assemble → export → push.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{error, info, instrument, warn};

use lessonmap_export::{ExportMeta, PushOutcome};
use lessonmap_shared::{ExportFormat, Record, Result, ScanSettings};

use crate::collect;
use crate::filters::Subset;
use crate::report::{CountingReporter, ScanIssue, ScanReporter};
use crate::sidecar::{self, NormalizeSummary, SidecarOptions};

/// File stem of the full collection export.
pub const FULL_COLLECTION: &str = "markdown_files";

/// Result of the `scan` pipeline.
#[derive(Debug)]
pub struct ScanResult {
    /// Records in the full collection.
    pub record_count: usize,
    /// Record count per subset, in [`Subset::ALL`] order.
    pub subset_counts: Vec<(Subset, usize)>,
    /// Every file written.
    pub exports: Vec<ExportMeta>,
    /// Present when normalization ran.
    pub normalized: Option<NormalizeSummary>,
    /// Present when a push was attempted.
    pub push: Option<PushOutcome>,
    pub warnings: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

/// Run the full `scan` pipeline.
///
/// 1. Normalize sidecars (only if requested)
/// 2. Assemble the collection
/// 3. Export the collection and each subset
/// 4. Push the collection (if an endpoint is set)
///
/// Only an unreadable root aborts the run. Bad files, failed sinks and a
/// failed push are reported through `reporter` and counted in the result.
#[instrument(skip_all, fields(root = %settings.root.display()))]
pub async fn run_scan(settings: &ScanSettings, reporter: &dyn ScanReporter) -> Result<ScanResult> {
    let start = Instant::now();
    let reporter = CountingReporter::new(reporter);
    let opts = SidecarOptions {
        sanitize: settings.sanitize_sidecars,
    };

    info!(root = %settings.root.display(), out = %settings.output_dir.display(), "starting scan");

    // --- Phase 1: Normalize ---
    let normalized = if settings.normalize_sidecars {
        Some(sidecar::normalize_sidecars(&settings.root, opts, &reporter)?)
    } else {
        None
    };

    // --- Phase 2: Assemble ---
    reporter.phase("Scanning content");
    let records = collect::assemble(&settings.root, opts, &reporter)?;

    // --- Phase 3: Export ---
    reporter.phase("Writing exports");
    let mut exports = export_collection(
        &settings.output_dir,
        FULL_COLLECTION,
        &settings.formats,
        &records,
        &reporter,
    );

    let mut subset_counts = Vec::with_capacity(Subset::ALL.len());
    for subset in Subset::ALL {
        let rows = subset.filter(&records);
        subset_counts.push((subset, rows.len()));
        exports.extend(export_collection(
            &settings.output_dir,
            subset.name(),
            &settings.formats,
            &rows,
            &reporter,
        ));
    }

    // --- Phase 4: Push ---
    let push = match &settings.endpoint {
        Some(endpoint) => {
            reporter.phase("Sending data");
            let outcome = lessonmap_export::push_records(endpoint, &records).await;
            if !outcome.is_delivered() {
                error!(%endpoint, %outcome, "push did not go through");
                reporter.issue(&ScanIssue::error(None, format!("push to {endpoint} {outcome}")));
            }
            Some(outcome)
        }
        None => None,
    };

    let result = ScanResult {
        record_count: records.len(),
        subset_counts,
        exports,
        normalized,
        push,
        warnings: reporter.warnings(),
        errors: reporter.errors(),
        elapsed: start.elapsed(),
    };

    info!(
        records = result.record_count,
        files = result.exports.len(),
        warnings = result.warnings,
        errors = result.errors,
        elapsed_ms = result.elapsed.as_millis(),
        "scan complete"
    );

    Ok(result)
}

/// Write one collection in every format, reporting instead of failing.
fn export_collection(
    out_dir: &Path,
    stem: &str,
    formats: &[ExportFormat],
    records: &[Record],
    reporter: &dyn ScanReporter,
) -> Vec<ExportMeta> {
    if records.is_empty() && formats.contains(&ExportFormat::Csv) {
        reporter.issue(&ScanIssue::warning(
            None,
            format!("no {stem} records, {stem}.csv not written"),
        ));
    }

    match lessonmap_export::write_all(out_dir, stem, formats, records) {
        Ok(metas) => metas,
        Err(e) => {
            warn!(stem, error = %e, "export failed");
            reporter.issue(&ScanIssue::error(None, format!("{stem}: {e}")));
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
