//! Core scan logic for lessonmap.
//!
//! This crate turns a curriculum tree into the record collection: path
//! classification, sidecar loading, record building, collection assembly and
//! subset filtering, tied together by the end-to-end [`run_scan`] pipeline.

pub mod classify;
pub mod collect;
pub mod filters;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod sidecar;

pub use classify::{Classification, Hierarchy, classify};
pub use collect::{SidecarIndex, assemble, sort_records};
pub use filters::Subset;
pub use pipeline::{FULL_COLLECTION, ScanResult, run_scan};
pub use record::{Titles, build_records};
pub use report::{CollectingReporter, IssueLevel, ScanIssue, ScanReporter, SilentReporter};
pub use sidecar::{
    NormalizeSummary, SidecarOptions, load_sidecar, normalize_sidecar, normalize_sidecars,
    parse_sidecar, sanitize_json_text,
};
