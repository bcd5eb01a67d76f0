//! Reporter interface for scan progress and recoverable issues.
//!
//! Components never abort a run on a bad file. They describe what went wrong
//! as a [`ScanIssue`] and hand it to the [`ScanReporter`] passed in by the
//! caller, which decides how to surface it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Severity of a recoverable issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Degraded data, run continues as designed (bad sidecar, empty export).
    Warning,
    /// A file or sink failed outright.
    Error,
}

/// A structured, recoverable event raised during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    pub level: IssueLevel,
    /// File the issue relates to, if any.
    pub path: Option<PathBuf>,
    pub message: String,
}

impl ScanIssue {
    pub fn warning(path: Option<&Path>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.map(Path::to_path_buf),
            message: message.into(),
        }
    }

    pub fn error(path: Option<&Path>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.map(Path::to_path_buf),
            message: message.into(),
        }
    }
}

/// Progress and issue callback for scan operations.
pub trait ScanReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each content file has been turned into records.
    fn file_processed(&self, path: &str, current: usize);
    /// Called for every recoverable issue.
    fn issue(&self, issue: &ScanIssue);
}

/// No-op reporter for headless usage.
pub struct SilentReporter;

impl ScanReporter for SilentReporter {
    fn phase(&self, _name: &str) {}
    fn file_processed(&self, _path: &str, _current: usize) {}
    fn issue(&self, _issue: &ScanIssue) {}
}

/// Reporter that keeps every issue in memory.
#[derive(Default)]
pub struct CollectingReporter {
    issues: Mutex<Vec<ScanIssue>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the issues reported so far.
    pub fn issues(&self) -> Vec<ScanIssue> {
        self.issues
            .lock()
            .map(|issues| issues.clone())
            .unwrap_or_default()
    }
}

impl ScanReporter for CollectingReporter {
    fn phase(&self, _name: &str) {}
    fn file_processed(&self, _path: &str, _current: usize) {}

    fn issue(&self, issue: &ScanIssue) {
        if let Ok(mut issues) = self.issues.lock() {
            issues.push(issue.clone());
        }
    }
}

/// Wraps another reporter and counts issues by level.
pub(crate) struct CountingReporter<'a> {
    inner: &'a dyn ScanReporter,
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl<'a> CountingReporter<'a> {
    pub(crate) fn new(inner: &'a dyn ScanReporter) -> Self {
        Self {
            inner,
            warnings: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        }
    }

    pub(crate) fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    pub(crate) fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }
}

impl ScanReporter for CountingReporter<'_> {
    fn phase(&self, name: &str) {
        self.inner.phase(name);
    }

    fn file_processed(&self, path: &str, current: usize) {
        self.inner.file_processed(path, current);
    }

    fn issue(&self, issue: &ScanIssue) {
        let counter = match issue.level {
            IssueLevel::Warning => &self.warnings,
            IssueLevel::Error => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.inner.issue(issue);
    }
}
