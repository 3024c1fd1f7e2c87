//! Deletion executor: recursive removal of selected artifacts with dry-run support.
//!
//! Pre-flight checks before each deletion:
//! 1. Path still exists (may have been removed since the scan)
//! 2. Path is a real directory, not a symlink that now points elsewhere
//!
//! Failures are recorded and the run continues with the next record.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::core::errors::{Result, SweepError};
use crate::logger::activity::{ActivityEvent, ActivityLog};
use crate::scanner::engine::ArtifactRecord;

/// Configuration for the deletion executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionConfig {
    /// Report what would be deleted without touching the filesystem.
    pub dry_run: bool,
}

/// Summary after a deletion run completes.
#[derive(Debug, Clone, Default)]
pub struct DeletionReport {
    pub items_deleted: usize,
    pub items_failed: usize,
    pub items_skipped: usize,
    /// Bytes freed, or bytes that would be freed in dry-run mode.
    pub bytes_freed: u64,
    pub duration: Duration,
    pub errors: Vec<DeletionError>,
    pub dry_run: bool,
    /// The cancel flag stopped the run before every record was visited.
    pub cancelled: bool,
}

impl DeletionReport {
    /// True when at least one item failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.items_failed > 0
    }
}

/// A single deletion failure record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionError {
    pub path: PathBuf,
    pub error: String,
    pub error_code: String,
}

/// Reason a record was skipped during pre-flight checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    PathGone,
    NotADirectory,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PathGone => "no longer exists",
            Self::NotADirectory => "no longer a directory",
        }
    }
}

/// What happened to one record. Passed to the per-item callback.
#[derive(Debug, Clone, Copy)]
pub enum DeletionOutcome<'a> {
    Deleted(&'a ArtifactRecord),
    WouldDelete(&'a ArtifactRecord),
    Skipped(&'a ArtifactRecord, SkipReason),
    Failed(&'a ArtifactRecord, &'a DeletionError),
}

/// Deletes selected artifact directories and reports per-item outcomes.
pub struct DeletionExecutor<'a> {
    config: DeletionConfig,
    log: &'a ActivityLog,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> DeletionExecutor<'a> {
    #[must_use]
    pub const fn new(config: DeletionConfig, log: &'a ActivityLog) -> Self {
        Self {
            config,
            log,
            cancel: None,
        }
    }

    /// Stop before the next record once `flag` is raised. The record in
    /// flight is always finished.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Delete each record in order, invoking `on_outcome` after every item.
    pub fn execute<F>(&self, records: &[ArtifactRecord], mut on_outcome: F) -> DeletionReport
    where
        F: FnMut(DeletionOutcome<'_>),
    {
        let start = Instant::now();
        let mut report = DeletionReport {
            dry_run: self.config.dry_run,
            ..DeletionReport::default()
        };

        for record in records {
            if self.cancel.as_ref().is_some_and(|f| f.load(Ordering::Relaxed)) {
                report.cancelled = true;
                break;
            }
            if let Err(reason) = preflight_check(&record.absolute_path) {
                report.items_skipped += 1;
                on_outcome(DeletionOutcome::Skipped(record, reason));
                continue;
            }

            if self.config.dry_run {
                report.items_deleted += 1;
                report.bytes_freed = report.bytes_freed.saturating_add(record.size_bytes);
                self.log_deleted(record, Duration::ZERO);
                on_outcome(DeletionOutcome::WouldDelete(record));
                continue;
            }

            let item_start = Instant::now();
            match delete_path(&record.absolute_path) {
                Ok(()) => {
                    report.items_deleted += 1;
                    report.bytes_freed = report.bytes_freed.saturating_add(record.size_bytes);
                    self.log_deleted(record, item_start.elapsed());
                    on_outcome(DeletionOutcome::Deleted(record));
                }
                Err(e) => {
                    let err = DeletionError {
                        path: record.absolute_path.clone(),
                        error: e.to_string(),
                        error_code: e.code().to_string(),
                    };
                    self.log.record(ActivityEvent::ArtifactDeletionFailed {
                        path: err.path.to_string_lossy().into_owned(),
                        error_code: err.error_code.clone(),
                        error_message: err.error.clone(),
                    });
                    report.items_failed += 1;
                    on_outcome(DeletionOutcome::Failed(record, &err));
                    report.errors.push(err);
                }
            }
        }

        self.log.flush();
        report.duration = start.elapsed();
        report
    }

    fn log_deleted(&self, record: &ArtifactRecord, elapsed: Duration) {
        self.log.record(ActivityEvent::ArtifactDeleted {
            path: record.absolute_path.to_string_lossy().into_owned(),
            size_bytes: record.size_bytes,
            file_count: record.file_count,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            dry_run: self.config.dry_run,
        });
    }
}

fn preflight_check(path: &Path) -> std::result::Result<(), SkipReason> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_dir() => Ok(()),
        Ok(_) => Err(SkipReason::NotADirectory),
        Err(_) => Err(SkipReason::PathGone),
    }
}

fn delete_path(path: &Path) -> Result<()> {
    fs::remove_dir_all(path).map_err(|source| SweepError::io(path, source))
}
