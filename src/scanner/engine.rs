//! Scan engine: one depth-first pass that turns matching directories into
//! artifact records.
//!
//! A directory whose basename is in the pattern registry (and passes the
//! category filter) is aggregated and recorded; the walk never descends into
//! it, so records cannot nest. Everything else is walked into, except the
//! version-control skip set. Listing failures make a directory look empty.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use crate::core::paths::relative_to;
use crate::scanner::aggregate::aggregate;
use crate::scanner::filter::CategoryFilter;
use crate::scanner::patterns::{ArtifactPatternRegistry, is_always_skipped};

/// Artifacts below this size are dropped from scan output.
pub const MIN_ARTIFACT_BYTES: u64 = 100 * 1024;

/// One discovered artifact directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub absolute_path: PathBuf,
    /// Path relative to the scan root.
    pub relative_path: PathBuf,
    /// Registry key that matched.
    pub basename: String,
    pub description: String,
    pub size_bytes: u64,
    pub file_count: u64,
    /// Newest modification time inside the subtree.
    pub last_modified: Option<SystemTime>,
}

/// Progress sink: receives best-effort human-readable status strings.
pub type ProgressFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Scan options resolved by the caller.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub filter: Option<CategoryFilter>,
}

/// Single-threaded artifact scanner.
pub struct ArtifactScanner<'a> {
    registry: &'a ArtifactPatternRegistry,
    allowed: Option<HashSet<String>>,
    progress: Option<ProgressFn>,
    cancel: Option<Arc<AtomicBool>>,
}

struct WalkState<'r> {
    root: &'r Path,
    records: Vec<ArtifactRecord>,
}

impl<'a> ArtifactScanner<'a> {
    pub fn new(registry: &'a ArtifactPatternRegistry, options: &ScanOptions) -> Self {
        Self {
            registry,
            allowed: options
                .filter
                .as_ref()
                .map(|filter| filter.allowed_basenames(registry)),
            progress: None,
            cancel: None,
        }
    }

    /// Attach a progress sink.
    #[must_use]
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Attach a cancellation flag. Once raised, the walk stops descending and
    /// returns whatever it has collected.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Walk `root` and return records sorted by size (largest first), with
    /// everything under [`MIN_ARTIFACT_BYTES`] removed.
    pub fn scan(&self, root: &Path) -> Vec<ArtifactRecord> {
        let mut state = WalkState {
            root,
            records: Vec::new(),
        };
        self.walk(root, 0, &mut state);

        let mut records = state.records;
        // Stable: equal sizes keep enumeration order.
        records.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
        records.retain(|record| record.size_bytes >= MIN_ARTIFACT_BYTES);
        records
    }

    fn walk(&self, dir: &Path, depth: usize, state: &mut WalkState<'_>) {
        if self.is_cancelled() {
            return;
        }

        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry_result in entries {
            let Ok(entry) = entry_result else {
                continue;
            };
            // file_type() does not follow symlinks: a link to a directory is
            // neither matched nor descended.
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }

            let name_os = entry.file_name();
            let name = name_os.to_string_lossy();
            if is_always_skipped(&name) {
                continue;
            }

            let path = entry.path();
            if let Some(description) = self.matching_description(&name) {
                let relative = relative_to(state.root, &path);
                self.report(&format!("checking {}", relative.display()));
                let stats = aggregate(&path);
                state.records.push(ArtifactRecord {
                    absolute_path: path,
                    relative_path: relative,
                    basename: name.into_owned(),
                    description: description.to_string(),
                    size_bytes: stats.size_bytes,
                    file_count: stats.file_count,
                    last_modified: stats.last_modified,
                });
                continue;
            }

            if depth == 0 {
                self.report(&format!("scanning {name}"));
            }
            self.walk(&path, depth + 1, state);
        }
    }

    fn matching_description(&self, name: &str) -> Option<&'a str> {
        let description = self.registry.lookup(name)?;
        match &self.allowed {
            Some(allowed) if !allowed.contains(name) => None,
            _ => Some(description),
        }
    }

    fn report(&self, status: &str) {
        if let Some(progress) = &self.progress {
            progress(status);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Scan `root` once with an optional category filter and no progress sink.
pub fn scan(
    root: &Path,
    registry: &ArtifactPatternRegistry,
    filter: Option<CategoryFilter>,
) -> Vec<ArtifactRecord> {
    ArtifactScanner::new(registry, &ScanOptions { filter }).scan(root)
}
