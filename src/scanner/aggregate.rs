//! Subtree statistics: total bytes, file count and newest modification time.
//!
//! Unreadable directories contribute zero and unreadable entries are skipped;
//! aggregation never fails as a whole.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Totals for one directory subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirStats {
    /// Sum of regular-file and symlink entry sizes.
    pub size_bytes: u64,
    /// Number of regular-file and symlink entries. Directories are not counted.
    pub file_count: u64,
    /// Newest modification time seen on any counted entry.
    pub last_modified: Option<SystemTime>,
}

impl DirStats {
    fn absorb(&mut self, other: Self) {
        self.size_bytes = self.size_bytes.saturating_add(other.size_bytes);
        self.file_count = self.file_count.saturating_add(other.file_count);
        self.last_modified = newest(self.last_modified, other.last_modified);
    }
}

fn newest(a: Option<SystemTime>, b: Option<SystemTime>) -> Option<SystemTime> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Aggregate a directory subtree.
///
/// Symlinks are counted by their own `lstat` size and never followed, so a
/// link pointing back up the tree cannot loop.
#[must_use]
pub fn aggregate(path: &Path) -> DirStats {
    let mut stats = DirStats::default();

    let Ok(entries) = fs::read_dir(path) else {
        return stats;
    };

    for entry_result in entries {
        let Ok(entry) = entry_result else {
            continue;
        };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            stats.absorb(aggregate(&entry.path()));
        } else if file_type.is_file() || file_type.is_symlink() {
            // DirEntry::metadata does not traverse symlinks.
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            stats.absorb(DirStats {
                size_bytes: meta.len(),
                file_count: 1,
                last_modified: meta.modified().ok(),
            });
        }
    }

    stats
}
