#![forbid(unsafe_code)]

//! Artifact Sweeper: find regenerable build and dependency directories
//! (`node_modules`, `target`, `__pycache__`, ...) under a root, let an
//! operator pick which to remove, and delete them.
//!
//! The pipeline:
//! 1. **Pattern registry** maps exact directory basenames to descriptions and categories
//! 2. **Scan engine** walks the tree once, aggregating each match without descending into it
//! 3. **Selector** (feature `cli`) is a raw-mode terminal list for choosing what to delete
//! 4. **Deletion executor** removes the chosen directories and reports per item
//!
//! # Library usage
//!
//! ```rust,no_run
//! use artifact_sweeper::prelude::*;
//!
//! let registry = ArtifactPatternRegistry::default();
//! let records = ArtifactScanner::new(&registry, &ScanOptions::default())
//!     .scan(std::path::Path::new("."));
//! for record in &records {
//!     println!("{} {}", record.relative_path.display(), record.size_bytes);
//! }
//! ```

pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod logger;
pub mod scanner;
