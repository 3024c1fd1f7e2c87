//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use artifact_sweeper::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, SweepError};
pub use crate::core::format::{format_age, format_bytes, format_file_count};

// Logging
pub use crate::logger::activity::{ActivityEvent, ActivityLog};

// Scanner
pub use crate::scanner::deletion::{
    DeletionConfig, DeletionExecutor, DeletionOutcome, DeletionReport,
};
pub use crate::scanner::engine::{
    ArtifactRecord, ArtifactScanner, MIN_ARTIFACT_BYTES, ScanOptions, scan,
};
pub use crate::scanner::filter::{CategoryFilter, StaleFilter, parse_duration};
pub use crate::scanner::patterns::{ArtifactPatternRegistry, CustomPattern};

// Terminal front end
#[cfg(feature = "cli")]
pub use crate::cli::selector::{SelectionOutcome, Selector};
