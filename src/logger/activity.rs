//! Activity log facade: typed events in, JSONL lines out.
//!
//! Disabled by default. When disabled every call is a no-op, so callers log
//! unconditionally and never branch on configuration.

#![allow(missing_docs)]

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::config::LogConfig;
use crate::logger::jsonl::JsonlWriter;

/// Severity level stamped on each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Events recorded during a sweep run. The `event` tag names the line kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActivityEvent {
    #[serde(rename = "scan_complete")]
    ScanCompleted {
        #[serde(rename = "path")]
        root: String,
        #[serde(rename = "count")]
        artifacts: usize,
        #[serde(rename = "size")]
        total_bytes: u64,
        duration_ms: u64,
    },
    SelectionResolved {
        outcome: String,
        #[serde(rename = "count")]
        selected: usize,
        #[serde(rename = "size")]
        total_bytes: u64,
    },
    #[serde(rename = "artifact_delete")]
    ArtifactDeleted {
        path: String,
        #[serde(rename = "size")]
        size_bytes: u64,
        #[serde(rename = "files")]
        file_count: u64,
        duration_ms: u64,
        dry_run: bool,
    },
    #[serde(rename = "artifact_delete")]
    ArtifactDeletionFailed {
        path: String,
        error_code: String,
        error_message: String,
    },
    Error {
        #[serde(rename = "error_code")]
        code: String,
        #[serde(rename = "error_message")]
        message: String,
    },
}

impl ActivityEvent {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::ScanCompleted { .. }
            | Self::SelectionResolved { .. }
            | Self::ArtifactDeleted { .. } => Severity::Info,
            Self::ArtifactDeletionFailed { .. } => Severity::Warning,
            Self::Error { .. } => Severity::Critical,
        }
    }

    /// Outcome flag for deletion lines; absent on other events.
    #[must_use]
    pub const fn ok(&self) -> Option<bool> {
        match self {
            Self::ArtifactDeleted { .. } => Some(true),
            Self::ArtifactDeletionFailed { .. } => Some(false),
            _ => None,
        }
    }
}

/// One serialized line: timestamp and severity followed by the event fields.
#[derive(Serialize)]
struct LogLine<'a> {
    ts: String,
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    ok: Option<bool>,
    #[serde(flatten)]
    event: &'a ActivityEvent,
}

impl<'a> LogLine<'a> {
    fn stamp(event: &'a ActivityEvent) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            severity: event.severity(),
            ok: event.ok(),
            event,
        }
    }
}

/// Shared handle to the optional JSONL activity log.
pub struct ActivityLog {
    writer: Option<Mutex<JsonlWriter>>,
}

impl ActivityLog {
    /// A log that drops every event.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { writer: None }
    }

    /// Open the log described by `config`; disabled configs yield [`ActivityLog::disabled`].
    #[must_use]
    pub fn from_config(config: &LogConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            writer: Some(Mutex::new(JsonlWriter::open(config))),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record(&self, event: ActivityEvent) {
        if let Some(writer) = &self.writer {
            writer.lock().append(&LogLine::stamp(&event));
        }
    }

    pub fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.lock().flush();
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::disabled()
    }
}
