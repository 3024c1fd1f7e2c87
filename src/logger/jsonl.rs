//! Append-only JSON-lines file with size rotation.
//!
//! The writer knows nothing about event shapes; it takes any `Serialize`
//! value, renders it to one line and appends it with a single `write_all`.
//! If the file cannot be opened or written, output moves to stderr with an
//! `[ASW-JSONL]` prefix, and if stderr fails too, lines are dropped. A sweep
//! never aborts because of its log.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::config::LogConfig;

/// Where lines currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Appending to the configured file.
    File,
    /// `[ASW-JSONL]`-prefixed lines on stderr.
    Stderr,
    /// Dropping lines.
    Discard,
}

enum Sink {
    File { out: BufWriter<File>, len: u64 },
    Stderr,
    Discard,
}

/// JSONL appender for the activity log.
pub struct JsonlWriter {
    path: PathBuf,
    max_size_bytes: u64,
    keep: u32,
    sink: Sink,
}

impl JsonlWriter {
    /// Open `config.path` for appending, creating parent directories.
    #[must_use]
    pub fn open(config: &LogConfig) -> Self {
        let sink = match open_append(&config.path) {
            Ok((out, len)) => Sink::File { out, len },
            Err(err) => {
                let _ = writeln!(
                    io::stderr(),
                    "[ASW-JSONL] cannot open {} ({err}), logging to stderr",
                    config.path.display()
                );
                Sink::Stderr
            }
        };
        Self {
            path: config.path.clone(),
            max_size_bytes: config.max_size_bytes,
            keep: config.max_rotated_files,
            sink,
        }
    }

    /// Serialize `value` and append it as one line.
    pub fn append<T: Serialize>(&mut self, value: &T) {
        let mut line = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                let _ = writeln!(io::stderr(), "[ASW-JSONL] serialize error: {err}");
                return;
            }
        };
        line.push('\n');

        if let Sink::File { len, .. } = &self.sink
            && *len > 0
            && len.saturating_add(line.len() as u64) > self.max_size_bytes
        {
            self.rotate();
        }

        let file_failed = match &mut self.sink {
            Sink::File { out, len } => {
                let ok = out.write_all(line.as_bytes()).is_ok();
                if ok {
                    *len = len.saturating_add(line.len() as u64);
                }
                !ok
            }
            Sink::Stderr | Sink::Discard => false,
        };
        if file_failed {
            self.sink = Sink::Stderr;
        }
        if matches!(self.sink, Sink::Stderr) && write!(io::stderr(), "[ASW-JSONL] {line}").is_err()
        {
            self.sink = Sink::Discard;
        }
    }

    /// Flush buffered lines to the file, if one is open.
    pub fn flush(&mut self) {
        if let Sink::File { out, .. } = &mut self.sink {
            let _ = out.flush();
        }
    }

    /// Current destination for appended lines.
    #[must_use]
    pub const fn sink_kind(&self) -> SinkKind {
        match self.sink {
            Sink::File { .. } => SinkKind::File,
            Sink::Stderr => SinkKind::Stderr,
            Sink::Discard => SinkKind::Discard,
        }
    }

    /// Shift `path.N-1` to `path.N` down to `path` to `path.1`, then reopen.
    fn rotate(&mut self) {
        self.flush();
        self.sink = Sink::Discard;

        for index in (1..self.keep).rev() {
            let _ = fs::rename(
                rotated_name(&self.path, index),
                rotated_name(&self.path, index + 1),
            );
        }
        if self.keep == 0 {
            let _ = fs::remove_file(&self.path);
        } else {
            let _ = fs::rename(&self.path, rotated_name(&self.path, 1));
        }

        self.sink = match open_append(&self.path) {
            Ok((out, len)) => Sink::File { out, len },
            Err(_) => Sink::Stderr,
        };
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

fn open_append(path: &Path) -> io::Result<(BufWriter<File>, u64)> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let len = file.metadata().map_or(0, |m| m.len());
    Ok((BufWriter::new(file), len))
}

/// `activity.jsonl` with index 2 is `activity.jsonl.2`.
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn log_config(path: PathBuf, max_size_bytes: u64) -> LogConfig {
        LogConfig {
            enabled: true,
            path,
            max_size_bytes,
            max_rotated_files: 2,
        }
    }

    fn read_lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn each_value_becomes_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/activity.jsonl");
        let mut writer = JsonlWriter::open(&log_config(path.clone(), 1 << 20));
        assert_eq!(writer.sink_kind(), SinkKind::File);

        writer.append(&json!({"event": "scan_complete", "count": 3}));
        writer.append(&json!({"event": "artifact_delete", "path": "a\nb"}));
        writer.flush();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["count"], 3);
        assert_eq!(lines[1]["path"], "a\nb");
    }

    #[test]
    fn reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        for run in 0..2 {
            let mut writer = JsonlWriter::open(&log_config(path.clone(), 1 << 20));
            writer.append(&json!({ "run": run }));
        }
        let runs: Vec<Value> = read_lines(&path).iter().map(|v| v["run"].clone()).collect();
        assert_eq!(runs, vec![json!(0), json!(1)]);
    }

    #[test]
    fn rotation_keeps_at_most_configured_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let mut writer = JsonlWriter::open(&log_config(path.clone(), 64));

        for i in 0..20 {
            writer.append(&json!({ "event": "artifact_delete", "seq": i }));
        }
        writer.flush();

        assert!(rotated_name(&path, 1).exists());
        assert!(rotated_name(&path, 2).exists());
        assert!(!rotated_name(&path, 3).exists());
        let newest = read_lines(&path);
        assert_eq!(newest.last().unwrap()["seq"], 19);
    }

    #[test]
    fn oversized_line_is_written_to_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let mut writer = JsonlWriter::open(&log_config(path.clone(), 8));
        writer.append(&json!({ "details": "longer than the size cap" }));
        writer.flush();

        assert_eq!(read_lines(&path).len(), 1);
        assert!(!rotated_name(&path, 1).exists());
    }

    #[test]
    fn unopenable_path_falls_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let mut writer = JsonlWriter::open(&log_config(blocker.join("activity.jsonl"), 1 << 20));

        assert_eq!(writer.sink_kind(), SinkKind::Stderr);
        writer.append(&json!({ "event": "error" }));
        assert_eq!(writer.sink_kind(), SinkKind::Stderr);
    }
}
