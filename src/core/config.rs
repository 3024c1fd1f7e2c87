//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SweepError};
use crate::scanner::filter::parse_duration;
use crate::scanner::patterns::{CustomPattern, is_always_skipped};

/// Smallest viewport the selector will ever render.
pub const MIN_VISIBLE_ROWS_FLOOR: usize = 5;

/// Full sweeper configuration model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub patterns: Vec<CustomPattern>,
    pub selector: SelectorConfig,
    pub log: LogConfig,
}

/// Scan defaults applied when the command line leaves them unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    pub only: Vec<String>,
    pub exclude: Vec<String>,
    /// Default `--stale` duration string, e.g. `"30d"`.
    pub stale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SelectorConfig {
    pub min_visible_rows: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_visible_rows: MIN_VISIBLE_ROWS_FLOOR,
        }
    }
}

/// JSONL activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: home_dir()
                .join(".local")
                .join("share")
                .join("artifact_sweeper")
                .join("activity.jsonl"),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[ASW-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        home_dir()
            .join(".config")
            .join("artifact_sweeper")
            .join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// A missing file at the default path yields defaults; a missing explicit
    /// path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            let raw =
                fs::read_to_string(&path_buf).map_err(|source| SweepError::io(&path_buf, source))?;
            Self::from_toml(&raw)?
        } else if path.is_some() {
            return Err(SweepError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document without env overrides or validation.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("ASW_SELECTOR_MIN_VISIBLE_ROWS") {
            self.selector.min_visible_rows = raw.parse::<usize>().map_err(|error| {
                SweepError::ConfigParse {
                    context: "env",
                    details: format!("ASW_SELECTOR_MIN_VISIBLE_ROWS={raw:?}: {error}"),
                }
            })?;
        }
        if let Some(raw) = lookup("ASW_LOG_ENABLED") {
            self.log.enabled = parse_env_bool("ASW_LOG_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("ASW_LOG_PATH") {
            self.log.path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("ASW_DEFAULT_STALE") {
            self.scan.stale = Some(raw);
        }
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if !self.scan.only.is_empty() && !self.scan.exclude.is_empty() {
            return Err(SweepError::InvalidConfig {
                details: "scan.only and scan.exclude cannot both be set".to_string(),
            });
        }
        if let Some(stale) = &self.scan.stale {
            parse_duration(stale)?;
        }
        if self.selector.min_visible_rows < MIN_VISIBLE_ROWS_FLOOR {
            return Err(SweepError::InvalidConfig {
                details: format!(
                    "selector.min_visible_rows must be >= {MIN_VISIBLE_ROWS_FLOOR}, got {}",
                    self.selector.min_visible_rows
                ),
            });
        }
        if self.log.max_size_bytes == 0 {
            return Err(SweepError::InvalidConfig {
                details: "log.max_size_bytes must be > 0".to_string(),
            });
        }
        for pattern in &self.patterns {
            validate_pattern(pattern)?;
        }
        Ok(())
    }
}

fn validate_pattern(pattern: &CustomPattern) -> Result<()> {
    let name = &pattern.basename;
    let problem = if name.trim().is_empty() {
        Some("basename must not be empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("basename must not contain path separators")
    } else if is_always_skipped(name) {
        Some("basename is a version-control directory and is never matched")
    } else if name == "." || name == ".." {
        Some("basename must name a directory")
    } else {
        None
    };
    match problem {
        Some(msg) => Err(SweepError::InvalidConfig {
            details: format!("patterns: {name:?}: {msg}"),
        }),
        None => Ok(()),
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SweepError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: expected a boolean"),
        }),
    }
}
