//! ASW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Top-level error type for the artifact sweeper.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("[ASW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[ASW-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[ASW-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[ASW-1101] unknown category '{name}' (known: {known})")]
    UnknownCategory { name: String, known: String },

    #[error("[ASW-1102] invalid duration '{raw}': {details}")]
    InvalidDuration { raw: String, details: String },

    #[error("[ASW-1201] scan root is not a directory: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("[ASW-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[ASW-3001] permission denied for {path}")]
    PermissionDenied { path: PathBuf },

    #[error("[ASW-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[ASW-3101] terminal failure: {source}")]
    Terminal {
        #[source]
        source: std::io::Error,
    },

    #[error("[ASW-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl SweepError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "ASW-1001",
            Self::MissingConfig { .. } => "ASW-1002",
            Self::ConfigParse { .. } => "ASW-1003",
            Self::UnknownCategory { .. } => "ASW-1101",
            Self::InvalidDuration { .. } => "ASW-1102",
            Self::InvalidRoot { .. } => "ASW-1201",
            Self::Serialization { .. } => "ASW-2101",
            Self::PermissionDenied { .. } => "ASW-3001",
            Self::Io { .. } => "ASW-3002",
            Self::Terminal { .. } => "ASW-3101",
            Self::Runtime { .. } => "ASW-3900",
        }
    }

    /// Whether the failure stems from operator input rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::UnknownCategory { .. }
                | Self::InvalidDuration { .. }
                | Self::InvalidRoot { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    ///
    /// Permission failures get their own variant so the deletion report can
    /// tell them apart from vanished paths.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::PermissionDenied { path };
        }
        Self::Io { path, source }
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SweepError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
