//! Error types for mock file loading and preference persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a mock rule file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON mock file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML mock file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Extension is not one of yaml, yml, json or jsonc
    #[error("unsupported mock file type: {0}")]
    UnknownFileType(String),
    #[error("cannot read mock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid mock file glob: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Preference backing store error
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preferences file is not a JSON string map: {0}")]
    Format(#[from] serde_json::Error),
}
