//! Mock file parsing (YAML/JSON/JSONC).

use crate::config::error::ConfigError;
use crate::mocks::MockSet;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Supported mock file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFileFormat {
    Yaml,
    Json,
    /// JSON allowing `//` and `/* */` comments
    Jsonc,
}

impl MockFileFormat {
    /// Format for `path`, ignoring extension case. `None` for anything else.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "jsonc" => Some(Self::Jsonc),
            _ => None,
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, ConfigError> {
        match self {
            Self::Yaml => Ok(serde_yaml::from_str(content)?),
            Self::Json => Ok(serde_json::from_str(content)?),
            Self::Jsonc => Ok(serde_json::from_str(&strip_json_comments(content))?),
        }
    }
}

/// Strip `//` and `/* */` comments from JSONC content, leaving string literals intact.
pub fn strip_json_comments(content: &str) -> String {
    #[derive(Clone, Copy)]
    enum State {
        Code,
        Str,
        StrEscape,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(content.len());
    let mut state = State::Code;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        state = match state {
            State::Code => match (c, next) {
                ('/', Some('/')) => {
                    chars.next();
                    State::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    State::BlockComment
                }
                ('"', _) => {
                    out.push(c);
                    State::Str
                }
                _ => {
                    out.push(c);
                    State::Code
                }
            },
            State::Str => {
                out.push(c);
                match c {
                    '\\' => State::StrEscape,
                    '"' => State::Code,
                    _ => State::Str,
                }
            }
            State::StrEscape => {
                out.push(c);
                State::Str
            }
            State::LineComment if c == '\n' || c == '\r' => {
                out.push(c);
                State::Code
            }
            State::LineComment => State::LineComment,
            State::BlockComment if c == '*' && next == Some('/') => {
                chars.next();
                State::Code
            }
            State::BlockComment => State::BlockComment,
        };
    }

    out
}

/// Parse `content` in the format implied by `path`.
pub fn parse_config<T: DeserializeOwned>(content: &str, path: &str) -> Result<T, ConfigError> {
    MockFileFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnknownFileType(path.to_owned()))?
        .parse(content)
}

/// Load a single mock file.
pub async fn load_mock_file(path: impl AsRef<Path>) -> Result<MockSet, ConfigError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_config(&content, &path.to_string_lossy())
}

/// Load and merge every mock file matching a glob pattern, in path order.
pub async fn load_mock_files(pattern: &str) -> Result<MockSet, ConfigError> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(pattern, error = %err, "skipping unreadable mock file entry");
                None
            }
        })
        .collect();
    paths.sort();

    let mut merged = MockSet::default();
    for path in &paths {
        merged.extend(load_mock_file(path).await?);
    }
    tracing::debug!(
        pattern,
        files = paths.len(),
        request_mocks = merged.request_mocks.len(),
        response_mocks = merged.response_mocks.len(),
        "loaded mock files"
    );
    Ok(merged)
}
