//! Fixture file parsing (YAML/JSON/JSONC) and loading by glob.

use crate::config::error::ConfigError;
use crate::config::fixture::FixtureFile;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileType {
    Yaml,
    Json,
    Jsonc,
    Unknown,
}

/// Get config file type from path extension
pub fn get_file_type(path: &str) -> ConfigFileType {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "yaml" | "yml" => ConfigFileType::Yaml,
        "json" => ConfigFileType::Json,
        "jsonc" => ConfigFileType::Jsonc,
        _ => ConfigFileType::Unknown,
    }
}

/// Strip `//` and `/* */` comments outside of string literals.
pub fn strip_json_comments(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                // Keep the line break so line numbers in errors stay right
                for next in chars.by_ref() {
                    if next == '\n' || next == '\r' {
                        result.push(next);
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => result.push(c),
        }
    }

    result
}

pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    serde_json::from_str(content).map_err(ConfigError::from)
}

pub fn parse_jsonc<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let stripped = strip_json_comments(content);
    serde_json::from_str(&stripped).map_err(ConfigError::from)
}

pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    serde_yaml::from_str(content).map_err(ConfigError::from)
}

/// Parse config content based on file type
pub fn parse_config<T: DeserializeOwned>(content: &str, path: &str) -> Result<T, ConfigError> {
    match get_file_type(path) {
        ConfigFileType::Yaml => parse_yaml(content),
        ConfigFileType::Json => parse_json(content),
        ConfigFileType::Jsonc => parse_jsonc(content),
        ConfigFileType::Unknown => Err(ConfigError::UnknownFileType(path.to_string())),
    }
}

/// Read and parse every file matching `pattern`, in sorted path order.
///
/// # Errors
/// - `ConfigError::Glob` for an invalid pattern or an unreadable match
/// - `ConfigError::NoFilesMatched` when no file matches
/// - `ConfigError::Io` and the parse errors of [`parse_config`] per file
pub async fn load_fixture_files(pattern: &str) -> Result<Vec<FixtureFile>, ConfigError> {
    let mut paths = glob::glob(pattern)
        .map_err(|e| ConfigError::Glob(e.to_string()))?
        .collect::<Result<Vec<PathBuf>, _>>()
        .map_err(|e| ConfigError::Glob(e.to_string()))?;
    paths.retain(|path| path.is_file());
    paths.sort();

    if paths.is_empty() {
        return Err(ConfigError::NoFilesMatched(pattern.to_string()));
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let path_str = path.to_string_lossy().into_owned();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path_str.clone(),
                source,
            })?;
        let file: FixtureFile = parse_config(&content, &path_str)?;
        debug!(path = %path_str, mocks = file.mocks.len(), "Loaded fixture file");
        files.push(file);
    }

    Ok(files)
}
