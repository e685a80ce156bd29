//! Server configuration.

use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use urlmock_core::config::parse_config;

/// Headers that transports add on their own, so mocks never expect them.
pub const DEFAULT_IGNORED_REQUEST_HEADERS: [&str; 7] = [
    "host",
    "content-length",
    "connection",
    "transfer-encoding",
    "accept",
    "accept-encoding",
    "user-agent",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Address to listen on. Port 0 picks a free port.
    pub bind_address: SocketAddr,
    /// Request headers dropped before matching, compared case-insensitively
    pub ignored_request_headers: Vec<String>,
    /// Status for requests no mock request matches
    pub unmatched_status: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            ignored_request_headers: DEFAULT_IGNORED_REQUEST_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
            unmatched_status: 501,
        }
    }
}

impl ServerConfig {
    pub fn is_ignored_header(&self, name: &str) -> bool {
        self.ignored_request_headers
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(name))
    }

    /// Read a YAML, JSON, or JSONC config file.
    pub async fn load(path: &str) -> Result<Self, ServerError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ServerError::ReadConfig {
                path: path.to_string(),
                source,
            })?;
        Ok(parse_config(&content, path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:0");
        assert_eq!(config.unmatched_status, 501);
        assert_eq!(config.ignored_request_headers.len(), 7);
    }

    #[rstest]
    #[case("Host", true)]
    #[case("USER-AGENT", true)]
    #[case("content-type", false)]
    #[case("X-Token", false)]
    fn test_is_ignored_header(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(ServerConfig::default().is_ignored_header(name), expected);
    }

    #[rstest]
    fn test_partial_config_uses_defaults() {
        let config: ServerConfig =
            parse_config("unmatchedStatus: 404\n", "server.yaml").expect("Should parse");
        assert_eq!(config.unmatched_status, 404);
        assert_eq!(config.bind_address, ServerConfig::default().bind_address);
    }

    #[rstest]
    #[tokio::test]
    async fn test_load_json_config() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("server.json");
        std::fs::write(
            &path,
            r#"{"bindAddress": "127.0.0.1:0", "ignoredRequestHeaders": ["host"]}"#,
        )
        .expect("Should write");

        let config = ServerConfig::load(&path.to_string_lossy())
            .await
            .expect("Should load");
        assert_eq!(config.ignored_request_headers, vec!["host".to_string()]);
        assert_eq!(config.unmatched_status, 501);
    }

    #[rstest]
    #[tokio::test]
    async fn test_load_missing_file() {
        let result = ServerConfig::load("/definitely/missing/server.yaml").await;
        assert!(matches!(result, Err(ServerError::ReadConfig { .. })));
    }
}
