//! Error types for mock registration and dispatch.

use crate::types::method::HttpMethod;
use crate::types::ResponseError;
use thiserror::Error;

/// Errors raised while building mocks or servicing requests.
#[derive(Debug, Error)]
pub enum MockError {
    /// URL string could not be parsed
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// No expected mock request matched
    #[error("unexpected request: {method} {url}")]
    UnexpectedRequest { method: HttpMethod, url: String },
    /// Matching mock request has no responder attached
    #[error("mock request for {method} {url} has no responder")]
    NoResponder { method: HttpMethod, url: String },
    /// Chunk count hint must be positive
    #[error("chunk count hint must be greater than zero")]
    InvalidChunkCount,
    /// Value could not be serialized as JSON
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// URL pattern could not be compiled
    #[error("invalid URL pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// Responder answered with an error
    #[error("responder failed: {0}")]
    Response(ResponseError),
    /// Responder stopped before finishing
    #[error("response for {url} ended before it finished loading")]
    IncompleteResponse { url: String },
}

impl MockError {
    /// Map this error to the error a protocol client receives.
    pub fn to_response_error(&self) -> ResponseError {
        match self {
            MockError::Response(error) => error.clone(),
            MockError::UnexpectedRequest { .. } => {
                ResponseError::new(ResponseError::URLMOCK_DOMAIN, 1, self.to_string())
            }
            MockError::NoResponder { .. } => {
                ResponseError::new(ResponseError::URLMOCK_DOMAIN, 2, self.to_string())
            }
            _ => ResponseError::new(ResponseError::URLMOCK_DOMAIN, 0, self.to_string()),
        }
    }
}
