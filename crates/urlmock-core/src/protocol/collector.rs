//! Protocol client that gathers a whole response in memory.

use crate::error::MockError;
use crate::mocks::ProtocolClient;
use crate::types::request::UrlResponse;
use crate::types::{HeaderMap, ResponseError};
use parking_lot::Mutex;
use serde_json::Value;
use url::Url;

/// Response head and body returned by [`MockUrlProtocol::send`](crate::MockUrlProtocol::send).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedResponse {
    pub response: UrlResponse,
    pub body: Vec<u8>,
}

impl CollectedResponse {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Debug, Default)]
struct Collected {
    response: Option<UrlResponse>,
    body: Vec<u8>,
    finished: bool,
    error: Option<ResponseError>,
}

#[derive(Debug, Default)]
pub struct CollectingClient {
    collected: Mutex<Collected>,
}

impl CollectingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected response, or the error that ended it.
    pub fn collect(&self, url: &Url) -> Result<CollectedResponse, MockError> {
        let mut collected = self.collected.lock();
        if let Some(error) = collected.error.take() {
            return Err(MockError::Response(error));
        }
        match collected.response.take() {
            Some(response) if collected.finished => Ok(CollectedResponse {
                response,
                body: std::mem::take(&mut collected.body),
            }),
            _ => Err(MockError::IncompleteResponse {
                url: url.to_string(),
            }),
        }
    }
}

impl ProtocolClient for CollectingClient {
    fn did_receive_response(&self, response: &UrlResponse) {
        self.collected.lock().response = Some(response.clone());
    }

    fn did_load_data(&self, data: &[u8]) {
        self.collected.lock().body.extend_from_slice(data);
    }

    fn did_finish_loading(&self) {
        self.collected.lock().finished = true;
    }

    fn did_fail_with_error(&self, error: &ResponseError) {
        self.collected.lock().error = Some(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn url() -> Url {
        Url::parse("http://example.com/").expect("valid URL")
    }

    fn head() -> UrlResponse {
        UrlResponse {
            url: url(),
            status: 200,
            headers: HeaderMap::new(),
        }
    }

    #[rstest]
    fn test_collects_chunks() {
        let client = CollectingClient::new();
        client.did_receive_response(&head());
        client.did_load_data(br#"{"a":"#);
        client.did_load_data(b"1}");
        client.did_finish_loading();

        let collected = client.collect(&url()).expect("Should be complete");
        assert_eq!(collected.status(), 200);
        assert_eq!(collected.json(), Some(serde_json::json!({"a": 1})));
    }

    #[rstest]
    fn test_unfinished_response_is_incomplete() {
        let client = CollectingClient::new();
        client.did_receive_response(&head());
        client.did_load_data(b"partial");
        assert!(matches!(
            client.collect(&url()),
            Err(MockError::IncompleteResponse { .. })
        ));
    }

    #[rstest]
    fn test_error_wins() {
        let client = CollectingClient::new();
        let error = ResponseError::new("d", 3, "boom");
        client.did_fail_with_error(&error);
        assert!(matches!(client.collect(&url()), Err(MockError::Response(e)) if e == error));
    }
}
