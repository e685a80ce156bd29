//! HTTP mock responder.

use crate::error::MockError;
use crate::mocks::{MockResponder, ProtocolClient};
use crate::types::message::HttpMessage;
use crate::types::request::{UrlRequest, UrlResponse};
use crate::types::{HeaderMap, ResponseError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Response {
    Error(ResponseError),
    Data {
        status: u16,
        chunk_count_hint: usize,
        delay_between_chunks: Duration,
    },
}

/// Responds with an error, or with a status, headers, and a body sent in chunks.
#[derive(Debug)]
pub struct MockHttpResponder {
    response: Response,
    message: HttpMessage,
    cancelled: AtomicBool,
}

impl MockHttpResponder {
    fn data(status: u16, headers: HeaderMap, body: Option<Vec<u8>>) -> Self {
        Self {
            response: Response::Data {
                status,
                chunk_count_hint: 1,
                delay_between_chunks: Duration::ZERO,
            },
            message: HttpMessage { headers, body },
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn with_error(error: ResponseError) -> Self {
        Self {
            response: Response::Error(error),
            message: HttpMessage::new(),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self::data(status, HeaderMap::new(), None)
    }

    pub fn with_status_and_headers(status: u16, headers: HeaderMap) -> Self {
        Self::data(status, headers, None)
    }

    pub fn with_status_and_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::data(status, HeaderMap::new(), Some(body.into()))
    }

    pub fn with_status_headers_and_body(
        status: u16,
        headers: HeaderMap,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self::data(status, headers, Some(body.into()))
    }

    /// Serialize `value` as the JSON body.
    pub fn with_status_and_json<T: Serialize + ?Sized>(
        status: u16,
        value: &T,
    ) -> Result<Self, MockError> {
        let mut responder = Self::with_status(status);
        responder.message.set_body_with_json(value)?;
        Ok(responder)
    }

    /// Data response whose body is split into about `chunk_count_hint` chunks, sent
    /// `delay_between_chunks` apart.
    pub fn with_chunks(
        status: u16,
        headers: HeaderMap,
        body: impl Into<Vec<u8>>,
        chunk_count_hint: usize,
        delay_between_chunks: Duration,
    ) -> Result<Self, MockError> {
        if chunk_count_hint == 0 {
            return Err(MockError::InvalidChunkCount);
        }
        let mut responder = Self::with_status_headers_and_body(status, headers, body);
        responder.response = Response::Data {
            status,
            chunk_count_hint,
            delay_between_chunks,
        };
        Ok(responder)
    }

    /// Status code, or `None` for an error response.
    pub fn status(&self) -> Option<u16> {
        match &self.response {
            Response::Data { status, .. } => Some(*status),
            Response::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ResponseError> {
        match &self.response {
            Response::Error(error) => Some(error),
            Response::Data { .. } => None,
        }
    }

    pub fn chunk_count_hint(&self) -> usize {
        match &self.response {
            Response::Data {
                chunk_count_hint, ..
            } => *chunk_count_hint,
            Response::Error(_) => 0,
        }
    }

    pub fn delay_between_chunks(&self) -> Duration {
        match &self.response {
            Response::Data {
                delay_between_chunks,
                ..
            } => *delay_between_chunks,
            Response::Error(_) => Duration::ZERO,
        }
    }

    pub fn message(&self) -> &HttpMessage {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut HttpMessage {
        &mut self.message
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Copies the response. The copy starts out not cancelled.
impl Clone for MockHttpResponder {
    fn clone(&self) -> Self {
        Self {
            response: self.response.clone(),
            message: self.message.clone(),
            cancelled: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl MockResponder for MockHttpResponder {
    async fn respond(&self, request: &UrlRequest, client: &dyn ProtocolClient) {
        self.cancelled.store(false, Ordering::SeqCst);

        let (status, chunk_count_hint, delay) = match &self.response {
            Response::Error(error) => {
                client.did_fail_with_error(error);
                return;
            }
            Response::Data {
                status,
                chunk_count_hint,
                delay_between_chunks,
            } => (*status, *chunk_count_hint, *delay_between_chunks),
        };

        client.did_receive_response(&UrlResponse {
            url: request.url.clone(),
            status,
            headers: self.message.headers.clone(),
        });

        let body = self.message.body_bytes();
        let chunk_size = body.len().div_ceil(chunk_count_hint.max(1)).max(1);
        let mut chunks = body.chunks(chunk_size).peekable();

        while let Some(chunk) = chunks.next() {
            if self.is_cancelled() {
                debug!(url = %request.url, "Response cancelled");
                return;
            }
            trace!(url = %request.url, len = chunk.len(), "Sending chunk");
            client.did_load_data(chunk);

            if chunks.peek().is_some() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        if self.is_cancelled() {
            debug!(url = %request.url, "Response cancelled");
            return;
        }
        client.did_finish_loading();
    }

    fn cancel_response(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::method::HttpMethod;
    use parking_lot::Mutex;
    use rstest::rstest;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Response(u16),
        Data(Vec<u8>),
        Finish,
        Error(ResponseError),
    }

    #[derive(Default)]
    struct RecordingClient {
        events: Mutex<Vec<Event>>,
        cancel_after_first_chunk: Option<Arc<MockHttpResponder>>,
    }

    impl ProtocolClient for RecordingClient {
        fn did_receive_response(&self, response: &UrlResponse) {
            self.events.lock().push(Event::Response(response.status));
        }

        fn did_load_data(&self, data: &[u8]) {
            self.events.lock().push(Event::Data(data.to_vec()));
            if let Some(responder) = &self.cancel_after_first_chunk {
                responder.cancel_response();
            }
        }

        fn did_finish_loading(&self) {
            self.events.lock().push(Event::Finish);
        }

        fn did_fail_with_error(&self, error: &ResponseError) {
            self.events.lock().push(Event::Error(error.clone()));
        }
    }

    fn request() -> UrlRequest {
        UrlRequest::parse(HttpMethod::Get, "http://example.com/data").expect("valid URL")
    }

    #[rstest]
    #[case(b"0123456789".to_vec(), 3, vec![b"0123".to_vec(), b"4567".to_vec(), b"89".to_vec()])]
    #[case(b"0123456789".to_vec(), 1, vec![b"0123456789".to_vec()])]
    #[case(b"abc".to_vec(), 10, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()])]
    #[case(Vec::new(), 4, vec![])]
    #[tokio::test]
    async fn test_respond_sends_chunks(
        #[case] body: Vec<u8>,
        #[case] hint: usize,
        #[case] expected_chunks: Vec<Vec<u8>>,
    ) {
        let responder = MockHttpResponder::with_chunks(200, HeaderMap::new(), body, hint, Duration::ZERO)
            .expect("Should build responder");
        let client = RecordingClient::default();
        responder.respond(&request(), &client).await;

        let mut expected = vec![Event::Response(200)];
        expected.extend(expected_chunks.into_iter().map(Event::Data));
        expected.push(Event::Finish);
        assert_eq!(*client.events.lock(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn test_respond_with_error() {
        let error = ResponseError::new("NSURLErrorDomain", -1009, "offline");
        let responder = MockHttpResponder::with_error(error.clone());
        let client = RecordingClient::default();
        responder.respond(&request(), &client).await;

        assert_eq!(*client.events.lock(), vec![Event::Error(error)]);
        assert_eq!(responder.status(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_cancel_stops_remaining_chunks() {
        let responder = Arc::new(
            MockHttpResponder::with_chunks(200, HeaderMap::new(), b"aabbcc".to_vec(), 3, Duration::ZERO)
                .expect("Should build responder"),
        );
        let client = RecordingClient {
            events: Mutex::new(Vec::new()),
            cancel_after_first_chunk: Some(responder.clone()),
        };
        responder.respond(&request(), &client).await;

        assert_eq!(
            *client.events.lock(),
            vec![Event::Response(200), Event::Data(b"aa".to_vec())]
        );
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_delay_between_chunks() {
        let responder = MockHttpResponder::with_chunks(
            200,
            HeaderMap::new(),
            b"abcd".to_vec(),
            2,
            Duration::from_millis(500),
        )
        .expect("Should build responder");
        let client = RecordingClient::default();

        let start = tokio::time::Instant::now();
        responder.respond(&request(), &client).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(client.events.lock().last(), Some(&Event::Finish));
    }

    #[rstest]
    fn test_zero_chunk_hint_is_rejected() {
        let result = MockHttpResponder::with_chunks(200, HeaderMap::new(), b"x".to_vec(), 0, Duration::ZERO);
        assert!(matches!(result, Err(MockError::InvalidChunkCount)));
    }

    #[rstest]
    fn test_with_status_and_json() {
        let responder = MockHttpResponder::with_status_and_json(201, &serde_json::json!({"id": 7}))
            .expect("Should serialize");
        assert_eq!(responder.status(), Some(201));
        assert_eq!(
            responder.message().json_from_body(),
            Some(serde_json::json!({"id": 7}))
        );
        assert!(responder.message().value_for_header_field("Content-Type").is_some());
    }
}
