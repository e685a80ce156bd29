//! Shortcuts for registering HTTP mock requests with JSON bodies.
//!
//! Mocks created here do not check headers, so a request only has to agree on method,
//! URL, and JSON body.

use crate::error::MockError;
use crate::mocks::http_request::MockHttpRequest;
use crate::mocks::responder::MockHttpResponder;
use crate::mocks::MockResponder;
use crate::protocol::MockUrlProtocol;
use crate::types::method::HttpMethod;
use crate::types::ResponseError;
use serde_json::Value;
use std::sync::Arc;

impl MockUrlProtocol {
    fn expect_with_responder(
        &self,
        method: HttpMethod,
        url: &str,
        request_json: Option<&Value>,
        responder: Arc<dyn MockResponder>,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        let mut mock = MockHttpRequest::new(method, url)?;
        mock.set_checks_headers_when_matching(false);
        if let Some(json) = request_json {
            mock.message_mut().set_body_with_json(json)?;
        }
        mock.set_responder(responder);

        let mock = Arc::new(mock);
        self.expect_mock_request(mock.clone());
        Ok(mock)
    }

    pub fn expect_mock_http_request_with_error(
        &self,
        method: HttpMethod,
        url: &str,
        request_json: Option<&Value>,
        error: ResponseError,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_with_responder(
            method,
            url,
            request_json,
            Arc::new(MockHttpResponder::with_error(error)),
        )
    }

    pub fn expect_mock_http_get_request_with_error(
        &self,
        url: &str,
        error: ResponseError,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_mock_http_request_with_error(HttpMethod::Get, url, None, error)
    }

    pub fn expect_mock_http_patch_request_with_error(
        &self,
        url: &str,
        request_json: Option<&Value>,
        error: ResponseError,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_mock_http_request_with_error(HttpMethod::Patch, url, request_json, error)
    }

    pub fn expect_mock_http_post_request_with_error(
        &self,
        url: &str,
        request_json: Option<&Value>,
        error: ResponseError,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_mock_http_request_with_error(HttpMethod::Post, url, request_json, error)
    }

    pub fn expect_mock_http_put_request_with_error(
        &self,
        url: &str,
        request_json: Option<&Value>,
        error: ResponseError,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_mock_http_request_with_error(HttpMethod::Put, url, request_json, error)
    }

    /// Register a mock answering with `status` and, if given, a JSON body.
    pub fn expect_mock_http_request(
        &self,
        method: HttpMethod,
        url: &str,
        request_json: Option<&Value>,
        status: u16,
        response_json: Option<&Value>,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        let responder = match response_json {
            Some(json) => MockHttpResponder::with_status_and_json(status, json)?,
            None => MockHttpResponder::with_status(status),
        };
        self.expect_with_responder(method, url, request_json, Arc::new(responder))
    }

    pub fn expect_mock_http_get_request(
        &self,
        url: &str,
        status: u16,
        response_json: Option<&Value>,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_mock_http_request(HttpMethod::Get, url, None, status, response_json)
    }

    pub fn expect_mock_http_patch_request(
        &self,
        url: &str,
        request_json: Option<&Value>,
        status: u16,
        response_json: Option<&Value>,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_mock_http_request(HttpMethod::Patch, url, request_json, status, response_json)
    }

    pub fn expect_mock_http_post_request(
        &self,
        url: &str,
        request_json: Option<&Value>,
        status: u16,
        response_json: Option<&Value>,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_mock_http_request(HttpMethod::Post, url, request_json, status, response_json)
    }

    pub fn expect_mock_http_put_request(
        &self,
        url: &str,
        request_json: Option<&Value>,
        status: u16,
        response_json: Option<&Value>,
    ) -> Result<Arc<MockHttpRequest>, MockError> {
        self.expect_mock_http_request(HttpMethod::Put, url, request_json, status, response_json)
    }
}
