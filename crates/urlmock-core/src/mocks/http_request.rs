//! Exact-match HTTP mock request.

use crate::error::MockError;
use crate::matching::{bodies_are_equivalent, headers_are_equal_ignoring};
use crate::mocks::{MockRequest, MockResponder};
use crate::protocol::canonical::canonical_url_for_url;
use crate::types::message::{HttpMessage, CONTENT_TYPE_HEADER_FIELD};
use crate::types::method::HttpMethod;
use crate::types::request::UrlRequest;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Mock request matching one method and canonical URL, with optional header and body checks.
#[derive(Debug)]
pub struct MockHttpRequest {
    method: HttpMethod,
    /// Canonical form of the expected URL
    url: Url,
    /// Expected headers and body
    message: HttpMessage,
    responder: RwLock<Option<Arc<dyn MockResponder>>>,
    checks_headers_when_matching: AtomicBool,
    checks_body_when_matching: AtomicBool,
    /// Header fields left out of the header check
    ignored_header_fields: RwLock<Vec<String>>,
}

impl MockHttpRequest {
    pub fn with_url(method: HttpMethod, url: &Url) -> Self {
        Self {
            method,
            url: canonical_url_for_url(url),
            message: HttpMessage::new(),
            responder: RwLock::new(None),
            checks_headers_when_matching: AtomicBool::new(true),
            checks_body_when_matching: AtomicBool::new(true),
            ignored_header_fields: RwLock::new(Vec::new()),
        }
    }

    pub fn new(method: HttpMethod, url: &str) -> Result<Self, MockError> {
        let parsed = Url::parse(url).map_err(|source| MockError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self::with_url(method, &parsed))
    }

    pub fn get(url: &str) -> Result<Self, MockError> {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: &str) -> Result<Self, MockError> {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: &str) -> Result<Self, MockError> {
        Self::new(HttpMethod::Put, url)
    }

    pub fn patch(url: &str) -> Result<Self, MockError> {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: &str) -> Result<Self, MockError> {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn head(url: &str) -> Result<Self, MockError> {
        Self::new(HttpMethod::Head, url)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn message(&self) -> &HttpMessage {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut HttpMessage {
        &mut self.message
    }

    pub fn responder(&self) -> Option<Arc<dyn MockResponder>> {
        self.responder.read().clone()
    }

    /// Attach or replace the responder. Works after registration.
    pub fn set_responder(&self, responder: Arc<dyn MockResponder>) {
        *self.responder.write() = Some(responder);
    }

    pub fn with_responder(self, responder: Arc<dyn MockResponder>) -> Self {
        self.set_responder(responder);
        self
    }

    pub fn checks_headers_when_matching(&self) -> bool {
        self.checks_headers_when_matching.load(Ordering::SeqCst)
    }

    pub fn set_checks_headers_when_matching(&self, checks: bool) {
        self.checks_headers_when_matching
            .store(checks, Ordering::SeqCst);
    }

    pub fn checks_body_when_matching(&self) -> bool {
        self.checks_body_when_matching.load(Ordering::SeqCst)
    }

    pub fn set_checks_body_when_matching(&self, checks: bool) {
        self.checks_body_when_matching.store(checks, Ordering::SeqCst);
    }

    /// Leave `field` out of the header check, on both the mock and the request.
    pub fn ignore_header_field_when_matching(&self, field: impl Into<String>) {
        let field = field.into();
        let mut ignored = self.ignored_header_fields.write();
        if !ignored.iter().any(|f| f.eq_ignore_ascii_case(&field)) {
            ignored.push(field);
        }
    }

    pub fn ignored_header_fields_when_matching(&self) -> Vec<String> {
        self.ignored_header_fields.read().clone()
    }
}

impl MockRequest for MockHttpRequest {
    fn matches_url_request(&self, request: &UrlRequest) -> bool {
        if request.method != self.method || canonical_url_for_url(&request.url) != self.url {
            return false;
        }

        if self.checks_headers_when_matching()
            && !headers_are_equal_ignoring(
                &self.message.headers,
                &request.headers,
                &self.ignored_header_fields.read(),
            )
        {
            return false;
        }

        !self.checks_body_when_matching()
            || bodies_are_equivalent(
                self.message.value_for_header_field(CONTENT_TYPE_HEADER_FIELD),
                self.message.body.as_deref(),
                request.body_data(),
            )
    }

    fn responder_for_url_request(&self, _request: &UrlRequest) -> Option<Arc<dyn MockResponder>> {
        self.responder()
    }
}
