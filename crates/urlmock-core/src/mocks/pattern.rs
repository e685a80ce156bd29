//! Mock request matching URLs against a `:name` pattern.

use crate::error::MockError;
use crate::matching::UrlPattern;
use crate::mocks::{MockRequest, MockResponder};
use crate::types::method::HttpMethod;
use crate::types::request::UrlRequest;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Placeholder values captured from a matched URL.
pub type PatternParams = HashMap<String, String>;

pub type ResponderGenerator =
    dyn Fn(&UrlRequest, &PatternParams) -> Arc<dyn MockResponder> + Send + Sync;

pub type RequestMatcher = dyn Fn(&UrlRequest, &PatternParams) -> bool + Send + Sync;

/// Matches any request whose URL, up to the query string, fits the pattern.
///
/// The responder is generated per request from the captured placeholders. Pattern
/// requests stay registered after servicing.
pub struct PatternMatchingMockRequest {
    pattern: UrlPattern,
    http_methods: Option<HashSet<HttpMethod>>,
    request_matcher: Option<Box<RequestMatcher>>,
    responder_generator: Box<ResponderGenerator>,
}

impl PatternMatchingMockRequest {
    pub fn new<F>(pattern: &str, responder_generator: F) -> Result<Self, MockError>
    where
        F: Fn(&UrlRequest, &PatternParams) -> Arc<dyn MockResponder> + Send + Sync + 'static,
    {
        let compiled = UrlPattern::compile(pattern).map_err(|source| MockError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            http_methods: None,
            request_matcher: None,
            responder_generator: Box::new(responder_generator),
        })
    }

    /// Only match requests using one of these methods.
    pub fn with_http_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.http_methods = Some(methods.into_iter().collect());
        self
    }

    /// Extra check run after the URL matched.
    pub fn with_request_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&UrlRequest, &PatternParams) -> bool + Send + Sync + 'static,
    {
        self.request_matcher = Some(Box::new(matcher));
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn http_methods(&self) -> Option<&HashSet<HttpMethod>> {
        self.http_methods.as_ref()
    }

    /// Placeholder values for the request URL without its query and fragment.
    pub fn parameters_for_url_request(&self, request: &UrlRequest) -> Option<PatternParams> {
        let mut url = request.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        self.pattern.matches(url.as_str())
    }
}

impl fmt::Debug for PatternMatchingMockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternMatchingMockRequest")
            .field("pattern", &self.pattern.as_str())
            .field("http_methods", &self.http_methods)
            .field("has_request_matcher", &self.request_matcher.is_some())
            .finish()
    }
}

impl MockRequest for PatternMatchingMockRequest {
    fn matches_url_request(&self, request: &UrlRequest) -> bool {
        if let Some(methods) = &self.http_methods {
            if !methods.contains(&request.method) {
                return false;
            }
        }

        let Some(params) = self.parameters_for_url_request(request) else {
            return false;
        };

        self.request_matcher
            .as_ref()
            .map_or(true, |matcher| matcher(request, &params))
    }

    fn responder_for_url_request(&self, request: &UrlRequest) -> Option<Arc<dyn MockResponder>> {
        let params = self.parameters_for_url_request(request)?;
        Some((self.responder_generator)(request, &params))
    }

    fn removed_after_servicing(&self) -> bool {
        false
    }
}
