//! Mock URL protocol: the registry of expected requests and request dispatch.
//!
//! Requests are handed to a [`MockUrlProtocol`] explicitly, either with [`MockUrlProtocol::send`]
//! or [`MockUrlProtocol::start_loading`], or through the HTTP server crate.

pub mod canonical;
pub mod collector;
pub mod convenience;

pub use canonical::canonical_url_for_url;
pub use collector::{CollectedResponse, CollectingClient};

use crate::error::MockError;
use crate::mocks::{MockRequest, MockResponder, ProtocolClient};
use crate::types::request::UrlRequest;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};
use url::Url;

fn request_ptr<R: ?Sized>(request: &Arc<R>) -> *const () {
    Arc::as_ptr(request).cast::<()>()
}

#[derive(Debug, Default)]
struct ProtocolState {
    enabled: bool,
    intercepts_all_requests: bool,
    automatically_removes_serviced_mock_requests: bool,
    /// Expected mock requests in registration order
    expected: Vec<Arc<dyn MockRequest>>,
    /// Serviced mock requests, unique by identity
    serviced: Vec<Arc<dyn MockRequest>>,
}

/// Registry of expected mock requests that answers intercepted requests.
///
/// `MockUrlProtocol` provides:
/// - Enabling and disabling interception
/// - Registering and removing expected mock requests
/// - Tracking which mock requests have been serviced
/// - Dispatching requests to the first matching mock request's responder
///
/// Clones share the same state. [`MockUrlProtocol::shared`] returns a process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct MockUrlProtocol {
    state: Arc<Mutex<ProtocolState>>,
}

/// A response in progress for one request.
pub struct Loading {
    request: UrlRequest,
    responder: Arc<dyn MockResponder>,
    client: Arc<dyn ProtocolClient>,
}

impl Loading {
    pub fn request(&self) -> &UrlRequest {
        &self.request
    }

    pub fn responder(&self) -> &Arc<dyn MockResponder> {
        &self.responder
    }

    /// Stream the response to the client.
    pub async fn run(&self) {
        self.responder
            .respond(&self.request, self.client.as_ref())
            .await;
    }

    /// Cancel the response through its responder.
    pub fn stop(&self) {
        self.responder.cancel_response();
    }
}

impl std::fmt::Debug for Loading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loading")
            .field("request", &self.request)
            .field("responder", &self.responder)
            .finish_non_exhaustive()
    }
}

impl MockUrlProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide protocol instance.
    pub fn shared() -> &'static MockUrlProtocol {
        static SHARED: OnceLock<MockUrlProtocol> = OnceLock::new();
        SHARED.get_or_init(MockUrlProtocol::new)
    }

    pub fn enable(&self) {
        self.state.lock().enabled = true;
        info!("Mock URL protocol enabled");
    }

    pub fn disable(&self) {
        self.state.lock().enabled = false;
        info!("Mock URL protocol disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Clear expected and serviced mock requests. Settings are kept.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.expected.clear();
        state.serviced.clear();
        debug!("Mock URL protocol reset");
    }

    /// [`MockUrlProtocol::reset`], then enable.
    pub fn reset_and_enable(&self) {
        self.reset();
        self.enable();
    }

    /// [`MockUrlProtocol::reset`], then disable.
    pub fn reset_and_disable(&self) {
        self.reset();
        self.disable();
    }

    /// Whether every request is intercepted, including ones no mock request expects.
    pub fn intercepts_all_requests(&self) -> bool {
        self.state.lock().intercepts_all_requests
    }

    pub fn set_intercepts_all_requests(&self, intercepts: bool) {
        self.state.lock().intercepts_all_requests = intercepts;
    }

    /// Whether serviced mock requests are dropped from the expected list.
    pub fn automatically_removes_serviced_mock_requests(&self) -> bool {
        self.state.lock().automatically_removes_serviced_mock_requests
    }

    pub fn set_automatically_removes_serviced_mock_requests(&self, removes: bool) {
        self.state
            .lock()
            .automatically_removes_serviced_mock_requests = removes;
    }

    /// Expected mock requests in registration order.
    pub fn all_expected_mock_requests(&self) -> Vec<Arc<dyn MockRequest>> {
        self.state.lock().expected.clone()
    }

    /// Register a mock request. Registering the same request twice has no effect.
    pub fn expect_mock_request(&self, request: Arc<dyn MockRequest>) {
        let mut state = self.state.lock();
        let ptr = request_ptr(&request);
        if state.expected.iter().any(|r| request_ptr(r) == ptr) {
            return;
        }
        debug!(request = ?request, "Expecting mock request");
        state.expected.push(request);
    }

    /// Remove a mock request, compared by identity.
    pub fn remove_expected_mock_request<R: ?Sized>(&self, request: &Arc<R>) {
        let ptr = request_ptr(request);
        let mut state = self.state.lock();
        let before = state.expected.len();
        state.expected.retain(|r| request_ptr(r) != ptr);
        if state.expected.len() != before {
            debug!("Removed expected mock request");
        }
    }

    /// Mock requests whose responders have been handed out.
    pub fn all_serviced_mock_requests(&self) -> Vec<Arc<dyn MockRequest>> {
        self.state.lock().serviced.clone()
    }

    pub fn has_serviced_mock_request<R: ?Sized>(&self, request: &Arc<R>) -> bool {
        let ptr = request_ptr(request);
        self.state
            .lock()
            .serviced
            .iter()
            .any(|r| request_ptr(r) == ptr)
    }

    /// Normalised form of `url` used for exact matching.
    pub fn canonical_url_for_url(&self, url: &Url) -> Url {
        canonical_url_for_url(url)
    }

    fn find_matching(&self, request: &UrlRequest) -> Option<Arc<dyn MockRequest>> {
        // Matchers may run user code, so they run without the lock held
        let expected = self.all_expected_mock_requests();
        expected
            .into_iter()
            .find(|mock| mock.matches_url_request(request))
    }

    /// Whether this protocol should handle `request`.
    ///
    /// True when the protocol is enabled and either intercepts all requests or some
    /// expected mock request matches.
    pub fn can_init_with_request(&self, request: &UrlRequest) -> bool {
        let (enabled, intercepts_all) = {
            let state = self.state.lock();
            (state.enabled, state.intercepts_all_requests)
        };
        enabled && (intercepts_all || self.find_matching(request).is_some())
    }

    /// Find the responder for `request` and prepare to stream it to `client`.
    ///
    /// The first matching expected mock request wins. It is recorded as serviced and,
    /// when automatic removal is on and the mock allows it, removed from the expected list.
    ///
    /// # Errors
    /// - `MockError::UnexpectedRequest` if no expected mock request matches. The client
    ///   also receives the error through `did_fail_with_error`.
    /// - `MockError::NoResponder` if the matching mock request has no responder.
    pub fn start_loading(
        &self,
        request: UrlRequest,
        client: Arc<dyn ProtocolClient>,
    ) -> Result<Loading, MockError> {
        let Some(mock) = self.find_matching(&request) else {
            let error = MockError::UnexpectedRequest {
                method: request.method,
                url: request.url.to_string(),
            };
            warn!(method = %request.method, url = %request.url, "Unexpected request");
            client.did_fail_with_error(&error.to_response_error());
            return Err(error);
        };

        let Some(responder) = mock.responder_for_url_request(&request) else {
            warn!(method = %request.method, url = %request.url, "Matching mock request has no responder");
            return Err(MockError::NoResponder {
                method: request.method,
                url: request.url.to_string(),
            });
        };

        {
            let ptr = request_ptr(&mock);
            let mut state = self.state.lock();
            if !state.serviced.iter().any(|r| request_ptr(r) == ptr) {
                state.serviced.push(mock.clone());
            }
            if state.automatically_removes_serviced_mock_requests && mock.removed_after_servicing() {
                state.expected.retain(|r| request_ptr(r) != ptr);
            }
        }
        debug!(method = %request.method, url = %request.url, "Servicing mock request");

        Ok(Loading {
            request,
            responder,
            client,
        })
    }

    /// Run the whole exchange for `request` and collect the response.
    ///
    /// # Errors
    /// Errors from [`MockUrlProtocol::start_loading`], `MockError::Response` when the
    /// responder sends an error, and `MockError::IncompleteResponse` when it stops early.
    pub async fn send(&self, request: UrlRequest) -> Result<CollectedResponse, MockError> {
        let url = request.url.clone();
        let collector = Arc::new(CollectingClient::new());
        let loading = self.start_loading(request, collector.clone())?;
        loading.run().await;
        collector.collect(&url)
    }
}
