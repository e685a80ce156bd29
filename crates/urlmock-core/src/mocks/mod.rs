//! Mock requests, responders, and the client that receives responses.
//!
//! A [`MockRequest`] decides whether it matches an intercepted [`UrlRequest`] and hands out
//! a [`MockResponder`]. The responder plays the response back to a [`ProtocolClient`].

pub mod http_request;
pub mod pattern;
pub mod responder;

use crate::types::request::{UrlRequest, UrlResponse};
use crate::types::ResponseError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Receiving end of a mock response.
pub trait ProtocolClient: Send + Sync {
    fn did_receive_response(&self, response: &UrlResponse);
    fn did_load_data(&self, data: &[u8]);
    fn did_finish_loading(&self);
    fn did_fail_with_error(&self, error: &ResponseError);
}

/// Plays a response for a request back to a protocol client.
#[async_trait]
pub trait MockResponder: Send + Sync + Debug {
    async fn respond(&self, request: &UrlRequest, client: &dyn ProtocolClient);

    /// Stop an in-progress response. No-op when nothing is in progress.
    fn cancel_response(&self);
}

/// Expected request registered with the mock protocol.
pub trait MockRequest: Send + Sync + Debug {
    fn matches_url_request(&self, request: &UrlRequest) -> bool;

    /// Responder for a request this mock matches.
    fn responder_for_url_request(&self, request: &UrlRequest) -> Option<Arc<dyn MockResponder>>;

    /// Whether the protocol may drop this mock once it has serviced a request.
    fn removed_after_servicing(&self) -> bool {
        true
    }
}
