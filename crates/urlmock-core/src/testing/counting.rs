//! Protocol client wrapper that counts callbacks.

use crate::mocks::ProtocolClient;
use crate::types::request::UrlResponse;
use crate::types::ResponseError;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Callback received by a [`ProtocolClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientMessage {
    DidReceiveResponse,
    DidLoadData,
    DidFinishLoading,
    DidFailWithError,
}

/// Forwards every callback to the wrapped client and counts it.
///
/// Only callbacks that pass through the wrapper are counted.
#[derive(Debug, Default)]
pub struct MessageCountingClient<C> {
    inner: C,
    counts: Mutex<HashMap<ClientMessage, usize>>,
}

impl<C> MessageCountingClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn received_message_count(&self, message: ClientMessage) -> usize {
        self.counts.lock().get(&message).copied().unwrap_or(0)
    }

    pub fn has_received(&self, message: ClientMessage) -> bool {
        self.received_message_count(message) > 0
    }

    fn count(&self, message: ClientMessage) {
        *self.counts.lock().entry(message).or_insert(0) += 1;
    }
}

impl<C: ProtocolClient> ProtocolClient for MessageCountingClient<C> {
    fn did_receive_response(&self, response: &UrlResponse) {
        self.count(ClientMessage::DidReceiveResponse);
        self.inner.did_receive_response(response);
    }

    fn did_load_data(&self, data: &[u8]) {
        self.count(ClientMessage::DidLoadData);
        self.inner.did_load_data(data);
    }

    fn did_finish_loading(&self) {
        self.count(ClientMessage::DidFinishLoading);
        self.inner.did_finish_loading();
    }

    fn did_fail_with_error(&self, error: &ResponseError) {
        self.count(ClientMessage::DidFailWithError);
        self.inner.did_fail_with_error(error);
    }
}
