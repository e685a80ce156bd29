//! URLMock core library.
//!
//! Tests register the HTTP requests they expect with a [`MockUrlProtocol`] together with
//! responders that describe how each request should be answered. Requests handed to the
//! protocol are matched against the expected mock requests and answered by the first match.

pub mod config;
pub mod encoding;
pub mod error;
pub mod expression;
pub mod matching;
pub mod mocks;
pub mod protocol;
pub mod testing;
pub mod types;

pub use encoding::{ParamMap, ParamValue};
pub use error::MockError;
pub use mocks::http_request::MockHttpRequest;
pub use mocks::pattern::PatternMatchingMockRequest;
pub use mocks::responder::MockHttpResponder;
pub use mocks::{MockRequest, MockResponder, ProtocolClient};
pub use protocol::{CollectedResponse, Loading, MockUrlProtocol};
pub use types::message::HttpMessage;
pub use types::method::HttpMethod;
pub use types::request::{UrlRequest, UrlResponse};
pub use types::{HeaderMap, ResponseError};
