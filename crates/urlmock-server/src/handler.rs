//! Turns HTTP requests into mock URL requests and streams mock responses back.

use crate::config::ServerConfig;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};
use url::Url;
use urlmock_core::{
    HeaderMap as MockHeaders, HttpMethod, MockError, MockUrlProtocol, ProtocolClient,
    ResponseError, UrlRequest, UrlResponse,
};

type BodyChunk = Result<Bytes, std::io::Error>;
type Head = Result<UrlResponse, ResponseError>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) protocol: MockUrlProtocol,
    pub(crate) config: Arc<ServerConfig>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new().fallback(handle).with_state(state)
}

/// Forwards protocol callbacks into channels read by the HTTP response.
struct ChannelClient {
    head: Mutex<Option<oneshot::Sender<Head>>>,
    body: Mutex<Option<mpsc::UnboundedSender<BodyChunk>>>,
}

impl ChannelClient {
    fn new() -> (
        Self,
        oneshot::Receiver<Head>,
        mpsc::UnboundedReceiver<BodyChunk>,
    ) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::unbounded_channel();
        let client = Self {
            head: Mutex::new(Some(head_tx)),
            body: Mutex::new(Some(body_tx)),
        };
        (client, head_rx, body_rx)
    }

    fn body_sender(&self) -> Option<mpsc::UnboundedSender<BodyChunk>> {
        self.body.lock().clone()
    }
}

impl ProtocolClient for ChannelClient {
    fn did_receive_response(&self, response: &UrlResponse) {
        if let Some(head) = self.head.lock().take() {
            let _ = head.send(Ok(response.clone()));
        }
    }

    fn did_load_data(&self, data: &[u8]) {
        if let Some(body) = self.body.lock().as_ref() {
            let _ = body.send(Ok(Bytes::copy_from_slice(data)));
        }
    }

    fn did_finish_loading(&self) {
        self.body.lock().take();
    }

    fn did_fail_with_error(&self, error: &ResponseError) {
        if let Some(head) = self.head.lock().take() {
            let _ = head.send(Err(error.clone()));
        } else if let Some(body) = self.body.lock().take() {
            let _ = body.send(Err(std::io::Error::other(error.to_string())));
        }
    }
}

/// Absolute URL of the request: the absolute-form target when proxying, otherwise
/// built from the `Host` header.
fn absolute_url(uri: &Uri, headers: &HeaderMap) -> Option<Url> {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Url::parse(&uri.to_string()).ok();
    }
    let host = headers.get(HOST)?.to_str().ok()?;
    let path = uri.path_and_query().map_or("/", |p| p.as_str());
    Url::parse(&format!("http://{host}{path}")).ok()
}

fn mock_headers(headers: &HeaderMap, config: &ServerConfig) -> MockHeaders {
    let mut collected = MockHeaders::new();
    for (name, value) in headers {
        if config.is_ignored_header(name.as_str()) {
            continue;
        }
        let Ok(value) = value.to_str() else {
            continue;
        };
        let merged = match collected.get(name.as_str()) {
            Some(existing) => format!("{existing}, {value}"),
            None => value.to_string(),
        };
        collected.insert(name.as_str(), merged);
    }
    collected
}

fn http_headers(headers: &MockHeaders) -> HeaderMap {
    let mut converted = HeaderMap::new();
    for (name, value) in headers.iter() {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            warn!(header = name, "Skipping invalid response header");
            continue;
        };
        // The body is streamed, so framing headers come from the server
        if name == CONTENT_LENGTH || name == TRANSFER_ENCODING {
            continue;
        }
        converted.append(name, value);
    }
    converted
}

fn plain(status: StatusCode, message: String) -> Response {
    (status, message).into_response()
}

async fn handle(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let Ok(method) = parts.method.as_str().parse::<HttpMethod>() else {
        return plain(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("unsupported method {}", parts.method),
        );
    };
    let Some(url) = absolute_url(&parts.uri, &parts.headers) else {
        return plain(
            StatusCode::BAD_REQUEST,
            format!("cannot build an absolute URL for {}", parts.uri),
        );
    };
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(error) => {
            return plain(StatusCode::BAD_REQUEST, format!("failed to read body: {error}"));
        }
    };

    let mut mock_request = UrlRequest::new(method, url);
    mock_request.headers = mock_headers(&parts.headers, &state.config);
    if !body.is_empty() {
        mock_request.body = Some(body.to_vec());
    }
    debug!(method = %method, url = %mock_request.url, "Received request");

    if !state.protocol.can_init_with_request(&mock_request) {
        let status = StatusCode::from_u16(state.config.unmatched_status)
            .unwrap_or(StatusCode::NOT_IMPLEMENTED);
        return plain(
            status,
            format!("no mock request matches {method} {}", mock_request.url),
        );
    }

    respond(&state, mock_request).await
}

async fn respond(state: &AppState, request: UrlRequest) -> Response {
    let method = request.method;
    let url = request.url.clone();
    let (client, head_rx, body_rx) = ChannelClient::new();
    let client = Arc::new(client);
    let watcher = client.body_sender();

    let loading = match state.protocol.start_loading(request, client) {
        Ok(loading) => loading,
        Err(error @ MockError::UnexpectedRequest { .. }) => {
            let status = StatusCode::from_u16(state.config.unmatched_status)
                .unwrap_or(StatusCode::NOT_IMPLEMENTED);
            return plain(status, error.to_string());
        }
        Err(error) => {
            warn!(%method, %url, %error, "Failed to start mock response");
            return plain(StatusCode::INTERNAL_SERVER_ERROR, error.to_string());
        }
    };

    tokio::spawn(async move {
        match watcher {
            Some(body) => {
                tokio::select! {
                    _ = loading.run() => {}
                    _ = body.closed() => {
                        debug!("HTTP client went away, cancelling mock response");
                        loading.stop();
                    }
                }
            }
            None => loading.run().await,
        }
    });

    match head_rx.await {
        Ok(Ok(head)) => {
            let status = StatusCode::from_u16(head.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut response = Response::new(Body::from_stream(UnboundedReceiverStream::new(body_rx)));
            *response.status_mut() = status;
            *response.headers_mut() = http_headers(&head.headers);
            response
        }
        Ok(Err(error)) => {
            warn!(%method, %url, %error, "Mock responder failed");
            (StatusCode::BAD_GATEWAY, Json(error)).into_response()
        }
        Err(_) => {
            let error = MockError::IncompleteResponse {
                url: url.to_string(),
            };
            warn!(%method, %url, "Mock responder stopped before sending a response");
            (StatusCode::BAD_GATEWAY, Json(error.to_response_error())).into_response()
        }
    }
}
