//! HTTP front end for URLMock.
//!
//! [`MockServer`] listens on a real socket and answers every request from a
//! [`MockUrlProtocol`]. Point a client at [`MockServer::url`] as its base URL, or
//! configure the server as the client's HTTP proxy to keep absolute URLs intact.

pub mod config;
pub mod error;
mod handler;

pub use config::ServerConfig;
pub use error::ServerError;

use handler::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use urlmock_core::MockUrlProtocol;

/// Running mock HTTP server. Stops on [`MockServer::shutdown`] or when dropped.
#[derive(Debug)]
pub struct MockServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Start a server with the default [`ServerConfig`].
    pub async fn start(protocol: MockUrlProtocol) -> Result<Self, ServerError> {
        Self::start_with_config(protocol, ServerConfig::default()).await
    }

    pub async fn start_with_config(
        protocol: MockUrlProtocol,
        config: ServerConfig,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind_address,
                source,
            })?;
        let addr = listener.local_addr()?;
        debug!(%addr, ignored_headers = ?config.ignored_request_headers, "Bound mock server");

        let app = handler::router(AppState {
            protocol,
            config: Arc::new(config),
        });
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(error) = served {
                warn!(%error, "Mock server stopped with an error");
            }
        });
        info!(%addr, "Mock server listening");

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL, e.g. `http://127.0.0.1:PORT`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL for `path` on this server. A missing leading `/` is added.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.url())
        } else {
            format!("{}/{path}", self.url())
        }
    }

    /// Stop accepting connections and wait for in-flight responses to finish.
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            join.await?;
        }
        debug!(addr = %self.addr, "Mock server shut down");
        Ok(())
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
