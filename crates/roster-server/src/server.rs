//! HTTP server.
//!
//! Accepts TCP connections, serves each one with hyper's HTTP/1 connection
//! driver and hands every request, body still unread, to the shared [`App`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roster_config::RosterConfig;
//! use roster_server::{App, Server};
//!
//! # async fn run() -> Result<(), roster_server::ServerError> {
//! let config = RosterConfig::default();
//! let app = Arc::new(App::from_config(&config));
//! Server::new(app, &config.server).run().await
//! # }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::Request;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use roster_config::ServerConfig;
use roster_middleware::{BoxError, Response};
use tokio::net::{TcpListener, TcpStream};

use crate::app::App;
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// The Roster HTTP server.
#[derive(Debug, Clone)]
pub struct Server {
    app: Arc<App>,
    http_addr: String,
    shutdown_timeout: Duration,
}

impl Server {
    /// Creates a server for `app` using the `[server]` settings.
    #[must_use]
    pub fn new(app: Arc<App>, config: &ServerConfig) -> Self {
        Self {
            app,
            http_addr: config.http_addr.clone(),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
        }
    }

    /// Returns the application being served.
    #[must_use]
    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    /// Binds the configured address and serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .http_addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress {
                addr: self.http_addr.clone(),
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already-bound listener until `shutdown`
    /// triggers, then waits up to the shutdown timeout for open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Server listening on {local_addr}");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();
        let stop = shutdown.recv();
        tokio::pin!(stop);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let guard = tracker.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            server.handle_connection(stream, remote_addr, shutdown).await;
                            drop(guard);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to accept connection"),
                },
                () = &mut stop => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        drop(listener);
        tracing::info!(
            connections = tracker.active_connections(),
            "Waiting up to {:?} for connections to close",
            server.shutdown_timeout
        );

        if tokio::time::timeout(server.shutdown_timeout, tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                connections = tracker.active_connections(),
                "Shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |request: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(request).await) }
        });

        let connection = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(connection);

        tokio::select! {
            result = connection.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(remote = %remote_addr, error = %e, "Connection closed with error");
                }
            }
            () = shutdown.recv() => {
                // Let the in-flight request finish, then close.
                connection.as_mut().graceful_shutdown();
                if let Err(e) = connection.await {
                    tracing::debug!(remote = %remote_addr, error = %e, "Connection closed with error");
                }
            }
        }
    }

    async fn handle_request(&self, request: Request<Incoming>) -> Response {
        let request = request.map(|body| body.map_err(BoxError::from).boxed_unsync());
        self.app.handle(request).await
    }
}
