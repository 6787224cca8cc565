//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the preflight layer and the forwarding handler
//! - Wire up middleware (tracing)
//! - Serve a bound listener until shutdown, draining in-flight requests

use std::sync::Arc;

use axum::{middleware, routing::any, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::client::{build_client, HttpClient};
use crate::http::cors::{preflight_middleware, RedirectRewriter};
use crate::http::forward::proxy_handler;
use crate::http::headers::TargetIdentity;
use crate::lifecycle::Shutdown;

/// Application state injected into handlers. Read-only after startup.
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub client: HttpClient,
    pub identity: TargetIdentity,
    pub redirects: RedirectRewriter,
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server.
    ///
    /// `local_port` is the port the listener actually bound; redirects that
    /// point at the upstream are rewritten to `http://localhost:<local_port>`.
    pub fn new(config: ProxyConfig, local_port: u16) -> Result<Self, ProxyError> {
        let config = Arc::new(config);

        let state = Arc::new(AppState {
            client: build_client()?,
            identity: TargetIdentity::from_config(&config)?,
            redirects: RedirectRewriter::new(config.target.clone(), local_port),
            config: Arc::clone(&config),
        });

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                preflight_middleware,
            ))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires, then wait for
    /// in-flight requests to finish.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.target,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
