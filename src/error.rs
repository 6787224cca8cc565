//! Error types for the proxy engine.

use thiserror::Error;

/// Errors raised while starting the proxy or relaying a request.
///
/// Only [`ProxyError::Bind`] and [`ProxyError::Tls`] are fatal; the rest are
/// per-request and degrade to a 502 (or a terminated stream) for that caller.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS client setup failed: {0}")]
    Tls(#[from] rustls::Error),

    #[error("Upstream did not respond within {timeout_ms}ms")]
    UpstreamTimeout { timeout_ms: u128 },

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("Upstream body stream failed: {0}")]
    Body(#[from] axum::Error),

    #[error("Invalid upstream request: {0}")]
    Request(#[from] axum::http::Error),
}

impl ProxyError {
    /// Whether this error was produced by the upstream timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProxyError::UpstreamTimeout { .. })
    }
}

/// Result type alias for proxy operations.
pub type Result<T> = std::result::Result<T, ProxyError>;
