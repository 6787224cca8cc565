//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener (fail fast on bind errors)
//! - Build the HTTP server against the bound port
//! - Spawn the serving task and hand back a [`ServerHandle`]

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::watch;
use url::Url;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::listener;

/// What the proxy is doing, for the startup banner.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupSummary {
    /// Address as a browser would reach it.
    pub local_url: String,
    pub target: Url,
    pub logging_enabled: bool,
    pub timeout: Duration,
}

impl fmt::Display for StartupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Local address: {}", self.local_url)?;
        writeln!(f, "Proxy target:  {}", self.target)?;
        writeln!(
            f,
            "Logging:       {}",
            if self.logging_enabled { "on" } else { "off" }
        )?;
        write!(f, "Timeout:       {}ms", self.timeout.as_millis())
    }
}

/// Handle to a running proxy.
///
/// Dropping the handle requests shutdown without waiting for the drain.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    summary: StartupSummary,
    shutdown: Shutdown,
    stopped: watch::Receiver<bool>,
}

impl ServerHandle {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn summary(&self) -> &StartupSummary {
        &self.summary
    }

    /// Stop accepting connections and wait for in-flight requests to drain.
    ///
    /// Safe to call any number of times, concurrently or not; every call
    /// resolves once the single shutdown has completed.
    pub async fn stop(&self) {
        self.shutdown.trigger();
        let mut stopped = self.stopped.clone();
        // An error means the serving task is gone, which is also "stopped".
        let _ = stopped.wait_for(|done| *done).await;
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy.
///
/// Binds `listen_host:listen_port` and begins serving in a background task.
/// Fails with [`ProxyError::Bind`] if the port cannot be bound.
pub async fn start(config: ProxyConfig) -> Result<ServerHandle, ProxyError> {
    let listener = listener::bind(config.listen_host, config.listen_port).await?;
    let local_addr = listener.local_addr().map_err(|source| ProxyError::Bind {
        addr: format!("{}:{}", config.listen_host, config.listen_port),
        source,
    })?;

    let summary = StartupSummary {
        local_url: format!("http://localhost:{}", local_addr.port()),
        target: config.target.clone(),
        logging_enabled: config.logging_enabled,
        timeout: config.request_timeout,
    };

    let server = HttpServer::new(config, local_addr.port())?;
    let shutdown = Shutdown::new();
    let (stopped_tx, stopped_rx) = watch::channel(false);

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = server.run(listener, signal).await {
            tracing::error!(error = %e, "HTTP server failed");
        }
        stopped_tx.send_replace(true);
    });

    Ok(ServerHandle {
        local_addr,
        summary,
        shutdown,
        stopped: stopped_rx,
    })
}
