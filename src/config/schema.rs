//! Configuration schema definitions.
//!
//! [`PartialConfig`] is the shape of one configuration layer (config file,
//! command line). Layers are merged and then validated into the immutable
//! [`ProxyConfig`] the engine runs on.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default upstream timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "proxy.toml";

/// Default listening address (all interfaces).
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// One layer of configuration. Every field is optional so that layers can be
/// stacked: command line over config file over built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    /// Listening address.
    pub host: Option<IpAddr>,

    /// Listening port.
    pub port: Option<u16>,

    /// Upstream base URL (e.g., "https://api.example.com").
    pub target: Option<String>,

    /// Enable the per-request access log.
    pub logger: Option<bool>,

    /// Upstream timeout in milliseconds.
    pub timeout: Option<u64>,
}

impl PartialConfig {
    /// Stack `self` on top of `lower`: values set in `self` win.
    ///
    /// Logging is the exception: a layer that explicitly disables it keeps it
    /// disabled regardless of which layer it came from.
    pub fn over(self, lower: PartialConfig) -> PartialConfig {
        let logger = match (self.logger, lower.logger) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (upper, lower) => upper.or(lower),
        };

        PartialConfig {
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            target: self.target.or(lower.target),
            logger,
            timeout: self.timeout.or(lower.timeout),
        }
    }
}

/// Validated runtime configuration for the proxy engine.
///
/// Built once at startup and shared read-only by every request handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyConfig {
    /// Address to listen on.
    pub listen_host: IpAddr,

    /// Port to listen on (0 lets the OS pick one).
    pub listen_port: u16,

    /// Upstream base URL. Always absolute `http` or `https` with a host.
    pub target: Url,

    /// Emit one access-log line per forwarded request.
    pub logging_enabled: bool,

    /// Upper bound on waiting for upstream response headers and on each idle
    /// gap while the response body streams.
    pub request_timeout: Duration,
}

impl ProxyConfig {
    /// Configuration with built-in defaults for the given target.
    pub fn new(target: Url) -> Self {
        Self {
            listen_host: DEFAULT_HOST,
            listen_port: DEFAULT_PORT,
            target,
            logging_enabled: true,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Target authority as sent in the `host` header (`host[:port]`).
    pub fn target_authority(&self) -> String {
        let host = self.target.host_str().unwrap_or_default();
        match self.target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Target origin as sent in `origin`/`referer` (`scheme://host[:port]`).
    pub fn target_origin(&self) -> String {
        self.target.origin().ascii_serialization()
    }
}
