//! CORS reverse proxy library.
//!
//! Forwards every request to a single upstream target and injects permissive
//! CORS headers into the responses, so browser code can call an origin that
//! does not speak CORS itself.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use http::HttpServer;
pub use lifecycle::{start, ServerHandle, Shutdown, StartupSummary};
