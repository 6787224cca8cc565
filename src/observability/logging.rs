//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Emit the per-request access line
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via `RUST_LOG`

use axum::http::Method;
use colored::{ColoredString, Colorize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "cors_proxy=info,tower_http=warn";

/// Install the global tracing subscriber.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// The method tag shown in the access log, colored per verb.
pub fn method_tag(method: &Method) -> ColoredString {
    let tag = format!("[{}]", method);
    match method.as_str() {
        "GET" => tag.green().bold(),
        "POST" => tag.blue().bold(),
        "PUT" => tag.yellow().bold(),
        "DELETE" => tag.red().bold(),
        _ => tag.white().bold(),
    }
}

/// Log one forwarded request.
pub fn log_access(method: &Method, upstream: &Url) {
    tracing::info!(
        method = %method,
        upstream = %upstream,
        "{} {}",
        method_tag(method),
        upstream.as_str().dimmed()
    );
}
