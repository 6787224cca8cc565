//! Request forwarding to the upstream target.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → headers.rs (upstream URL, hop-by-hop strip, host/origin/referer)
//!     → access log line (when enabled)
//!     → client.rs (streamed body, inactivity timeout until response headers)
//!     → cors.rs (CORS + Location rewrite)
//!     → response.rs (streamed body with idle timeout)
//! ```
//!
//! The upstream timeout is an inactivity timer on both legs: every uploaded
//! chunk restarts it, the end of the upload restarts it once more, and only
//! then does it bound the wait for the response head.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::ORIGIN;
use axum::http::Uri;
use axum::response::Response;
use futures_util::StreamExt;
use hyper::body::{Body as _, Incoming};
use tokio::sync::watch;

use crate::error::{ProxyError, Result};
use crate::http::server::AppState;
use crate::http::{cors, headers, response};
use crate::http::response::ResponseState;
use crate::observability::logging;

/// Main proxy handler: every non-preflight request lands here.
pub async fn proxy_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let origin = request.headers().get(ORIGIN).cloned();

    match forward(&state, request).await {
        Ok(upstream) => {
            let (mut parts, body) = upstream.into_parts();
            headers::strip_hop_by_hop(&mut parts.headers);
            cors::rewrite_response_headers(&mut parts.headers, origin.as_ref(), &state.redirects);

            let body = response::relay_body(
                Body::new(body),
                state.config.request_timeout,
                ResponseState::new(),
                state.config.logging_enabled,
            );
            Response::from_parts(parts, body)
        }
        Err(err) => {
            if state.config.logging_enabled {
                tracing::error!(error = %err, "Proxy error");
            }
            let mut response = response::error_response(&err);
            cors::apply_cors(response.headers_mut(), origin.as_ref());
            response
        }
    }
}

/// Send the request upstream and wait for the response head.
async fn forward(state: &AppState, request: Request) -> Result<hyper::Response<Incoming>> {
    let (parts, body) = request.into_parts();

    let url = headers::upstream_url(&state.config.target, &parts.uri);
    if state.config.logging_enabled {
        logging::log_access(&parts.method, &url);
    }

    let (activity, mut uploads) = watch::channel(());
    let body = if body.is_end_stream() {
        body
    } else {
        track_upload(body, activity)
    };

    let uri: Uri = url.as_str().parse().map_err(axum::http::Error::from)?;
    let mut upstream = hyper::Request::builder()
        .method(parts.method)
        .uri(uri)
        .body(body)?;
    *upstream.headers_mut() = headers::upstream_headers(&parts.headers, &state.identity);

    let timeout = state.config.request_timeout;
    let exchange = state.client.request(upstream);
    tokio::pin!(exchange);

    let mut uploading = true;
    loop {
        tokio::select! {
            result = &mut exchange => return Ok(result?),
            changed = uploads.changed(), if uploading => {
                // Err means the upload body was dropped: it finished or failed.
                uploading = changed.is_ok();
            }
            _ = tokio::time::sleep(timeout) => {
                return Err(ProxyError::UpstreamTimeout {
                    timeout_ms: timeout.as_millis(),
                });
            }
        }
    }
}

/// Wrap the inbound body so every chunk handed to the upstream connection
/// is reported on `activity`.
fn track_upload(body: Body, activity: watch::Sender<()>) -> Body {
    let chunks = body.into_data_stream().map(move |chunk| {
        activity.send_replace(());
        chunk
    });
    Body::from_stream(chunks)
}
