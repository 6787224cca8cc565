//! Response handling for the caller leg.
//!
//! # Responsibilities
//! - Track the per-request response phase (Idle → HeadersSent → Completed)
//! - Stream the upstream body back with an idle timeout
//! - Map upstream failures to a plain-text 502
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Once headers are committed, failures can only cut the stream short

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;

use crate::error::ProxyError;

/// Where a single response is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponsePhase {
    /// Nothing has been committed to the caller yet.
    Idle = 0,
    /// Status and headers are committed; only body bytes may follow.
    HeadersSent = 1,
    /// The body finished or was cut short.
    Completed = 2,
}

impl ResponsePhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ResponsePhase::Idle,
            1 => ResponsePhase::HeadersSent,
            _ => ResponsePhase::Completed,
        }
    }
}

/// Per-request response phase, shared between the handler and the body
/// stream it hands to hyper.
#[derive(Debug, Clone)]
pub struct ResponseState(Arc<AtomicU8>);

impl ResponseState {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(ResponsePhase::Idle as u8)))
    }

    pub fn phase(&self) -> ResponsePhase {
        ResponsePhase::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Record that status and headers are on the wire.
    ///
    /// Returns `false` if they were already committed.
    pub fn try_commit(&self) -> bool {
        self.0
            .compare_exchange(
                ResponsePhase::Idle as u8,
                ResponsePhase::HeadersSent as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn complete(&self) {
        self.0.store(ResponsePhase::Completed as u8, Ordering::Release);
    }
}

impl Default for ResponseState {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap an upstream body so it streams to the caller chunk by chunk.
///
/// hyper only polls a body once the head has been written, so the first poll
/// commits `state`. Nothing is yielded once the state is `Completed`.
///
/// If no chunk arrives within `idle_timeout` the stream ends with an error,
/// which makes hyper abort the connection; the same happens when the
/// upstream body itself fails.
pub fn relay_body(body: Body, idle_timeout: Duration, state: ResponseState, log_errors: bool) -> Body {
    let chunks = body.into_data_stream();

    let stream = futures_util::stream::unfold(Some(chunks), move |chunks| {
        let state = state.clone();
        async move {
            let mut chunks = chunks?;
            match state.phase() {
                ResponsePhase::Idle => {
                    state.try_commit();
                }
                ResponsePhase::HeadersSent => {}
                ResponsePhase::Completed => return None,
            }

            let failure = match tokio::time::timeout(idle_timeout, chunks.next()).await {
                Ok(Some(Ok(chunk))) => return Some((Ok(chunk), Some(chunks))),
                Ok(None) => {
                    state.complete();
                    return None;
                }
                Ok(Some(Err(e))) => ProxyError::Body(e),
                Err(_) => ProxyError::UpstreamTimeout {
                    timeout_ms: idle_timeout.as_millis(),
                },
            };

            state.complete();
            if log_errors {
                tracing::warn!(error = %failure, "Response aborted after headers were sent");
            }
            Some((Err(failure), None))
        }
    });

    Body::from_stream(stream)
}

/// The 502 sent when the upstream fails before any response was committed.
pub fn error_response(err: &ProxyError) -> Response {
    let message = if err.is_timeout() {
        "Upstream request timed out"
    } else {
        "Bad Gateway"
    };
    (StatusCode::BAD_GATEWAY, message).into_response()
}
