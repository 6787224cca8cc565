//! CORS injection: preflight answers and response header rewriting.
//!
//! Preflight (`OPTIONS`) requests are answered by [`preflight_middleware`]
//! before they reach the forwarder, so they never touch the upstream. Every
//! forwarded response goes through [`rewrite_response_headers`].

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, LOCATION,
    ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use url::{Origin, Position, Url};

use crate::http::server::AppState;

/// Methods advertised to preflight requests.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";

/// How long browsers may cache a preflight answer (24h).
pub const PREFLIGHT_MAX_AGE_SECS: &str = "86400";

fn wildcard() -> HeaderValue {
    HeaderValue::from_static("*")
}

/// Answer `OPTIONS` locally; pass everything else on.
pub async fn preflight_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    if state.config.logging_enabled {
        tracing::debug!(
            path = %request.uri().path(),
            origin = ?request.headers().get(ORIGIN),
            "Answering preflight"
        );
    }
    preflight_response(request.headers())
}

/// Build the 204 answer to a preflight request.
pub fn preflight_response(request_headers: &HeaderMap) -> Response {
    let origin = request_headers.get(ORIGIN);

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;

    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        origin.cloned().unwrap_or_else(wildcard),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        request_headers
            .get(ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(wildcard),
    );
    headers.insert(
        ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS),
    );
    if origin.is_some() {
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }

    response
}

/// Inject the CORS headers for a response to a request carrying `origin`.
///
/// A present origin is echoed back (a wildcard is not accepted by browsers on
/// credentialed requests) and recorded in `vary`.
pub fn apply_cors(headers: &mut HeaderMap, origin: Option<&HeaderValue>) {
    match origin {
        Some(origin) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            vary_on_origin(headers);
        }
        None => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, wildcard());
        }
    }
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
}

/// Add `Origin` to `vary`, keeping existing entries and never listing it twice.
///
/// Values are folded into one line when they are all valid text; otherwise
/// `Origin` is appended as an extra line so nothing from upstream is lost.
pub fn vary_on_origin(headers: &mut HeaderMap) {
    let mut entries = Vec::new();
    let mut opaque = false;
    for value in headers.get_all(VARY) {
        match value.to_str() {
            Ok(value) => entries.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string),
            ),
            Err(_) => opaque = true,
        }
    }

    if entries
        .iter()
        .any(|entry| entry == "*" || entry.eq_ignore_ascii_case("origin"))
    {
        return;
    }

    if opaque {
        headers.append(VARY, HeaderValue::from_static("Origin"));
        return;
    }

    entries.push("Origin".to_string());
    match HeaderValue::from_str(&entries.join(", ")) {
        Ok(value) => {
            headers.insert(VARY, value);
        }
        Err(_) => {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
    }
}

/// Rewrites redirects that point back at the upstream so the browser keeps
/// going through the proxy.
#[derive(Debug, Clone)]
pub struct RedirectRewriter {
    target: Url,
    target_origin: Origin,
    local_base: String,
}

impl RedirectRewriter {
    pub fn new(target: Url, local_port: u16) -> Self {
        Self {
            target_origin: target.origin(),
            target,
            local_base: format!("http://localhost:{}", local_port),
        }
    }

    /// The rewritten location, or `None` when it should pass through as-is
    /// (unparseable, or pointing at another origin).
    pub fn rewrite(&self, location: &str) -> Option<String> {
        let resolved = self.target.join(location).ok()?;
        if resolved.origin() != self.target_origin {
            return None;
        }
        Some(format!(
            "{}{}",
            self.local_base,
            &resolved[Position::BeforePath..]
        ))
    }

    /// Apply [`Self::rewrite`] to the `location` header, if any.
    pub fn apply(&self, headers: &mut HeaderMap) {
        let rewritten = headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| self.rewrite(location))
            .and_then(|location| HeaderValue::from_str(&location).ok());

        if let Some(location) = rewritten {
            headers.insert(LOCATION, location);
        }
    }
}

/// Turn upstream response headers into the headers sent to the caller.
pub fn rewrite_response_headers(
    headers: &mut HeaderMap,
    origin: Option<&HeaderValue>,
    redirects: &RedirectRewriter,
) {
    apply_cors(headers, origin);
    redirects.apply(headers);
}
