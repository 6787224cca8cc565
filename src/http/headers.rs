//! Header manipulation for the upstream leg.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Point `host`, `origin` and `referer` at the target
//! - Place the inbound path and query on the target URL

use axum::http::header::{CONNECTION, HOST, ORIGIN, REFERER};
use axum::http::uri::Uri;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::config::ProxyConfig;

/// Connection-scoped headers that never cross the proxy.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any extra names the `Connection`
/// header nominates.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let nominated: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in nominated {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// Header values that make the upstream see itself as the caller's origin.
///
/// Computed once at startup; every forwarded request reuses them.
#[derive(Debug, Clone)]
pub struct TargetIdentity {
    host: HeaderValue,
    origin: HeaderValue,
}

impl TargetIdentity {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, axum::http::Error> {
        Ok(Self {
            host: HeaderValue::from_str(&config.target_authority())?,
            origin: HeaderValue::from_str(&config.target_origin())?,
        })
    }

    /// Overwrite `host`, `origin` and `referer`.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(HOST, self.host.clone());
        headers.insert(ORIGIN, self.origin.clone());
        headers.insert(REFERER, self.origin.clone());
    }
}

/// Build the header set sent upstream from the inbound headers.
pub fn upstream_headers(inbound: &HeaderMap, identity: &TargetIdentity) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);
    identity.apply(&mut headers);
    headers
}

/// Resolve the upstream URL: the target's scheme, host and port with the
/// inbound path and query.
pub fn upstream_url(target: &Url, inbound: &Uri) -> Url {
    let mut url = target.clone();
    match inbound.path_and_query() {
        Some(pq) => {
            url.set_path(pq.path());
            url.set_query(pq.query());
        }
        None => {
            url.set_path("/");
            url.set_query(None);
        }
    }
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(target: &str) -> ProxyConfig {
        ProxyConfig::new(Url::parse(target).unwrap())
    }

    #[test]
    fn strips_every_hop_by_hop_header() {
        let mut headers = HeaderMap::new();
        for name in HOP_BY_HOP_HEADERS {
            headers.insert(*name, HeaderValue::from_static("x"));
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        strip_hop_by_hop(&mut headers);

        for name in HOP_BY_HOP_HEADERS {
            assert!(!headers.contains_key(*name), "{} survived", name);
        }
        assert_eq!(headers["content-type"], "application/json");
    }

    #[test]
    fn strips_headers_nominated_by_connection() {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("close, X-Session-Hint"));
        headers.insert("x-session-hint", HeaderValue::from_static("abc"));
        headers.insert("x-kept", HeaderValue::from_static("1"));

        strip_hop_by_hop(&mut headers);

        assert!(!headers.contains_key("x-session-hint"));
        assert!(headers.contains_key("x-kept"));
    }

    #[test]
    fn identity_overrides_caller_headers() {
        let identity = TargetIdentity::from_config(&config("https://api.example.com:8443/v1")).unwrap();
        let mut inbound = HeaderMap::new();
        inbound.insert(HOST, HeaderValue::from_static("localhost:8000"));
        inbound.insert(ORIGIN, HeaderValue::from_static("http://a.test"));
        inbound.insert(REFERER, HeaderValue::from_static("http://a.test/page"));
        inbound.append("accept", HeaderValue::from_static("text/html"));
        inbound.append("accept", HeaderValue::from_static("application/json"));

        let headers = upstream_headers(&inbound, &identity);

        assert_eq!(headers[HOST], "api.example.com:8443");
        assert_eq!(headers[ORIGIN], "https://api.example.com:8443");
        assert_eq!(headers[REFERER], "https://api.example.com:8443");
        assert_eq!(headers.get_all("accept").iter().count(), 2);
    }

    #[test]
    fn inbound_path_and_query_replace_target_path() {
        let target = Url::parse("http://example.com/base").unwrap();

        let url = upstream_url(&target, &"/foo?x=1".parse().unwrap());
        assert_eq!(url.as_str(), "http://example.com/foo?x=1");

        let url = upstream_url(&target, &"/".parse().unwrap());
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn scheme_relative_paths_stay_on_target_host() {
        let target = Url::parse("http://example.com").unwrap();
        let url = upstream_url(&target, &"//evil.test/steal".parse().unwrap());
        assert_eq!(url.host_str(), Some("example.com"));
    }
}
