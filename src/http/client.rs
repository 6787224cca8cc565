//! Upstream HTTP client.
//!
//! One pooled client serves every request. The connector speaks plain HTTP
//! for `http://` targets and TLS for `https://` targets, so the transport is
//! picked by the upstream URL's scheme.

use std::sync::Arc;

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::error::ProxyError;

/// Type alias for the HTTP client used by the proxy.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Create the shared upstream client.
pub fn build_client() -> Result<HttpClient, ProxyError> {
    // Use the ring provider explicitly to avoid ambiguity when multiple
    // crypto providers are in the dependency tree.
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_root_certificates(root_store)
    .with_no_client_auth();

    let mut http_connector = HttpConnector::new();
    http_connector.enforce_http(false);

    let https_connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .wrap_connector(http_connector);

    Ok(Client::builder(TokioExecutor::new()).build(https_connector))
}
