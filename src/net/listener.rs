//! TCP listener binding.

use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpListener;

use crate::error::ProxyError;

/// Bind the proxy's listening socket.
///
/// Port 0 asks the OS for a free port; read it back with `local_addr()`.
pub async fn bind(host: IpAddr, port: u16) -> Result<TcpListener, ProxyError> {
    let addr = SocketAddr::new(host, port);
    let bind_error = |source| ProxyError::Bind {
        addr: addr.to_string(),
        source,
    };

    let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
    let local_addr = listener.local_addr().map_err(bind_error)?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}
