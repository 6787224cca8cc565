//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listen_host:listen_port
//!     → listener.rs (bind, surface BindError)
//!     → Hand off to HTTP layer (axum::serve accept loop)
//! ```

pub mod listener;
