//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → cors.rs preflight layer ── OPTIONS ──▶ 204, never forwarded
//!     → forward.rs (build upstream request, send via client.rs)
//!     → cors.rs (inject CORS, rewrite Location)
//!     → response.rs (stream body back, 502 on upstream failure)
//!     → Send to client
//! ```

pub mod client;
pub mod cors;
pub mod forward;
pub mod headers;
pub mod response;
pub mod server;

pub use response::{ResponsePhase, ResponseState};
pub use server::{AppState, HttpServer};
