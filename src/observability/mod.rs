//! Observability subsystem.
//!
//! All subsystems log through `tracing`; `logging.rs` owns the subscriber
//! setup and the access-log format. Per-request spans come from
//! `tower_http::trace::TraceLayer` on the router.

pub mod logging;
