//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Bind listener → Build server → Spawn serve task
//!
//! Shutdown (shutdown.rs):
//!     stop() → Stop accepting → Drain in-flight requests → Resolve
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: bind errors are returned before anything is spawned
//! - Shutdown is idempotent: repeated stop() calls share one drain

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, ServerHandle, StartupSummary};
