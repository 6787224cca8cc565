//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! proxy.toml (optional)        CLI flags / env vars
//!     → loader.rs (parse)          → PartialConfig
//!     → PartialConfig ─────┬───────────┘
//!                          ▼
//!                  schema.rs (layer merge: CLI > file > defaults)
//!                          ▼
//!                  validation.rs (semantic checks)
//!                          ▼
//!                  ProxyConfig (validated, immutable)
//!                          → shared via Arc to every request handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; there is no reload
//! - Every file field is optional to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{PartialConfig, ProxyConfig};
pub use validation::ValidationError;
