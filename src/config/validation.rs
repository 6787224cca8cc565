//! Configuration validation.
//!
//! # Responsibilities
//! - Apply built-in defaults to the merged configuration layers
//! - Check the target is an absolute `http`/`https` URL with a host
//! - Validate value ranges (port and timeout > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PartialConfig → Result<ProxyConfig, Vec<ValidationError>>
//! - Runs before config is handed to the engine

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::schema::{PartialConfig, ProxyConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_MS};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target is required (pass --target or set `target` in the config file)")]
    MissingTarget,

    #[error("target `{value}` is not a valid absolute URL: {reason}")]
    InvalidTarget { value: String, reason: String },

    #[error("target `{value}` must use http or https")]
    UnsupportedScheme { value: String },

    #[error("target `{value}` has no host")]
    MissingHost { value: String },

    #[error("port must be between 1 and 65535")]
    InvalidPort,

    #[error("timeout must be greater than 0ms")]
    InvalidTimeout,
}

/// Turn merged configuration layers into a runtime [`ProxyConfig`].
pub fn validate(merged: &PartialConfig) -> Result<ProxyConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let target = match merged.target.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(ValidationError::MissingTarget);
            None
        }
        Some(raw) => match parse_target(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };

    let port = merged.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    let timeout_ms = merged.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);
    if timeout_ms == 0 {
        errors.push(ValidationError::InvalidTimeout);
    }

    match target {
        Some(target) if errors.is_empty() => Ok(ProxyConfig {
            listen_host: merged.host.unwrap_or(DEFAULT_HOST),
            listen_port: port,
            target,
            logging_enabled: merged.logger.unwrap_or(true),
            request_timeout: Duration::from_millis(timeout_ms),
        }),
        _ => Err(errors),
    }
}

fn parse_target(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidTarget {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme {
            value: raw.to_string(),
        });
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::MissingHost {
            value: raw.to_string(),
        });
    }

    Ok(url)
}
