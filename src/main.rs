//! CORS Reverse Proxy
//!
//! Forwards browser traffic to a single upstream and injects CORS headers.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌─────────────────────────────────────────────┐
//!                      │                 CORS PROXY                  │
//!    Client Request    │  ┌──────────┐   ┌───────────┐   ┌─────────┐ │
//!   ───────────────────┼─▶│ listener │──▶│ preflight │──▶│ forward │─┼──▶ Upstream
//!                      │  └──────────┘   └─────┬─────┘   └─────────┘ │
//!                      │                OPTIONS│                     │
//!    Client Response   │                       ▼         ┌─────────┐ │
//!   ◀──────────────────┼──────────── 204 / rewritten ◀───│ rewrite │◀┼─── Upstream
//!                      │                                 │CORS, Loc│ │
//!                      │                                 └─────────┘ │
//!                      └─────────────────────────────────────────────┘
//! ```

mod cli;
mod output;

use std::path::Path;

use clap::Parser;
use cors_proxy::config::loader::{self, ConfigError};
use cors_proxy::config::schema::DEFAULT_CONFIG_FILE;
use cors_proxy::config::ProxyConfig;
use cors_proxy::lifecycle::signals::shutdown_signal;
use cors_proxy::observability::logging;

use crate::cli::{Cli, Command, StartArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let args = match cli.command {
        Some(Command::Init) => return init(),
        Some(Command::Start(args)) => args,
        None => cli.start,
    };

    logging::init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            output::print_error("invalid configuration", &e);
            output::print_usage_hint();
            std::process::exit(1);
        }
    };

    tracing::info!(
        upstream = %config.target,
        port = config.listen_port,
        logging = config.logging_enabled,
        timeout_ms = config.request_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    let handle = match cors_proxy::start(config).await {
        Ok(handle) => handle,
        Err(e) => {
            output::print_error("failed to start proxy", &e);
            std::process::exit(1);
        }
    };
    output::print_summary(handle.summary());

    shutdown_signal().await;
    output::print_stopping();

    let stop = handle.stop();
    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = shutdown_signal() => {
                tracing::warn!("Shutdown already in progress, still draining");
            }
        }
    }

    output::print_stopped();
    Ok(())
}

fn load_config(args: &StartArgs) -> Result<ProxyConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: ".".into(),
        source,
    })?;
    let file = loader::load_layer(args.config.as_deref(), &cwd)?;
    loader::resolve(args.layer(), file)
}

fn init() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    match loader::write_template(path) {
        Ok(()) => {
            output::print_init_success(path);
            Ok(())
        }
        Err(e) => {
            output::print_error("could not create config file", &e);
            std::process::exit(1);
        }
    }
}
