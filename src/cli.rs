//! Command-line interface.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use cors_proxy::config::PartialConfig;

#[derive(Parser, Debug)]
#[command(name = "cors-proxy", version)]
#[command(about = "Reverse proxy that adds CORS headers to every response", long_about = None)]
#[command(args_conflicts_with_subcommands = true, disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub start: StartArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a proxy.toml template in the current directory
    Init,
    /// Start the proxy server (default)
    Start(StartArgs),
}

#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port to listen on [default: 8000]
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Upstream URL to proxy to (required)
    #[arg(short, long, env = "TARGET_URL")]
    pub target: Option<String>,

    /// Config file [default: ./proxy.toml when present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Disable the per-request log
    #[arg(long)]
    pub no_logger: bool,

    /// Upstream timeout in milliseconds [default: 30000]
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,
}

impl StartArgs {
    /// The command-line configuration layer.
    pub fn layer(&self) -> PartialConfig {
        PartialConfig {
            host: self.host,
            port: self.port,
            target: self.target.clone(),
            logger: self.no_logger.then_some(false),
            timeout: self.timeout,
        }
    }
}
