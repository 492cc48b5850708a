use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

use crate::builder::AppiumServiceBuilder;
use crate::capabilities::Capabilities;

#[derive(Parser)]
#[command(name = "appium-service")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "APPIUM_SERVICE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an Appium server and keep it running until interrupted
    Start {
        #[command(flatten)]
        server: ServerArgs,
    },

    /// Print the command line that would launch the Appium server
    Args {
        #[command(flatten)]
        server: ServerArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// Port for the server to listen on (0 picks any free port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address for the server to bind to
    #[arg(short, long)]
    pub address: Option<String>,

    /// File the server writes its log to
    #[arg(short = 'g', long = "log", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Node.js executable (defaults to NODE_BINARY_PATH, then PATH)
    #[arg(long, value_name = "FILE")]
    pub node: Option<PathBuf>,

    /// Main Appium script (defaults to APPIUM_BINARY_PATH, then `npm root -g`)
    #[arg(long = "appium-js", value_name = "FILE")]
    pub appium_js: Option<PathBuf>,

    /// URL path prefix for the server API
    #[arg(long)]
    pub base_path: Option<String>,

    /// Extra server argument; omit the value for presence-only flags
    /// Can be specified multiple times
    #[arg(long = "arg", value_name = "NAME[=VALUE]", allow_hyphen_values = true)]
    pub arguments: Vec<String>,

    /// Default capability; the value is parsed as JSON when possible
    /// Can be specified multiple times
    #[arg(short = 'c', long = "capability", value_name = "NAME=VALUE")]
    pub capabilities: Vec<String>,

    /// Hand-quote capabilities for the Windows argument parser
    #[arg(long)]
    pub quote_capabilities_on_windows: bool,

    /// Seconds to wait for the server to become ready
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl ServerArgs {
    /// Apply command-line settings on top of `builder`
    pub fn apply(&self, builder: AppiumServiceBuilder) -> Result<AppiumServiceBuilder> {
        let mut builder = builder;

        if let Some(port) = self.port {
            builder = builder.using_port(port);
        }
        if let Some(address) = &self.address {
            builder = builder.with_ip_address(address.clone());
        }
        if let Some(log_file) = &self.log_file {
            builder = builder.with_log_file(log_file);
        }
        if let Some(node) = &self.node {
            builder = builder.using_driver_executable(node);
        }
        if let Some(appium_js) = &self.appium_js {
            builder = builder.with_appium_js(appium_js);
        }
        if let Some(base_path) = &self.base_path {
            builder = builder.with_argument("--base-path", base_path.clone())?;
        }
        for argument in &self.arguments {
            builder = match parse_server_argument(argument) {
                (name, Some(value)) => builder.with_argument(name, value)?,
                (name, None) => builder.with_flag(name),
            };
        }
        if !self.capabilities.is_empty() {
            let capabilities = parse_capabilities(&self.capabilities)?;
            builder = if self.quote_capabilities_on_windows {
                builder.with_capabilities_quoted(capabilities, true)
            } else {
                builder.with_capabilities(capabilities)
            };
        }
        if let Some(timeout) = self.timeout {
            builder = builder.with_timeout(Duration::from_secs(timeout));
        }

        Ok(builder)
    }
}

/// Split `NAME=VALUE`; a bare `NAME` is a presence-only flag
pub fn parse_server_argument(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (raw, None),
    }
}

/// Parse `NAME=VALUE` pairs, reading each value as JSON and falling back to a string
pub fn parse_capabilities(raw: &[String]) -> Result<Capabilities> {
    let mut capabilities = Capabilities::new();
    for pair in raw {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("Capability must be NAME=VALUE, got '{}'", pair))?;
        if name.is_empty() {
            anyhow::bail!("Capability name is empty in '{}'", pair);
        }
        let value = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        capabilities.set_capability(name, value);
    }
    Ok(capabilities)
}
