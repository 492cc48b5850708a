use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::builder::AppiumServiceBuilder;
use crate::capabilities::Capabilities;
use crate::constants::{address::BROADCAST_IP4_ADDRESS, timeout, DEFAULT_APPIUM_PORT};


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port the server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address the server binds to
    #[serde(default = "default_address")]
    pub address: String,

    /// Node.js executable
    pub node: Option<PathBuf>,

    /// Main Appium script
    pub appium_js: Option<PathBuf>,

    /// File the server writes its log to
    pub log_file: Option<PathBuf>,

    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    #[serde(default = "default_npm_timeout_secs")]
    pub npm_timeout_secs: u64,

    /// Extra server arguments; an empty value marks a presence-only flag
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,

    /// Default capabilities for new sessions
    pub capabilities: Option<Capabilities>,

    #[serde(default)]
    pub quote_capabilities_on_windows: bool,
}

fn default_port() -> u16 {
    DEFAULT_APPIUM_PORT
}

fn default_address() -> String {
    BROADCAST_IP4_ADDRESS.to_string()
}

fn default_startup_timeout_secs() -> u64 {
    timeout::STARTUP_SECS
}

fn default_npm_timeout_secs() -> u64 {
    timeout::NPM_ROOT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            address: default_address(),
            node: None,
            appium_js: None,
            log_file: None,
            startup_timeout_secs: default_startup_timeout_secs(),
            npm_timeout_secs: default_npm_timeout_secs(),
            arguments: BTreeMap::new(),
            capabilities: None,
            quote_capabilities_on_windows: false,
        }
    }
}

impl Config {
    /// Default location: `<config dir>/appium-service/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("appium-service").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply these settings on top of `builder`
    pub fn apply(&self, builder: AppiumServiceBuilder) -> crate::Result<AppiumServiceBuilder> {
        let mut builder = builder
            .using_port(self.port)
            .with_ip_address(self.address.clone())
            .with_timeout(Duration::from_secs(self.startup_timeout_secs))
            .with_npm_timeout(Duration::from_secs(self.npm_timeout_secs));

        if let Some(node) = &self.node {
            builder = builder.using_driver_executable(node);
        }
        if let Some(appium_js) = &self.appium_js {
            builder = builder.with_appium_js(appium_js);
        }
        if let Some(log_file) = &self.log_file {
            builder = builder.with_log_file(log_file);
        }
        for (name, value) in &self.arguments {
            builder = builder.with_argument(name, value.clone())?;
        }
        if let Some(capabilities) = &self.capabilities {
            builder = builder
                .with_capabilities_quoted(capabilities.clone(), self.quote_capabilities_on_windows);
        }

        Ok(builder)
    }
}
