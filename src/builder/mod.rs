use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::capabilities::{self, capabilities_to_cmdline_arg, Capabilities};
use crate::constants::{
    address::BROADCAST_IP4_ADDRESS, timeout, APPIUM_PATH, DEFAULT_APPIUM_PORT, NODE_PATH,
};
use crate::error::{Error, Result};
use crate::flags::{GeneralServerFlag, ServerArgument};
use crate::platform::Platform;
use crate::resolve::{self, LookupSource};
use crate::service::{find_free_port, AppiumService, LaunchSpec, ProcessServiceBuilder};


/// Short alias some setups use for `--base-path`
const BASE_PATH_ALIAS: &str = "-pa";

/// Accumulates the configuration of a local Appium server
#[derive(Debug, Clone)]
pub struct AppiumServiceBuilder {
    port: u16,
    ip_address: String,
    log_file: Option<PathBuf>,
    executable: Option<PathBuf>,
    appium_js: Option<PathBuf>,
    npm: Option<PathBuf>,
    server_arguments: BTreeMap<String, String>,
    capabilities: Option<Capabilities>,
    auto_quote_capabilities_on_windows: bool,
    environment: HashMap<String, String>,
    properties: HashMap<String, String>,
    startup_timeout: Duration,
    npm_timeout: Duration,
}

impl Default for AppiumServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppiumServiceBuilder {
    pub fn new() -> Self {
        Self {
            port: DEFAULT_APPIUM_PORT,
            ip_address: BROADCAST_IP4_ADDRESS.to_string(),
            log_file: None,
            executable: None,
            appium_js: None,
            npm: None,
            server_arguments: BTreeMap::new(),
            capabilities: None,
            auto_quote_capabilities_on_windows: false,
            environment: std::env::vars().collect(),
            properties: HashMap::new(),
            startup_timeout: Duration::from_secs(timeout::STARTUP_SECS),
            npm_timeout: Duration::from_secs(timeout::NPM_ROOT_SECS),
        }
    }

    /// Port for the server. `0` picks any free port at build time.
    pub fn using_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn using_any_free_port(self) -> Self {
        self.using_port(0)
    }

    /// Node.js executable to launch the server with
    pub fn using_driver_executable(mut self, node: impl Into<PathBuf>) -> Self {
        self.executable = Some(node.into());
        self
    }

    /// npm executable used to discover the main script
    pub fn using_npm(mut self, npm: impl Into<PathBuf>) -> Self {
        self.npm = Some(npm.into());
        self
    }

    /// Replace the environment the server is launched with
    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = Some(log_file.into());
        self
    }

    /// How long to wait for the started server to become ready
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// How long `npm root -g` may take during main script discovery
    pub fn with_npm_timeout(mut self, timeout: Duration) -> Self {
        self.npm_timeout = timeout;
        self
    }

    /// Main Appium script (`main.js`)
    pub fn with_appium_js(mut self, appium_js: impl Into<PathBuf>) -> Self {
        self.appium_js = Some(appium_js.into());
        self
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self
    }

    /// In-process override for a path variable, checked before the OS environment
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Presence-only flag; its presence on the command line means "true"
    pub fn with_flag(mut self, argument: impl ServerArgument) -> Self {
        self.server_arguments
            .insert(argument.argument().to_string(), String::new());
        self
    }

    /// Add a server argument.
    ///
    /// Port, address and log file flags update their dedicated settings instead
    /// of the generic argument map. An empty value marks a presence-only flag.
    pub fn with_argument(
        mut self,
        argument: impl ServerArgument,
        value: impl Into<String>,
    ) -> Result<Self> {
        let name = argument.argument();
        let value = value.into();
        match name {
            "--port" | "-p" => {
                self.port = value.trim().parse().map_err(|_| {
                    Error::invalid(format!("Invalid port '{}' given for {}", value, name))
                })?;
            }
            "--address" | "-a" => self.ip_address = value,
            "--log" | "-g" => self.log_file = Some(PathBuf::from(value)),
            "--base-path" => {
                self.server_arguments
                    .insert(name.to_string(), sanitize_base_path(&value)?);
            }
            _ => {
                self.server_arguments.insert(name.to_string(), value);
            }
        }
        Ok(self)
    }

    /// Merge capabilities into the set passed as `--default-capabilities`
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(match self.capabilities.take() {
            Some(existing) => existing.merge(&capabilities),
            None => capabilities,
        });
        self
    }

    /// Like [`with_capabilities`](Self::with_capabilities), optionally quoting
    /// the rendered set for the Windows argument parser
    pub fn with_capabilities_quoted(
        mut self,
        capabilities: Capabilities,
        auto_quote_on_windows: bool,
    ) -> Self {
        self.auto_quote_capabilities_on_windows = auto_quote_on_windows;
        self.with_capabilities(capabilities)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn appium_js(&self) -> Option<&Path> {
        self.appium_js.as_deref()
    }

    pub fn server_arguments(&self) -> &BTreeMap<String, String> {
        &self.server_arguments
    }

    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.capabilities.as_ref()
    }

    pub fn auto_quote_capabilities_on_windows(&self) -> bool {
        self.auto_quote_capabilities_on_windows
    }

    /// How strongly this service supports the given capabilities
    pub fn score(&self, capabilities: &Capabilities) -> i32 {
        capabilities::score(capabilities)
    }

    fn lookup_sources(&self) -> [LookupSource<'_>; 2] {
        [
            LookupSource::Properties(&self.properties),
            LookupSource::Environment,
        ]
    }

    fn load_path_to_main_script(&mut self) -> Result<PathBuf> {
        if let Some(appium_js) = &self.appium_js {
            return resolve::validate_path(
                appium_js,
                resolve::appium_js_not_exist_error(appium_js),
            );
        }

        let from_env = resolve::load_path_from_env(APPIUM_PATH, &self.lookup_sources());
        if let Some(main_script) = from_env {
            debug!("Using main script from {}: {}", APPIUM_PATH, main_script.display());
            let main_script = resolve::validate_path(
                &main_script,
                resolve::appium_js_not_exist_error(&main_script),
            )?;
            self.appium_js = Some(main_script.clone());
            return Ok(main_script);
        }

        let main_script = match &self.npm {
            Some(npm) => resolve::find_main_script_with(npm, self.npm_timeout)?,
            None => resolve::find_main_script(self.npm_timeout)?,
        };
        info!("Discovered main Appium script at {}", main_script.display());
        self.appium_js = Some(main_script.clone());
        Ok(main_script)
    }
}

impl ProcessServiceBuilder for AppiumServiceBuilder {
    type Service = AppiumService;

    fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    fn validate_executable(&self, node: &Path) -> Result<PathBuf> {
        if !node.is_file() {
            return Err(Error::invalid(resolve::node_not_exist_error(node)));
        }
        Ok(node.to_path_buf())
    }

    fn find_executable(&mut self) -> Result<PathBuf> {
        let from_env = resolve::load_path_from_env(NODE_PATH, &self.lookup_sources());
        let node = match from_env {
            Some(node) => {
                debug!("Using NodeJS from {}: {}", NODE_PATH, node.display());
                self.validate_executable(&node)?
            }
            None => resolve::find_node()?,
        };

        self.executable = Some(node.clone());
        Ok(node)
    }

    fn build_arguments(&mut self) -> Result<Vec<String>> {
        let main_script = self.load_path_to_main_script()?;

        let mut args = vec![
            resolve::absolute(&main_script)?.display().to_string(),
            "--port".to_string(),
            self.port.to_string(),
        ];

        if self.ip_address.is_empty() {
            self.ip_address = BROADCAST_IP4_ADDRESS.to_string();
        }
        args.push("--address".to_string());
        args.push(self.ip_address.clone());

        if let Some(log) = &self.log_file {
            args.push("--log".to_string());
            args.push(resolve::absolute(log)?.display().to_string());
        }

        for (argument, value) in &self.server_arguments {
            if argument.is_empty() {
                continue;
            }
            args.push(argument.clone());
            if !value.is_empty() {
                args.push(value.clone());
            }
        }

        if let Some(capabilities) = &self.capabilities {
            args.push(GeneralServerFlag::DefaultCapabilities.as_str().to_string());
            args.push(capabilities_to_cmdline_arg(
                capabilities,
                self.auto_quote_capabilities_on_windows,
                Platform::current(),
            ));
        }

        Ok(args)
    }

    fn resolve_port(&mut self) -> Result<u16> {
        if self.port == 0 {
            self.port = find_free_port()?;
            debug!("Picked free port {}", self.port);
        }
        Ok(self.port)
    }

    fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }

    fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    fn instantiate_service(&self, spec: LaunchSpec) -> Result<AppiumService> {
        let base_path = self
            .server_arguments
            .get(GeneralServerFlag::BasePath.as_str())
            .or_else(|| self.server_arguments.get(BASE_PATH_ALIAS))
            .cloned();
        Ok(AppiumService::new(self.ip_address.clone(), spec).with_base_path(base_path))
    }
}

/// Trim and ensure exactly one trailing slash; blank values are rejected
fn sanitize_base_path(base_path: &str) -> Result<String> {
    let base_path = base_path.trim();
    if base_path.is_empty() {
        return Err(Error::invalid(
            "Given base path is not valid - blank or empty values are not allowed for base path",
        ));
    }
    let mut sanitized = base_path.trim_end_matches('/').to_string();
    sanitized.push('/');
    Ok(sanitized)
}
