//! Server flags understood by the Appium command line

/// Anything that names a server command-line flag
pub trait ServerArgument {
    /// The flag as it appears on the command line, e.g. `--log-level`
    fn argument(&self) -> &str;
}

impl ServerArgument for &str {
    fn argument(&self) -> &str {
        self
    }
}

impl ServerArgument for String {
    fn argument(&self) -> &str {
        self.as_str()
    }
}

impl ServerArgument for &String {
    fn argument(&self) -> &str {
        self.as_str()
    }
}

/// General Appium 2 server flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralServerFlag {
    /// Enables session override (clobbering)
    SessionOverride,
    /// Port number, handled by the dedicated port setting
    Port,
    /// Bind address, handled by the dedicated address setting
    Address,
    /// Log file, handled by the dedicated log file setting
    LogFile,
    /// Log level, e.g. `debug` or `info:debug`
    LogLevel,
    /// Show timestamps in console output
    LogTimestamp,
    /// Use local timezone for timestamps
    LocalTimezone,
    /// Do not use colors in console output
    LogNoColors,
    /// Filter rules applied to log messages
    LogFilters,
    /// Initial path segment where the API is hosted
    BasePath,
    /// Callback IP address (default: same as address)
    CallbackAddress,
    /// Callback port (default: same as port)
    CallbackPort,
    /// Disable additional security checks
    RelaxedSecurity,
    /// Comma-separated insecure features to allow
    AllowInsecure,
    /// Comma-separated insecure features to deny
    DenyInsecure,
    /// Drivers to activate, by name
    UseDrivers,
    /// Plugins to activate, by name
    UsePlugins,
    /// Seconds to keep idle HTTP connections open
    KeepAliveTimeout,
    /// Send log output to this HTTP listener
    Webhook,
    /// Default desired capabilities as JSON
    DefaultCapabilities,
    /// Allow cross-origin requests
    AllowCors,
    /// Path to a server configuration file
    ConfigFile,
    /// Absolute path to a directory Appium can use for temporary files
    TmpDir,
    /// Absolute path to a directory for tracing files
    TraceDir,
    /// Add exaggerated spacing in logs
    DebugLogSpacing,
    /// Add long stack traces to log entries
    LongStackTrace,
    /// Cause sessions to fail if unknown capabilities are sent
    StrictCaps,
    /// Skip the check for needed file permissions
    NoPermsCheck,
    /// Set of driver arguments as JSON
    DriverArgs,
    /// Set of plugin arguments as JSON
    PluginArgs,
}

impl GeneralServerFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            GeneralServerFlag::SessionOverride => "--session-override",
            GeneralServerFlag::Port => "--port",
            GeneralServerFlag::Address => "--address",
            GeneralServerFlag::LogFile => "--log",
            GeneralServerFlag::LogLevel => "--log-level",
            GeneralServerFlag::LogTimestamp => "--log-timestamp",
            GeneralServerFlag::LocalTimezone => "--local-timezone",
            GeneralServerFlag::LogNoColors => "--log-no-colors",
            GeneralServerFlag::LogFilters => "--log-filters",
            GeneralServerFlag::BasePath => "--base-path",
            GeneralServerFlag::CallbackAddress => "--callback-address",
            GeneralServerFlag::CallbackPort => "--callback-port",
            GeneralServerFlag::RelaxedSecurity => "--relaxed-security",
            GeneralServerFlag::AllowInsecure => "--allow-insecure",
            GeneralServerFlag::DenyInsecure => "--deny-insecure",
            GeneralServerFlag::UseDrivers => "--use-drivers",
            GeneralServerFlag::UsePlugins => "--use-plugins",
            GeneralServerFlag::KeepAliveTimeout => "--keep-alive-timeout",
            GeneralServerFlag::Webhook => "--webhook",
            GeneralServerFlag::DefaultCapabilities => "--default-capabilities",
            GeneralServerFlag::AllowCors => "--allow-cors",
            GeneralServerFlag::ConfigFile => "--config",
            GeneralServerFlag::TmpDir => "--tmp",
            GeneralServerFlag::TraceDir => "--trace-dir",
            GeneralServerFlag::DebugLogSpacing => "--debug-log-spacing",
            GeneralServerFlag::LongStackTrace => "--long-stacktrace",
            GeneralServerFlag::StrictCaps => "--strict-caps",
            GeneralServerFlag::NoPermsCheck => "--no-perms-check",
            GeneralServerFlag::DriverArgs => "--driver-args",
            GeneralServerFlag::PluginArgs => "--plugin-args",
        }
    }
}

impl ServerArgument for GeneralServerFlag {
    fn argument(&self) -> &str {
        self.as_str()
    }
}
