/// Environment variable naming the main Appium script (`main.js`)
pub const APPIUM_PATH: &str = "APPIUM_BINARY_PATH";

/// Environment variable naming the Node.js executable
pub const NODE_PATH: &str = "NODE_BINARY_PATH";

/// Address constants
pub mod address {
    /// Listen on every IPv4 interface
    pub const BROADCAST_IP4_ADDRESS: &str = "0.0.0.0";

    /// Listen on every IPv6 interface
    pub const BROADCAST_IP6_ADDRESS: &str = "::";

    /// Host used to reach a server bound to a broadcast address
    pub const LOOPBACK_IP4_ADDRESS: &str = "127.0.0.1";
}

/// Default port the Appium server listens on
pub const DEFAULT_APPIUM_PORT: u16 = 4723;

/// Location of the main script relative to the global node_modules root
pub const APPIUM_PATH_SUFFIX: [&str; 4] = ["appium", "build", "lib", "main.js"];

/// Timeout constants, in seconds
pub mod timeout {
    /// How long to wait for a started server to answer its status endpoint
    pub const STARTUP_SECS: u64 = 120;

    /// How long `npm root -g` may run before it is killed
    pub const NPM_ROOT_SECS: u64 = 30;
}

/// Capability names
pub mod capability {
    pub const PLATFORM_NAME: &str = "platformName";
    pub const BROWSER_NAME: &str = "browserName";

    pub const CHROMEDRIVER_EXECUTABLE: &str = "chromedriverExecutable";
    pub const KEYSTORE_PATH: &str = "keystorePath";
    pub const APP: &str = "app";
    pub const APP_PACKAGE: &str = "appPackage";

    /// Vendor prefix for non-W3C capabilities
    pub const APPIUM_PREFIX: &str = "appium:";

    /// Capabilities holding file-system paths
    pub const PATH_CAPABILITIES: [&str; 4] =
        [CHROMEDRIVER_EXECUTABLE, KEYSTORE_PATH, APP, APP_PACKAGE];
}
