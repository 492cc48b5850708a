//! Service layer for launching a configured server process
//!
//! A [`ProcessServiceBuilder`] turns accumulated configuration into a
//! [`LaunchSpec`] and hands it to `instantiate_service`, which produces a
//! handle that can be started, probed and stopped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

pub mod local;

pub use local::AppiumService;

/// Everything needed to launch the server process
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub executable: PathBuf,
    pub port: u16,
    pub startup_timeout: Duration,
    pub arguments: Vec<String>,
    pub environment: HashMap<String, String>,
}

/// Builder hooks for a service backed by a local process
pub trait ProcessServiceBuilder: Sized {
    type Service;

    /// Executable configured explicitly, if any
    fn executable(&self) -> Option<&Path>;

    /// Check an explicitly configured executable
    fn validate_executable(&self, path: &Path) -> Result<PathBuf>;

    /// Locate the executable when none was configured
    fn find_executable(&mut self) -> Result<PathBuf>;

    /// Validated path of the executable to launch
    fn resolve_executable(&mut self) -> Result<PathBuf> {
        match self.executable().map(Path::to_path_buf) {
            Some(explicit) => self.validate_executable(&explicit),
            None => self.find_executable(),
        }
    }

    /// Ordered command-line arguments passed to the executable
    fn build_arguments(&mut self) -> Result<Vec<String>>;

    /// Port to listen on, with `0` replaced by a free port
    fn resolve_port(&mut self) -> Result<u16>;

    fn startup_timeout(&self) -> Duration;

    fn environment(&self) -> &HashMap<String, String>;

    fn instantiate_service(&self, spec: LaunchSpec) -> Result<Self::Service>;

    /// Resolve everything and create the service.
    ///
    /// Fails before any process is spawned if the configuration is invalid.
    fn build(mut self) -> Result<Self::Service> {
        let executable = self.resolve_executable()?;
        let port = self.resolve_port()?;
        let arguments = self.build_arguments()?;
        let spec = LaunchSpec {
            executable,
            port,
            startup_timeout: self.startup_timeout(),
            arguments,
            environment: self.environment().clone(),
        };
        debug!("Launch spec: {:?}", spec);
        self.instantiate_service(spec)
    }
}

/// Ask the OS for a port nobody is listening on
pub fn find_free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))
        .map_err(|e| Error::invalid_with("Cannot find a free port", e))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::invalid_with("Cannot find a free port", e))?
        .port();
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubBuilder {
        executable: Option<PathBuf>,
        environment: HashMap<String, String>,
    }

    impl ProcessServiceBuilder for StubBuilder {
        type Service = LaunchSpec;

        fn executable(&self) -> Option<&Path> {
            self.executable.as_deref()
        }

        fn validate_executable(&self, path: &Path) -> Result<PathBuf> {
            Ok(path.join("checked"))
        }

        fn find_executable(&mut self) -> Result<PathBuf> {
            Err(Error::invalid("nothing on PATH"))
        }

        fn build_arguments(&mut self) -> Result<Vec<String>> {
            Ok(vec!["main.js".to_string()])
        }

        fn resolve_port(&mut self) -> Result<u16> {
            Ok(4723)
        }

        fn startup_timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn environment(&self) -> &HashMap<String, String> {
            &self.environment
        }

        fn instantiate_service(&self, spec: LaunchSpec) -> Result<LaunchSpec> {
            Ok(spec)
        }
    }

    #[test]
    fn test_build_validates_configured_executable() {
        let builder = StubBuilder {
            executable: Some(PathBuf::from("/opt/node")),
            environment: HashMap::new(),
        };
        let spec = builder.build().unwrap();
        assert_eq!(spec.executable, PathBuf::from("/opt/node/checked"));
        assert_eq!(spec.arguments, vec!["main.js"]);
    }

    #[test]
    fn test_build_searches_without_configured_executable() {
        let builder = StubBuilder {
            executable: None,
            environment: HashMap::new(),
        };
        let err = builder.build().unwrap_err();
        assert_eq!(err.to_string(), "nothing on PATH");
    }

    #[test]
    fn test_find_free_port() {
        let port = find_free_port().unwrap();
        assert_ne!(port, 0);
        // nothing holds the port once the probe listener is dropped
        assert!(std::net::TcpListener::bind(("127.0.0.1", port)).is_ok());
    }
}
