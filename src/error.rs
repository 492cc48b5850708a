//! Error types for building and running an Appium service.

use std::process::ExitStatus;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while configuring or running the server.
#[derive(Error, Debug)]
pub enum Error {
    /// The local environment or the builder input cannot produce a launchable server.
    #[error("{message}")]
    InvalidServerInstance {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The server process could not be spawned.
    #[error("failed to start the Appium server process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The server process exited before it answered the status endpoint.
    #[error("Appium server exited before it became ready ({status})")]
    ProcessExited { status: ExitStatus },

    /// The server did not answer the status endpoint in time.
    #[error("Appium server at {url} did not become ready within {timeout_ms}ms")]
    StartupTimeout { url: String, timeout_ms: u128 },

    /// The server process could not be killed.
    #[error("failed to stop the Appium server process: {0}")]
    StopFailed(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidServerInstance {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn invalid_with(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::InvalidServerInstance {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Whether this is a configuration error raised before any process was launched
    pub fn is_invalid_server_instance(&self) -> bool {
        matches!(self, Error::InvalidServerInstance { .. })
    }
}
