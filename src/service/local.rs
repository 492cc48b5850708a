//! Handle for an Appium server running as a local child process

use chrono::{DateTime, Utc};
use http_body_util::Empty;
use hyper::body::Bytes;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::LaunchSpec;
use crate::constants::address::{
    BROADCAST_IP4_ADDRESS, BROADCAST_IP6_ADDRESS, LOOPBACK_IP4_ADDRESS,
};
use crate::error::{Error, Result};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// A configured Appium server, possibly running
pub struct AppiumService {
    ip_address: String,
    spec: LaunchSpec,
    base_path: Option<String>,
    process: Option<Child>,
    started_at: Option<DateTime<Utc>>,
}

impl AppiumService {
    pub fn new(ip_address: impl Into<String>, spec: LaunchSpec) -> Self {
        Self {
            ip_address: ip_address.into(),
            spec,
            base_path: None,
            process: None,
            started_at: None,
        }
    }

    /// URL path prefix the server exposes its API under
    pub fn with_base_path(mut self, base_path: Option<String>) -> Self {
        self.base_path = base_path;
        self
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn executable(&self) -> &Path {
        &self.spec.executable
    }

    pub fn port(&self) -> u16 {
        self.spec.port
    }

    pub fn arguments(&self) -> &[String] {
        &self.spec.arguments
    }

    pub fn environment(&self) -> &HashMap<String, String> {
        &self.spec.environment
    }

    pub fn startup_timeout(&self) -> Duration {
        self.spec.startup_timeout
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Executable followed by its arguments
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.spec.executable.display().to_string())
            .chain(self.spec.arguments.iter().cloned())
            .collect()
    }

    /// Base URL of the server, always ending with `/`
    pub fn url(&self) -> String {
        let host = match self.ip_address.as_str() {
            "" | BROADCAST_IP4_ADDRESS => LOOPBACK_IP4_ADDRESS.to_string(),
            BROADCAST_IP6_ADDRESS => "[::1]".to_string(),
            ip if ip.contains(':') && !ip.starts_with('[') => format!("[{}]", ip),
            ip => ip.to_string(),
        };

        let mut path = self.base_path.clone().unwrap_or_default();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        if !path.ends_with('/') {
            path.push('/');
        }

        format!("http://{}:{}{}", host, self.spec.port, path)
    }

    /// Spawn the server and wait until its status endpoint answers.
    ///
    /// Calling this on a service whose process is still alive does nothing.
    pub async fn start(&mut self) -> Result<()> {
        if self.process_alive() {
            debug!("Appium server process is already running");
            return Ok(());
        }

        info!(
            "Starting Appium server: {} {}",
            self.spec.executable.display(),
            self.spec.arguments.join(" ")
        );

        let mut command = Command::new(&self.spec.executable);
        command
            .args(&self.spec.arguments)
            .env_clear()
            .envs(&self.spec.environment)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(Error::SpawnFailed)?;
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, "stderr"));
        }

        self.process = Some(child);
        self.started_at = Some(Utc::now());

        if let Err(e) = self.wait_until_ready().await {
            if let Err(stop_err) = self.stop().await {
                warn!("Failed to clean up after unsuccessful start: {}", stop_err);
            }
            return Err(e);
        }

        info!("Appium server is ready at {}", self.url());
        Ok(())
    }

    /// Whether the process is alive and answers its status endpoint
    pub async fn is_running(&mut self) -> bool {
        self.process_alive() && probe_status(&self.status_url()).await
    }

    /// Kill the server process and reap it
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(mut child) = self.process.take() {
            if matches!(child.try_wait(), Ok(None)) {
                info!("Stopping Appium server at {}", self.url());
                child.kill().await.map_err(Error::StopFailed)?;
            }
        }
        self.started_at = None;
        Ok(())
    }

    fn status_url(&self) -> String {
        format!("{}status", self.url())
    }

    fn process_alive(&mut self) -> bool {
        match self.process.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    async fn wait_until_ready(&mut self) -> Result<()> {
        let status_url = self.status_url();
        let timeout = self.spec.startup_timeout;
        let deadline = tokio::time::Instant::now() + timeout;
        debug!("Waiting for {} to answer", status_url);

        loop {
            if let Some(child) = self.process.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    return Err(Error::ProcessExited { status });
                }
            }

            if probe_status(&status_url).await {
                return Ok(());
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::StartupTimeout {
                    url: self.url(),
                    timeout_ms: timeout.as_millis(),
                });
            }

            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

async fn probe_status(url: &str) -> bool {
    let Ok(uri) = url.parse::<hyper::Uri>() else {
        return false;
    };

    let client: Client<HttpConnector, Empty<Bytes>> =
        Client::builder(TokioExecutor::new()).build_http();

    match tokio::time::timeout(PROBE_TIMEOUT, client.get(uri)).await {
        Ok(Ok(response)) => response.status().is_success(),
        Ok(Err(e)) => {
            debug!("Status probe of {} failed: {}", url, e);
            false
        }
        Err(_) => {
            debug!("Status probe of {} timed out", url);
            false
        }
    }
}

async fn forward_output<R>(reader: R, stream: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "appium", "[{}] {}", stream, line);
    }
}
