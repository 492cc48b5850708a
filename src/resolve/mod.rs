//! Locating Node.js, npm and the main Appium script

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::constants::APPIUM_PATH_SUFFIX;
use crate::error::{Error, Result};
use crate::platform::Platform;


/// A place a path override may come from, consulted in order
#[derive(Debug, Clone, Copy)]
pub enum LookupSource<'a> {
    /// In-process overrides set on the builder
    Properties(&'a HashMap<String, String>),
    /// The operating system environment of this process
    Environment,
}

impl LookupSource<'_> {
    fn get(&self, name: &str) -> Option<String> {
        match self {
            LookupSource::Properties(properties) => properties.get(name).cloned(),
            LookupSource::Environment => std::env::var(name).ok(),
        }
    }
}

/// First non-empty value of `name` across `sources`
pub fn load_path_from_env(name: &str, sources: &[LookupSource<'_>]) -> Option<PathBuf> {
    sources
        .iter()
        .filter_map(|source| source.get(name))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Fail with `err_msg` unless `path` exists
pub fn validate_path(path: &Path, err_msg: impl Into<String>) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::invalid(err_msg));
    }
    Ok(path.to_path_buf())
}

/// Look `name` up on PATH
pub fn find_binary(name: &str, err_msg: &str) -> Result<PathBuf> {
    let path = which::which(name).map_err(|e| {
        debug!("{} not found on PATH: {}", name, e);
        Error::invalid(err_msg)
    })?;
    debug!("Found {} at {}", name, path.display());
    validate_path(&path, err_msg)
}

pub fn find_node() -> Result<PathBuf> {
    find_binary(
        "node",
        "NodeJS is either not installed or its executable not present in PATH",
    )
}

pub fn find_npm() -> Result<PathBuf> {
    find_binary(
        "npm",
        "Node Package Manager (npm) is either not installed or its executable is not present in PATH",
    )
}

pub(crate) fn node_not_exist_error(path: &Path) -> String {
    format!(
        "The main NodeJS executable does not exist at '{}'",
        display_absolute(path)
    )
}

pub(crate) fn appium_js_not_exist_error(path: &Path) -> String {
    format!(
        "The main Appium script does not exist at '{}'",
        display_absolute(path)
    )
}

fn display_absolute(path: &Path) -> String {
    absolute(path).unwrap_or_else(|_| path.to_path_buf()).display().to_string()
}

/// Absolute form of `path` without resolving symlinks
pub fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        Error::invalid_with(
            format!("Cannot resolve the absolute path of '{}'", path.display()),
            e,
        )
    })
}

/// Command line that prints the global node_modules root.
///
/// npm is a batch script on Windows, so it has to go through `cmd.exe`.
pub fn npm_root_command_line(npm: &Path, platform: Platform) -> Vec<String> {
    if platform.is_windows() {
        vec![
            "cmd.exe".to_string(),
            "/c".to_string(),
            format!("\"{}\" root -g", npm.display()),
        ]
    } else {
        vec![
            npm.display().to_string(),
            "root".to_string(),
            "-g".to_string(),
        ]
    }
}

fn npm_root_command(npm: &Path) -> Command {
    let line = npm_root_command_line(npm, Platform::current());
    let mut cmd = Command::new(&line[0]);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        for arg in &line[1..] {
            cmd.raw_arg(arg);
        }
    }

    #[cfg(not(windows))]
    cmd.args(&line[1..]);

    cmd
}

/// Locate the main script using npm from PATH
pub fn find_main_script(timeout: Duration) -> Result<PathBuf> {
    let npm = find_npm()?;
    find_main_script_with(&npm, timeout)
}

/// Locate the main script under the global node_modules root reported by `npm`
pub fn find_main_script_with(npm: &Path, timeout: Duration) -> Result<PathBuf> {
    let npm = absolute(npm)?;
    let cmd = npm_root_command(&npm);
    debug!("Running command: {:?}", cmd);

    let stdout = run_with_timeout(cmd, timeout)?;
    let node_modules_root = stdout.trim();
    info!("Global node_modules root: {}", node_modules_root);

    let mut main_script = PathBuf::from(node_modules_root);
    main_script.extend(APPIUM_PATH_SUFFIX);

    validate_path(&main_script, appium_js_not_exist_error(&main_script))
}

fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<String> {
    const ROOT_ERROR: &str =
        "Cannot retrieve the path to the folder where NodeJS modules are located";

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::invalid_with(ROOT_ERROR, e))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::invalid(ROOT_ERROR))?;
    // a background child of npm can hold the pipe open after npm exits
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = tx.send(stdout.read_to_string(&mut buf).map(|_| buf));
    });

    let deadline = Instant::now() + timeout;
    let timed_out = || {
        Error::invalid(format!(
            "{}: npm did not finish within {}ms",
            ROOT_ERROR,
            timeout.as_millis()
        ))
    };
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(timed_out());
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(20)),
            Err(e) => return Err(Error::invalid_with(ROOT_ERROR, e)),
        }
    };

    if !status.success() {
        return Err(Error::invalid(format!("{}: npm exited with {}", ROOT_ERROR, status)));
    }

    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(output) => output.map_err(|e| Error::invalid_with(ROOT_ERROR, e)),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(timed_out()),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::invalid(ROOT_ERROR)),
    }
}
