use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp directory with a stand-in node, an empty main.js and an empty config
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("node"), "")?;
        fs::write(dir.path().join("main.js"), "")?;
        fs::write(dir.path().join("config.toml"), "")?;
        Ok(Self { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("appium-service")?;
        cmd.env("APPIUM_SERVICE_CONFIG", self.path("config.toml"));
        Ok(cmd)
    }

    fn args_command(&self) -> Result<Command> {
        let mut cmd = self.command()?;
        cmd.arg("args")
            .arg("--node")
            .arg(self.path("node"))
            .arg("--appium-js")
            .arg(self.path("main.js"));
        Ok(cmd)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_version_command() -> Result<()> {
    let mut cmd = Command::cargo_bin("appium-service")?;
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("appium-service 0.1.0"));
    Ok(())
}

#[test]
fn test_version_subcommand() -> Result<()> {
    let mut cmd = Command::cargo_bin("appium-service")?;
    cmd.arg("version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("appium-service 0.1.0"));
    Ok(())
}

#[test]
fn test_help_command() -> Result<()> {
    let mut cmd = Command::cargo_bin("appium-service")?;
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "Configure and launch a local Appium server process",
    ));
    Ok(())
}

#[test]
fn test_start_help() -> Result<()> {
    let mut cmd = Command::cargo_bin("appium-service")?;
    cmd.arg("start").arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "Start an Appium server and keep it running until interrupted",
    ));
    Ok(())
}

#[test]
fn test_args_prints_command_line() -> Result<()> {
    let ws = Workspace::new()?;
    let output = ws.args_command()?.output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    let node = display(&ws.path("node"));
    let main_js = display(&ws.path("main.js"));
    assert_eq!(
        lines,
        vec![node.as_str(), main_js.as_str(), "--port", "4723", "--address", "0.0.0.0"]
    );
    Ok(())
}

#[test]
fn test_args_with_flags_and_capabilities() -> Result<()> {
    let ws = Workspace::new()?;
    let output = ws
        .args_command()?
        .args(["--port", "4800"])
        .args(["--arg", "--session-override"])
        .args(["--arg", "--log-level=debug"])
        .args(["-c", "platformName=Android"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(&lines[2..4], ["--port", "4800"]);
    assert_eq!(
        &lines[6..],
        [
            "--log-level",
            "debug",
            "--session-override",
            "--default-capabilities",
            r#"{"platformName":"Android"}"#
        ]
    );
    Ok(())
}

#[test]
fn test_args_reads_config_file() -> Result<()> {
    let ws = Workspace::new()?;
    fs::write(
        ws.path("config.toml"),
        r#"
port = 4900
address = "127.0.0.1"

[arguments]
"--relaxed-security" = ""
"#,
    )?;

    ws.args_command()?
        .assert()
        .success()
        .stdout(predicate::str::contains("4900"))
        .stdout(predicate::str::contains("127.0.0.1"))
        .stdout(predicate::str::contains("--relaxed-security"));
    Ok(())
}

#[test]
fn test_cli_overrides_config_file() -> Result<()> {
    let ws = Workspace::new()?;
    fs::write(ws.path("config.toml"), "port = 4900\n")?;

    ws.args_command()?
        .args(["-p", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5000"))
        .stdout(predicate::str::contains("4900").not());
    Ok(())
}

#[test]
fn test_args_missing_main_script() -> Result<()> {
    let ws = Workspace::new()?;
    let mut cmd = ws.command()?;
    cmd.arg("args")
        .arg("--node")
        .arg(ws.path("node"))
        .arg("--appium-js")
        .arg(ws.path("missing.js"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("The main Appium script does not exist"));
    Ok(())
}

#[test]
fn test_args_missing_node() -> Result<()> {
    let ws = Workspace::new()?;
    let mut cmd = ws.command()?;
    cmd.arg("args")
        .arg("--node")
        .arg(ws.path("no-node"))
        .arg("--appium-js")
        .arg(ws.path("main.js"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("The main NodeJS executable does not exist"));
    Ok(())
}

#[test]
fn test_args_blank_base_path() -> Result<()> {
    let ws = Workspace::new()?;
    ws.args_command()?
        .args(["--base-path", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base path"));
    Ok(())
}

#[test]
fn test_missing_config_file_is_reported() -> Result<()> {
    let ws = Workspace::new()?;
    ws.args_command()?
        .env("APPIUM_SERVICE_CONFIG", ws.path("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
    Ok(())
}
