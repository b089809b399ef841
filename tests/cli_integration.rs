//! CLI integration tests using assert_cmd to exercise the actual binary.

use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn clipwise(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("clipwise").unwrap();
    cmd.env("CLIPWISE_CONFIG", config).env_remove("RUST_LOG");
    cmd
}

fn config_in(tmp: &TempDir) -> PathBuf {
    tmp.path().join("clipwise").join("config.yml")
}

/// Development backend as a child process, killed on drop.
struct BackendProcess(Child);

impl BackendProcess {
    fn start(config: &Path, bind: &str) -> Self {
        let child = std::process::Command::new(assert_cmd::cargo::cargo_bin("clipwise"))
            .args(["backend", "--bind", bind])
            .env("CLIPWISE_CONFIG", config)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        Self(child)
    }
}

impl Drop for BackendProcess {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

#[test]
fn cli_help_lists_subcommands() {
    let tmp = TempDir::new().unwrap();
    clipwise(&config_in(&tmp))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("backend"));
}

// ---------------------------------------------------------------------------
// Init subcommand
// ---------------------------------------------------------------------------

#[test]
fn cli_init_writes_default_config() {
    let tmp = TempDir::new().unwrap();
    let path = config_in(&tmp);

    clipwise(&path)
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote default config"));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("tcp://localhost:5555"));
    assert!(contents.contains("template: reply"));
}

#[test]
fn cli_init_idempotent() {
    let tmp = TempDir::new().unwrap();
    let path = config_in(&tmp);

    clipwise(&path).arg("init").assert().success();
    std::fs::write(&path, "log_level: warn\n").unwrap();

    clipwise(&path)
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "log_level: warn\n");
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[test]
fn cli_rejects_bad_hotkey_in_config() {
    let tmp = TempDir::new().unwrap();
    let path = config_in(&tmp);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "hotkey:\n  combination: Ctrl+Bogus+L\n").unwrap();

    clipwise(&path)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid hotkey combination"));
}

#[test]
fn cli_rejects_bad_hotkey_flag() {
    let tmp = TempDir::new().unwrap();
    clipwise(&config_in(&tmp))
        .args(["run", "--hotkey", "L"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one modifier"));
}

#[test]
fn cli_rejects_non_tcp_address() {
    let tmp = TempDir::new().unwrap();
    clipwise(&config_in(&tmp))
        .args(["send", "rewrite", "--content", "x", "--no-clipboard"])
        .args(["--address", "localhost:5555"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with tcp://"));
}

#[test]
fn cli_send_rejects_malformed_param() {
    let tmp = TempDir::new().unwrap();
    clipwise(&config_in(&tmp))
        .args(["send", "rewrite", "-p", "style"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key=value"));
}

// ---------------------------------------------------------------------------
// Send against the development backend
// ---------------------------------------------------------------------------

#[test]
fn cli_send_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = config_in(&tmp);
    let address = "tcp://127.0.0.1:47555";
    let _backend = BackendProcess::start(&path, address);

    clipwise(&path)
        .args(["send", "rewrite", "-p", "style=Casual"])
        .args(["--content", "see you soon", "--no-clipboard"])
        .args(["--address", address, "--timeout", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Casual"))
        .stdout(predicate::str::contains("see you soon"));

    clipwise(&path)
        .args(["send", "no_such_template", "--content", "x", "--no-clipboard"])
        .args(["--address", address, "--timeout", "20"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("template does not exist"));
}
