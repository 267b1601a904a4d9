use std::fs;
use std::path::Path;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn staging(&self) -> std::path::PathBuf {
        self.dir.path().join("staging")
    }

    fn install(&self) -> std::path::PathBuf {
        let dir = self.dir.path().join("install");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// `uri-handoff` isolated from the host: private staging/install dirs,
    /// no PATH lookup, no stray config.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("uri-handoff").unwrap();
        cmd.timeout(Duration::from_secs(10))
            .env_remove("HANDOFF_CONFIG")
            .env_remove("HANDOFF_LOG")
            .env_remove("HANDOFF_CHANNEL")
            .env("HANDOFF_STAGING_DIR", self.staging())
            .env("HANDOFF_INSTALL_DIR", self.install())
            .env("HANDOFF_TARGET", "uri-target")
            .env("HANDOFF_SEARCH_PATH", "false");
        cmd
    }
}

fn is_empty_or_missing(dir: &Path) -> bool {
    fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(true)
}

#[test]
fn no_argument_is_usage_error() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("usage: uri-handoff <uri>"));
    assert!(is_empty_or_missing(&sandbox.staging()));
}

#[test]
fn two_arguments_is_usage_error() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["myapp:a", "myapp:b"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("got 2 arguments"));
    assert!(is_empty_or_missing(&sandbox.staging()));
}

#[test]
fn unknown_flag_is_usage_error() {
    Sandbox::new()
        .cmd()
        .args(["--bogus", "myapp:a"])
        .assert()
        .code(1);
}

#[test]
fn malformed_uri_exits_two_without_side_effects() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("not a uri ::")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid URI 'not a uri ::'"));
    assert!(is_empty_or_missing(&sandbox.staging()));
    assert!(is_empty_or_missing(&sandbox.install()));
}

#[test]
fn non_rfc3986_uri_exits_two() {
    let sandbox = Sandbox::new();
    for uri in ["myapp:a|b", "myapp:%zz", "myapp:"] {
        sandbox
            .cmd()
            .arg(uri)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid URI"));
    }
    assert!(is_empty_or_missing(&sandbox.staging()));
}

#[test]
fn version_flag_succeeds() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("uri-handoff"));
}

#[test]
fn broken_config_exits_two() {
    let sandbox = Sandbox::new();
    let config = sandbox.dir.path().join("handoff.toml");
    fs::write(&config, "[launch\n").unwrap();
    sandbox
        .cmd()
        .arg("--config")
        .arg(&config)
        .arg("myapp:x")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn config_path_is_read_from_environment() {
    let sandbox = Sandbox::new();
    let config = sandbox.dir.path().join("elsewhere.toml");
    fs::write(&config, "[launch\n").unwrap();
    sandbox
        .cmd()
        .env("HANDOFF_CONFIG", &config)
        .arg("myapp:x")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse config"));
    assert!(is_empty_or_missing(&sandbox.staging()));
}

// Without a native listener mechanism every invocation takes the launch path.
#[cfg(not(windows))]
#[test]
fn missing_target_executable_exits_two() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("myapp://open/1")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to launch new instance"));
    assert!(is_empty_or_missing(&sandbox.staging()));
}

#[cfg(unix)]
#[test]
fn launches_target_with_uri_when_no_instance_runs() {
    use std::os::unix::fs::PermissionsExt;
    use std::time::Instant;

    let sandbox = Sandbox::new();
    let out = sandbox.dir.path().join("received");
    let exe = sandbox.install().join("uri-target-beta");
    fs::write(
        &exe,
        format!("#!/bin/sh\nprintf '%s' \"$1\" > '{}'\n", out.display()),
    )
    .unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

    sandbox
        .cmd()
        .env("HANDOFF_CHANNEL", "beta")
        .arg("myapp://open/Zoë?tab=2")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(content) = fs::read_to_string(&out) {
            if !content.is_empty() {
                assert_eq!(content, "myapp://open/Zoë?tab=2");
                break;
            }
        }
        assert!(Instant::now() < deadline, "target never started");
        std::thread::sleep(Duration::from_millis(25));
    }
    assert!(is_empty_or_missing(&sandbox.staging()));
}
