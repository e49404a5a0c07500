//! CLI conformance tests: help output, config handling, exit codes.

mod common;

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

fn roverlink_command(config: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_roverlink"));
    command
        .arg("--config")
        .arg(config)
        .env_remove("ROVERLINK_HOST")
        .env_remove("ROVERLINK_PORT")
        .env_remove("ROVERLINK_RECONNECT_DELAY")
        .env("NO_COLOR", "1")
        .env("ROVERLINK_LOG", "off");
    command
}

fn roverlink(config: &Path, args: &[&str]) -> Output {
    roverlink_command(config)
        .args(args)
        .output()
        .expect("Failed to execute roverlink")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn help_lists_subcommands_and_global_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_roverlink"))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    for expected in ["run", "send", "config", "--host", "--port", "--reconnect-delay"] {
        assert!(text.contains(expected), "help should mention {expected}");
    }
}

#[test]
fn config_show_prints_defaults_and_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let output = roverlink(&path, &["config", "show"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("host = \"192.168.0.27\""));
    assert!(text.contains("port = 8765"));
    assert!(text.contains("reconnect_delay_secs = 5"));

    let output = roverlink(&path, &["--host", "rover.local", "--port", "9000", "config", "show"]);
    let text = stdout(&output);
    assert!(text.contains("host = \"rover.local\""));
    assert!(text.contains("port = 9000"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let output = roverlink(&path, &["--port", "9100", "config", "init"]);
    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("port = 9100"));

    let output = roverlink(&path, &["config", "init"]);
    assert!(!output.status.success());

    let output = roverlink(&path, &["--port", "9200", "config", "init", "--force"]);
    assert!(output.status.success());
    assert!(std::fs::read_to_string(&path).unwrap().contains("port = 9200"));
}

#[test]
fn invalid_port_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let output = roverlink(&path, &["--port", "0", "config", "show"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn send_to_unreachable_rover_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let endpoint = common::closed_endpoint();
    let port = endpoint.port().to_string();

    let output = roverlink(
        &path,
        &[
            "--host",
            "127.0.0.1",
            "--port",
            &port,
            "send",
            "forward",
            "--connect-wait",
            "1",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn run_skips_stdin_lines_that_are_not_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let port = common::closed_endpoint().port().to_string();

    let mut child = roverlink_command(&path)
        .args(["--host", "127.0.0.1", "--port", &port, "run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn roverlink");
    // Dropping stdin after the write closes it.
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"forward\n\xff\xfe\nstop\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    // Both readable lines were issued; the rover is unreachable so each is refused.
    assert_eq!(text.matches("Not connected!").count(), 2, "{text}");
    assert!(text.contains("happy"));
    assert!(text.contains("normal"));
}

#[cfg(unix)]
#[test]
fn interrupt_ends_run_while_stdin_is_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let port = common::closed_endpoint().port().to_string();

    let mut child = roverlink_command(&path)
        .args(["--host", "127.0.0.1", "--port", &port, "run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn roverlink");
    let _stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let mut line = String::new();
    while !line.contains("ws://") {
        line.clear();
        assert!(stdout.read_line(&mut line).unwrap() > 0, "stdout closed early");
    }
    std::thread::sleep(Duration::from_millis(500));

    let kill = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(kill.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("roverlink still running 5s after SIGINT");
        }
        std::thread::sleep(Duration::from_millis(50));
    };
    assert!(status.success());
}
