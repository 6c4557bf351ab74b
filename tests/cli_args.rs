//! Integration tests for CLI argument handling
//!
//! Runs the built binary for flags that exit before any network access, and
//! parses arguments through the library for everything else.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_shrine-proxy"))
        .args(args)
        .env_remove("SHRINE_SOURCES")
        .env_remove("SHRINE_SNAPSHOT_FILE")
        .output()
        .expect("Failed to execute shrine-proxy")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("shrine-proxy"), "Help should mention shrine-proxy");
    assert!(stdout.contains("serve"), "Help should list the serve command");
    assert!(stdout.contains("fetch"), "Help should list the fetch command");
    assert!(stdout.contains("--sources"), "Help should mention --sources");
}

#[test]
fn test_serve_help_lists_server_flags() {
    let output = run_cli(&["serve", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--port"));
    assert!(stdout.contains("--strict"));
}

#[test]
fn test_invalid_log_level_prints_error_and_exits() {
    let output = run_cli(&["--log-level", "loud", "fetch"]);
    assert!(!output.status.success(), "Expected invalid log level to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("loud"), "Should name the rejected value: {}", stderr);
}

#[test]
fn test_fetch_with_unreachable_sources_fails() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let snapshot = dir.path().join("shrine.json");
    let output = run_cli(&[
        "--sources",
        "http://127.0.0.1:9/a,http://127.0.0.1:9/b",
        "--snapshot-file",
        snapshot.to_str().unwrap(),
        "fetch",
    ]);

    assert!(!output.status.success(), "Expected fetch to fail with no healthy source");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("all 2 sources failed"), "stderr: {}", stderr);
    assert!(!snapshot.exists(), "Nothing should be written on failure");
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use shrine_proxy::cli::{Cli, Command, ServeArgs};

    #[test]
    fn test_cli_no_args_serves() {
        let cli = Cli::parse_from(["shrine-proxy"]);
        assert!(matches!(cli.action(), Command::Serve(_)));
    }

    #[test]
    fn test_cli_fetch_subcommand() {
        let cli = Cli::parse_from(["shrine-proxy", "fetch"]);
        assert_eq!(cli.action(), Command::Fetch);
    }

    #[test]
    fn test_port_env_applies_with_and_without_serve_subcommand() {
        // No other test in this binary asserts on the port
        std::env::set_var("PORT", "8089");
        let bare = Cli::parse_from(["shrine-proxy"]);
        let explicit = Cli::parse_from(["shrine-proxy", "serve"]);
        std::env::remove_var("PORT");

        match (bare.action(), explicit.action()) {
            (Command::Serve(bare), Command::Serve(explicit)) => {
                assert_eq!(bare.port, 8089);
                assert_eq!(explicit.port, 8089);
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_cli_strict_serve() {
        let cli = Cli::parse_from(["shrine-proxy", "serve", "--strict"]);
        match cli.action() {
            Command::Serve(ServeArgs { strict, .. }) => assert!(strict),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
