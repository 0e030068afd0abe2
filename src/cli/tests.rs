//! Unit tests for CLI commands

use crate::cli::{format_routes, Cli, Commands};
use crate::config::FailurePolicy;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

fn serve_args(args: &[&str]) -> crate::cli::ServeArgs {
    let mut argv = vec!["brrtcrud", "serve"];
    argv.extend_from_slice(args);
    match Cli::try_parse_from(argv).unwrap().command {
        Commands::Serve(args) => args,
        other => panic!("Expected Serve command, got {other:?}"),
    }
}

#[test]
fn test_serve_defaults() {
    let config = serve_args(&[]).resolve().unwrap();
    assert_eq!(config.port, 8081);
    assert_eq!(config.api_prefix, "/api/");
    assert!(!config.demo.enabled);
    assert_eq!(config.failure_policy, FailurePolicy::Strict);
}

#[test]
fn test_serve_flags_override() {
    let config = serve_args(&[
        "--host",
        "127.0.0.1",
        "--port",
        "9090",
        "--resource",
        "notes=seed/notes.json",
        "--resource",
        "tags",
        "--api-prefix",
        "rest",
        "--demo",
        "--demo-interval-secs",
        "10",
        "--result-timeout-ms",
        "250",
        "--lenient-errors",
    ])
    .resolve()
    .unwrap();

    assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    assert_eq!(config.api_prefix, "/rest/");
    assert_eq!(config.resources.len(), 2);
    assert_eq!(
        config.resources.get("notes"),
        Some(&Some(PathBuf::from("seed/notes.json")))
    );
    assert_eq!(config.resources.get("tags"), Some(&None));
    assert!(config.demo.enabled);
    assert_eq!(config.demo.interval_secs, 10);
    assert_eq!(config.result_timeout_ms, 250);
    assert_eq!(config.failure_policy, FailurePolicy::Lenient);
}

#[test]
fn test_demo_accepts_explicit_value() {
    assert_eq!(serve_args(&["--demo=true"]).demo, Some(true));
    assert_eq!(serve_args(&["--demo=false"]).demo, Some(false));
    assert_eq!(serve_args(&[]).demo, None);
}

#[test]
fn test_flags_override_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port: 7000\nhost: 10.0.0.1").unwrap();
    let path = file.path().to_string_lossy().into_owned();
    let config = serve_args(&["--config", &path, "--port", "7001"])
        .resolve()
        .unwrap();
    assert_eq!(config.bind_addr(), "10.0.0.1:7001");
}

#[test]
fn test_invalid_resource_arg_rejected() {
    assert!(Cli::try_parse_from(["brrtcrud", "serve", "--resource", "=x"]).is_err());
}

#[test]
fn test_routes_command() {
    let cli = Cli::try_parse_from(["brrtcrud", "routes", "--resource", "persons"]).unwrap();
    let Commands::Routes(args) = cli.command else {
        panic!("Expected Routes command");
    };
    let lines = format_routes(&args.resolve().unwrap());
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("GET"));
    assert!(lines[0].contains("/api/persons "));
    assert!(lines[3].contains("/api/persons/{id}"));
    assert!(lines[4].ends_with("delete"));
}
