//! CLI argument parsing tests.

use clap::Parser;
use opsify_mcp::cli::{Cli, Command};
use opsify_mcp::Transport;

#[test]
fn test_cli_parses_serve_with_flags() {
    let cli = Cli::parse_from([
        "opsify-mcp",
        "serve",
        "--api-key",
        "k",
        "--transport",
        "stdio",
        "--port",
        "9000",
        "--read-only",
    ]);

    assert_eq!(cli.verbose, 0);
    assert!(!cli.quiet);
    match cli.command {
        Command::Serve { config } => {
            assert_eq!(config.port, 9000);
            assert!(config.read_only);
            let config = config.validate().unwrap();
            assert_eq!(config.transport, Transport::Stdio);
            assert_eq!(config.api_key(), "k");
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_cli_serve_defaults() {
    for var in ["HOST", "SESSION_TIMEOUT", "SESSION_CLEANUP_INTERVAL"] {
        std::env::remove_var(var);
    }
    let cli = Cli::parse_from(["opsify-mcp", "serve", "--api-key", "k"]);

    match cli.command {
        Command::Serve { config } => {
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.session_timeout, 3600);
            assert_eq!(config.session_cleanup_interval, 300);
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_cli_negative_port_parses_then_fails_validation() {
    let cli = Cli::parse_from(["opsify-mcp", "serve", "--api-key", "k", "--port", "-1"]);

    match cli.command {
        Command::Serve { config } => {
            let err = config.validate().unwrap_err();
            assert_eq!(
                err.to_string(),
                "PORT must be a valid port number between 1 and 65535"
            );
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_cli_parses_check() {
    let cli = Cli::parse_from(["opsify-mcp", "-v", "check", "--api-key", "k"]);

    assert_eq!(cli.verbose, 1);
    assert!(matches!(cli.command, Command::Check { .. }));
}

#[test]
fn test_cli_parses_tools_flags() {
    let cli = Cli::parse_from(["opsify-mcp", "tools", "--json", "--read-only"]);

    match cli.command {
        Command::Tools {
            json,
            read_only,
            cve_only,
        } => {
            assert!(json);
            assert!(read_only);
            assert!(!cve_only);
        }
        _ => panic!("Expected Tools command"),
    }
}

#[test]
fn test_cli_tools_filters_conflict() {
    let result = Cli::try_parse_from(["opsify-mcp", "tools", "--read-only", "--cve-only"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_call_with_arguments() {
    let cli = Cli::parse_from([
        "opsify-mcp",
        "call",
        "get_latest_version",
        r#"{"product_name":"nginx"}"#,
        "--api-key",
        "k",
    ]);

    match cli.command {
        Command::Call {
            tool, arguments, ..
        } => {
            assert_eq!(tool, "get_latest_version");
            assert_eq!(arguments, r#"{"product_name":"nginx"}"#);
        }
        _ => panic!("Expected Call command"),
    }
}

#[test]
fn test_cli_call_arguments_default_to_empty_object() {
    let cli = Cli::parse_from(["opsify-mcp", "call", "get_all_latest_versions"]);

    match cli.command {
        Command::Call { arguments, .. } => assert_eq!(arguments, "{}"),
        _ => panic!("Expected Call command"),
    }
}

#[test]
fn test_cli_quiet_conflicts_with_verbose() {
    let result = Cli::try_parse_from(["opsify-mcp", "-q", "-v", "tools"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["opsify-mcp"]).is_err());
}
