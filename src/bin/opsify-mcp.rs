//! Opsify MCP binary.
//!
//! Runs either MCP host, or inspects and calls tools from the command line.

use std::process::ExitCode;

use clap::Parser;
use opsify_mcp::cli::{Cli, Command};
use opsify_mcp::mcp::{serve_check, serve_session, ToolInfo, ToolRegistry};
use opsify_mcp::{ConfigArgs, JsonObject, OpsifyClient, OpsifyError, OutputStyle};
use serde_json::{json, Value};
use tabled::{Table, Tabled};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(log_level(cli.verbose, cli.quiet));

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Logs go to stderr so the stdio transport keeps stdout to itself.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command) -> opsify_mcp::Result<()> {
    match command {
        Command::Serve { config } => serve_session(config.validate()?).await,
        Command::Check { config } => serve_check(config.validate()?).await,
        Command::Tools {
            json,
            read_only,
            cve_only,
        } => {
            let registry = if cve_only {
                ToolRegistry::cve_only()
            } else {
                ToolRegistry::session(read_only)
            };
            print_tools(&registry.infos(), json)
        }
        Command::Call {
            tool,
            arguments,
            config,
        } => handle_call(&tool, &arguments, config).await,
    }
}

async fn handle_call(tool: &str, arguments: &str, config: ConfigArgs) -> opsify_mcp::Result<()> {
    let arguments = parse_arguments(arguments)?;
    let config = config.validate()?;
    let client = OpsifyClient::from_config(&config)?;
    let registry = ToolRegistry::session(config.read_only);

    let text = registry
        .call(&client, tool, arguments, OutputStyle::Json)
        .await?;
    println!("{text}");
    Ok(())
}

fn parse_arguments(raw: &str) -> opsify_mcp::Result<JsonObject> {
    match serde_json::from_str(raw).map_err(OpsifyError::InvalidJson)? {
        Value::Object(map) => Ok(map),
        other => Err(OpsifyError::InvalidParams(format!(
            "tool arguments must be a JSON object, got {other}"
        ))),
    }
}

fn print_tools(infos: &[ToolInfo], json: bool) -> opsify_mcp::Result<()> {
    if json {
        let descriptors: Vec<Value> = infos
            .iter()
            .map(|info| {
                json!({
                    "name": info.name,
                    "description": info.description,
                    "mutates": info.mutates,
                    "inputSchema": info.input_schema.as_ref(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&descriptors).map_err(OpsifyError::Decode)?
        );
    } else {
        let rows: Vec<ToolRow> = infos.iter().map(ToolRow::from).collect();
        println!("{}", Table::new(rows));
        println!("\n{} tools", infos.len());
    }
    Ok(())
}

// Table row type for non-JSON output

#[derive(Tabled)]
struct ToolRow {
    name: &'static str,
    access: &'static str,
    description: String,
}

impl From<&ToolInfo> for ToolRow {
    fn from(info: &ToolInfo) -> Self {
        Self {
            name: info.name,
            access: if info.mutates { "write" } else { "read" },
            description: info
                .description
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}
