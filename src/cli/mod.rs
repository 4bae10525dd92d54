//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! opsify-mcp binary.

use clap::{ArgAction, Parser, Subcommand};

use crate::config::ConfigArgs;

/// Opsify MCP server and operator tools.
#[derive(Parser, Debug)]
#[command(name = "opsify-mcp", about = "MCP server for the Opsify API", version)]
pub struct Cli {
    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the session host with every tool over SSE or stdio.
    Serve {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Run the CVE check host on stdio.
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the advertised tool catalogue. Needs no credentials.
    Tools {
        /// Print JSON descriptors instead of a table.
        #[arg(long)]
        json: bool,

        /// Only the tools registered in read-only mode.
        #[arg(long)]
        read_only: bool,

        /// Only the tools of the CVE check host.
        #[arg(long, conflicts_with = "read_only")]
        cve_only: bool,
    },

    /// Call one tool and print its result.
    Call {
        /// Tool name, e.g. `get_latest_version`.
        tool: String,

        /// Tool arguments as a JSON object.
        #[arg(value_name = "ARGS_JSON", default_value = "{}")]
        arguments: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
}
