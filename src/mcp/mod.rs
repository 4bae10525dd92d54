//! MCP (Model Context Protocol) hosts and tool registry.
//!
//! Two hosts share one registry of adapters:
//!
//! - the session host advertises the full catalogue (or only read tools)
//!   over SSE or stdio, and reports upstream failures as tool results;
//! - the stdio check host advertises CVE search plus a matching prompt and
//!   turns upstream failures into protocol errors.
//!
//! # Example
//!
//! ```no_run
//! use opsify_mcp::mcp::OpsifyServer;
//!
//! # fn main() -> opsify_mcp::Result<()> {
//! let server = OpsifyServer::from_env()?;
//! // Server can now be used with rmcp transport
//! # Ok(())
//! # }
//! ```

mod host;
mod registry;
mod server;

pub use host::{format_session_id, new_session_id, serve_check, serve_session};
pub use registry::{ToolInfo, ToolRegistry};
pub use server::{HostKind, OpsifyServer};
