//! Opsify MCP adapter library.
//!
//! Exposes the Opsify REST API (product releases, products and the CVE
//! database) as Model Context Protocol tools. Every tool is a typed
//! parameter struct implementing [`Adapter`]: the struct is validated from
//! the tool arguments, mapped onto one [`UpstreamRequest`], executed by the
//! [`OpsifyClient`] and the JSON result rendered back as text.
//!
//! # Quick Start
//!
//! ```no_run
//! use opsify_mcp::{Adapter, OpsifyClient, SpecificVersionParams, ToolParams};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> opsify_mcp::Result<()> {
//!     let client = OpsifyClient::new("your-api-key", "https://api.opsify.dev")?;
//!
//!     let arguments = json!({"product_name": "nginx", "version": "1.25.0"});
//!     let params = SpecificVersionParams::validate(
//!         arguments.as_object().cloned().unwrap_or_default(),
//!     )?;
//!     let release = params.run(&client).await?;
//!     println!("{release}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Hosts
//!
//! The [`mcp`] module serves the same adapters through two hosts: the
//! session host (all tools, SSE or stdio) and the stdio check host (CVE
//! search with a prompt).
//!
//! # Configuration
//!
//! [`Config`] is read from flags or the environment:
//!
//! - `OPSIFY_API_KEY` (required) - API key sent in the `apikey` header
//! - `OPSIFY_API_BASE_URL` (optional) - defaults to `https://api.opsify.dev`
//! - `TRANSPORT`, `HOST`, `PORT` - session host transport and bind address

mod client;
mod config;
mod error;
mod models;
mod output;
mod pagination;
mod request;
mod traits;

pub mod cli;
pub mod mcp;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{OpsifyClient, API_KEY_HEADER};
pub use config::{Config, ConfigArgs, Endpoints, Transport, DEFAULT_API_URL};
pub use error::{OpsifyError, Result};
pub use pagination::{PageQuery, WindowQuery, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use request::{query_pairs, segment, UpstreamRequest};

// Re-export traits
pub use traits::{Adapter, JsonObject, OutputStyle, ToolParams};

// Re-export models
pub use models::{
    // Release types
    AllLatestVersionsParams,
    AllVersionsParams,
    CreateVersionParams,
    DeleteVersionParams,
    LatestVersionParams,
    LoadVersionsParams,
    ReleaseDates,
    SearchReleasesParams,
    SpecificVersionParams,
    UpdateVersionParams,
    VersionCvesParams,
    VersionsParams,
    // Product types
    CreateProductParams,
    // CVE types
    Cve,
    SearchCveParams,
    // Field types
    DateField,
    DateParam,
    VersionString,
};

// Re-export rendering helpers
pub use output::{cve_count, render_cve_summary, to_pretty_json, PrettyPrint, NO_CVES_MESSAGE};
