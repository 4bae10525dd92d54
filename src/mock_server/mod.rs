//! Mock Opsify API server for E2E testing.
//!
//! An in-memory server that simulates the Opsify release, product and CVE
//! endpoints. Unlike wiremock, which mocks at the HTTP level per test, this
//! server keeps state across requests, so create/update/delete workflows can
//! be exercised end to end.
//!
//! # Example
//!
//! ```ignore
//! use opsify_mcp::mock_server::MockServer;
//! use opsify_mcp::mcp::OpsifyServer;
//! use opsify_mcp::OpsifyClient;
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = OpsifyClient::new("test-key", server.url()).unwrap();
//!     let mcp = OpsifyServer::session(client, false);
//!
//!     let result = mcp.dispatch("get_latest_version", args).await.unwrap();
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{CveFilter, CveRecord, MockState, ProductRecord, ReleaseFilter, ReleaseRecord, VendorRecord};
