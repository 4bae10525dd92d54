//! Mock Opsify API server.
//!
//! Provides an axum-based HTTP server that simulates the Opsify API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

/// A mock Opsify API server for testing.
///
/// The server runs in the background and can be used to test the client and
/// both MCP hosts against a stateful API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating an `OpsifyClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();
        state.releases = scenario.releases;
        for product in scenario.products {
            state.products.insert(product.name.clone(), product);
        }
        state.cves = scenario.cves;
        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Release routes
            .route(
                "/checks/release",
                get(handlers::list_releases).post(handlers::create_release),
            )
            .route("/checks/release/latest", get(handlers::list_latest_releases))
            .route("/checks/release/search", get(handlers::search_releases))
            .route("/checks/release/load", post(handlers::load_releases))
            .route("/checks/release/:product", get(handlers::get_product_versions))
            .route(
                "/checks/release/:product/latest",
                get(handlers::get_latest_version),
            )
            .route(
                "/checks/release/:product/:version",
                get(handlers::get_version)
                    .put(handlers::update_release)
                    .delete(handlers::delete_release),
            )
            .route(
                "/checks/release/:product/:version/cves",
                get(handlers::get_version_cves),
            )
            // Product routes
            .route("/checks/product", post(handlers::create_product))
            // CVE routes
            .route("/checks/cve/search", get(handlers::search_cves))
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
