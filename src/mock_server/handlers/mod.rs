//! HTTP request handlers for the mock server.

pub mod cves;
pub mod products;
pub mod releases;

pub use cves::*;
pub use products::*;
pub use releases::*;

use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;
use crate::API_KEY_HEADER;

/// State shared by every handler.
pub type SharedState = Arc<RwLock<MockState>>;

/// Paginated response envelope.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Slice one page out of `all`.
pub fn paginate<T: Clone>(all: &[&T], page: Option<u32>, page_size: Option<u32>) -> PageResponse<T> {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(100).max(1);

    let start = ((page - 1) as usize).saturating_mul(page_size as usize);
    let items = all
        .iter()
        .skip(start)
        .take(page_size as usize)
        .map(|item| (*item).clone())
        .collect();

    PageResponse {
        items,
        total: all.len() as u64,
        page,
        page_size,
    }
}

/// Reject requests without the configured API key.
pub fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if state.authorized(key) {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Invalid API key"))
    }
}

/// JSON error body in the upstream's `{"detail": ...}` shape.
pub fn error(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "detail": detail.into() })),
    )
        .into_response()
}
