//! CVE endpoint handlers.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};

use super::{authorize, SharedState};
use crate::mock_server::state::{CveFilter, CveRecord};

/// GET /checks/cve/search
///
/// Returns a bare array, newest first.
pub async fn search_cves(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<CveFilter>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let mut found = state.search_cves(&query);
    found.sort_by(|a, b| b.published_date.cmp(&a.published_date));

    let cves: Vec<CveRecord> = found
        .into_iter()
        .skip(query.skip.unwrap_or(0))
        .take(query.limit.unwrap_or(100))
        .cloned()
        .collect();
    Json(cves).into_response()
}
