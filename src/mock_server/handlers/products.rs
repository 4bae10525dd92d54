//! Product endpoint handlers.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{authorize, error, SharedState};
use crate::mock_server::state::VendorRecord;

/// Body of POST /checks/product.
#[derive(Debug, Deserialize)]
pub struct CreateProductBody {
    pub name: String,
    #[serde(default)]
    pub release_url: Option<String>,
    #[serde(default)]
    pub vendor: Option<VendorRecord>,
}

/// POST /checks/product
///
/// A vendor with an empty name means "no vendor".
pub async fn create_product(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<CreateProductBody>,
) -> Response {
    let mut state = state.write().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let vendor = body.vendor.filter(|v| !v.name.is_empty());
    match state.create_product(&body.name, body.release_url, vendor) {
        Some(product) => (StatusCode::CREATED, Json(product.clone())).into_response(),
        None => error(
            StatusCode::CONFLICT,
            format!("Product {} already exists", body.name),
        ),
    }
}
