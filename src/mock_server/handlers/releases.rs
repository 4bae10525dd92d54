//! Release endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{authorize, error, paginate, SharedState};
use crate::mock_server::state::{ReleaseFilter, ReleaseRecord};

/// Optional vendor filter on lookups by product.
#[derive(Debug, Default, Deserialize)]
pub struct VendorQuery {
    pub vendor: Option<String>,
}

/// The four mutable date columns.
#[derive(Debug, Deserialize)]
pub struct ReleaseDatesBody {
    pub release_date: String,
    pub active_support_end_date: String,
    pub security_support_end_date: String,
    pub eol_date: String,
}

fn not_found(product: &str, version: Option<&str>) -> Response {
    match version {
        Some(version) => error(
            StatusCode::NOT_FOUND,
            format!("Version {version} of product {product} not found"),
        ),
        None => error(
            StatusCode::NOT_FOUND,
            format!("Product {product} not found"),
        ),
    }
}

/// GET /checks/release
pub async fn list_releases(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<ReleaseFilter>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let releases = state.search_releases(&query);
    Json(paginate(&releases, query.page, query.page_size)).into_response()
}

/// GET /checks/release/latest
pub async fn list_latest_releases(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<ReleaseFilter>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let releases = state.latest_per_product(&query);
    Json(paginate(&releases, query.page, query.page_size)).into_response()
}

/// GET /checks/release/search
pub async fn search_releases(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<ReleaseFilter>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let releases = state.search_releases(&query);
    Json(paginate(&releases, query.page, query.page_size)).into_response()
}

/// GET /checks/release/{product}
pub async fn get_product_versions(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(product): Path<String>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let versions: Vec<ReleaseRecord> = state
        .versions(&product, None)
        .into_iter()
        .cloned()
        .collect();
    if versions.is_empty() {
        return not_found(&product, None);
    }
    Json(versions).into_response()
}

/// GET /checks/release/{product}/latest
pub async fn get_latest_version(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(product): Path<String>,
    Query(query): Query<VendorQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    match state.latest(&product, query.vendor.as_deref()) {
        Some(release) => Json(release.clone()).into_response(),
        None => not_found(&product, None),
    }
}

/// GET /checks/release/{product}/{version}
pub async fn get_version(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((product, version)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    match state.release(&product, &version) {
        Some(release) => Json(release.clone()).into_response(),
        None => not_found(&product, Some(&version)),
    }
}

/// GET /checks/release/{product}/{version}/cves
pub async fn get_version_cves(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((product, version)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    if state.release(&product, &version).is_none() {
        return not_found(&product, Some(&version));
    }
    let cves: Vec<_> = state
        .cves
        .iter()
        .filter(|c| {
            c.product_name.as_deref() == Some(product.as_str())
                && c.product_version.as_deref() == Some(version.as_str())
        })
        .cloned()
        .collect();
    Json(json!({
        "product_name": product,
        "version": version,
        "cves": cves,
    }))
    .into_response()
}

/// POST /checks/release
pub async fn create_release(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(release): Json<ReleaseRecord>,
) -> Response {
    let mut state = state.write().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let created = release.clone();
    if !state.insert_release(release) {
        return error(
            StatusCode::CONFLICT,
            format!(
                "Version {} of product {} already exists",
                created.version, created.product_name
            ),
        );
    }
    (StatusCode::CREATED, Json(created)).into_response()
}

/// PUT /checks/release/{product}/{version}
pub async fn update_release(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((product, version)): Path<(String, String)>,
    Json(dates): Json<ReleaseDatesBody>,
) -> Response {
    let mut state = state.write().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let dates = ReleaseRecord {
        product_name: product.clone(),
        version: version.clone(),
        vendor: None,
        release_date: Some(dates.release_date),
        active_support_end_date: Some(dates.active_support_end_date),
        security_support_end_date: Some(dates.security_support_end_date),
        eol_date: Some(dates.eol_date),
    };
    match state.update_release(&product, &version, dates) {
        Some(release) => Json(release.clone()).into_response(),
        None => not_found(&product, Some(&version)),
    }
}

/// DELETE /checks/release/{product}/{version}
pub async fn delete_release(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((product, version)): Path<(String, String)>,
) -> Response {
    let mut state = state.write().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    if state.delete_release(&product, &version) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(&product, Some(&version))
    }
}

/// POST /checks/release/load
///
/// Accepts an array, a single release object, or `{"releases": [...]}`.
pub async fn load_releases(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("releases") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "releases must be an array",
                )
            }
            None => vec![Value::Object(map)],
        },
        _ => {
            return error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "expected an array or object",
            )
        }
    };

    let mut created = 0usize;
    let mut skipped = 0usize;
    for item in items {
        let release: ReleaseRecord = match serde_json::from_value(item) {
            Ok(release) => release,
            Err(e) => return error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        };
        if state.insert_release(release) {
            created += 1;
        } else {
            skipped += 1;
        }
    }

    Json(json!({ "created": created, "skipped": skipped })).into_response()
}
