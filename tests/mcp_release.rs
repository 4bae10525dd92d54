//! Tests for the release tools through the session host.
//!
//! Uses wiremock to mock the Opsify API and checks the exact upstream
//! request each tool produces.

use opsify_mcp::mcp::OpsifyServer;
use opsify_mcp::{JsonObject, OpsifyClient};
use rmcp::model::{CallToolResult, ErrorCode};
use serde_json::{json, Value};
use wiremock::matchers::{any, body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn args(value: Value) -> Option<JsonObject> {
    value.as_object().cloned()
}

/// Extract text from CallToolResult content.
fn extract_text(result: &CallToolResult) -> &str {
    let content = &result.content[0];
    content.raw.as_text().expect("Expected text content").text.as_str()
}

async fn session(mock_server: &MockServer) -> OpsifyServer {
    let client = OpsifyClient::new("test-key", &mock_server.uri()).unwrap();
    OpsifyServer::session(client, false)
}

#[tokio::test]
async fn test_get_specific_version_round_trips_json() {
    let mock_server = MockServer::start().await;
    let release = json!({"version": "1.2.3"});

    Mock::given(method("GET"))
        .and(path("/checks/release/nginx/1.2.3"))
        .and(header("apikey", "test-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&release))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let result = server
        .dispatch(
            "get_specific_version",
            args(json!({"product_name": "nginx", "version": "1.2.3"})),
        )
        .await
        .expect("dispatch should succeed");

    assert!(!result.is_error.unwrap_or(false));
    let text = extract_text(&result);
    assert_eq!(text, "{\n  \"version\": \"1.2.3\"\n}");
    assert_eq!(serde_json::from_str::<Value>(text).unwrap(), release);
}

#[tokio::test]
async fn test_version_string_is_not_normalised() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release/istio/1.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "1.10"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let result = server
        .dispatch(
            "get_specific_version",
            args(json!({"product_name": "istio", "version": "1.10"})),
        )
        .await
        .unwrap();

    assert!(extract_text(&result).contains("\"1.10\""));
}

#[tokio::test]
async fn test_numeric_version_is_rejected_before_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let err = server
        .dispatch(
            "get_specific_version",
            args(json!({"product_name": "istio", "version": 1.10})),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(err.message.contains("must be provided as a string"));
}

#[tokio::test]
async fn test_missing_required_argument_is_invalid_params() {
    let mock_server = MockServer::start().await;
    let server = session(&mock_server).await;

    let err = server
        .dispatch("get_version_cves", args(json!({"product_name": "nginx"})))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(err.message.contains("version"));
}

#[tokio::test]
async fn test_product_name_is_percent_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release/apache%20httpd/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "2.4.62"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let result = server
        .dispatch(
            "get_latest_version",
            args(json!({"product_name": "apache httpd"})),
        )
        .await
        .unwrap();

    assert!(extract_text(&result).contains("2.4.62"));
}

#[tokio::test]
async fn test_get_latest_version_vendor_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release/nginx/latest"))
        .and(query_param("vendor", "F5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "1.26.0"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/checks/release/nginx/latest"))
        .and(query_param_is_missing("vendor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "1.27.0"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;

    let with_vendor = server
        .dispatch(
            "get_latest_version",
            args(json!({"product_name": "nginx", "vendor": "F5"})),
        )
        .await
        .unwrap();
    assert!(extract_text(&with_vendor).contains("1.26.0"));

    let without_vendor = server
        .dispatch("get_latest_version", args(json!({"product_name": "nginx"})))
        .await
        .unwrap();
    assert!(extract_text(&without_vendor).contains("1.27.0"));

    // An empty vendor string is not sent.
    server
        .dispatch(
            "get_latest_version",
            args(json!({"product_name": "nginx", "vendor": ""})),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_versions_and_version_cves_paths() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release/nginx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"version": "1.0"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/checks/release/nginx/1.25.0/cves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cves": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;

    server
        .dispatch("get_versions", args(json!({"product_name": "nginx"})))
        .await
        .unwrap();
    let cves = server
        .dispatch(
            "get_version_cves",
            args(json!({"product_name": "nginx", "version": "1.25.0"})),
        )
        .await
        .unwrap();
    assert!(extract_text(&cves).contains("\"cves\""));
}

#[tokio::test]
async fn test_get_all_versions_pagination_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "100"))
        .and(query_param_is_missing("product_name"))
        .and(query_param_is_missing("vendor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    server.dispatch("get_all_versions", None).await.unwrap();
}

#[tokio::test]
async fn test_get_all_latest_versions_forwards_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release/latest"))
        .and(query_param("vendor", "F5"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    server
        .dispatch(
            "get_all_latest_versions",
            args(json!({"vendor": "F5", "page": 2, "page_size": 10})),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_search_releases_defaults_date_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release/search"))
        .and(query_param("product_name", "nginx"))
        .and(query_param("from_date", "2024-01-01"))
        .and(query_param("date_field", "release_date"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "100"))
        .and(query_param_is_missing("to_date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    server
        .dispatch(
            "search_releases",
            args(json!({"product_name": "nginx", "from_date": "2024-01-01"})),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_search_releases_rejects_bad_date_and_field() {
    let mock_server = MockServer::start().await;
    let server = session(&mock_server).await;

    for bad in [
        json!({"from_date": "01/02/2024"}),
        json!({"date_field": "created_at"}),
        json!({"page": -1}),
    ] {
        let err = server
            .dispatch("search_releases", args(bad.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS, "{bad}");
    }
}

#[tokio::test]
async fn test_create_version_sends_full_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/checks/release"))
        .and(body_json(json!({
            "product_name": "nginx",
            "version": "1.27.0",
            "release_date": "2024-05-29",
            "active_support_end_date": "2025-04-23",
            "security_support_end_date": "2025-04-23",
            "eol_date": "2025-04-23T00:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let result = server
        .dispatch(
            "create_version",
            args(json!({
                "product_name": "nginx",
                "version": "1.27.0",
                "release_date": "2024-05-29",
                "active_support_end_date": "2025-04-23",
                "security_support_end_date": "2025-04-23",
                "eol_date": "2025-04-23T00:00:00Z"
            })),
        )
        .await
        .unwrap();

    assert!(extract_text(&result).contains("42"));
}

#[tokio::test]
async fn test_update_version_sends_only_dates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/checks/release/nginx/1.27.0"))
        .and(body_json(json!({
            "release_date": "2024-05-29",
            "active_support_end_date": "2025-04-23",
            "security_support_end_date": "2025-04-23",
            "eol_date": "2025-04-23"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    server
        .dispatch(
            "update_version",
            args(json!({
                "product_name": "nginx",
                "version": "1.27.0",
                "release_date": "2024-05-29",
                "active_support_end_date": "2025-04-23",
                "security_support_end_date": "2025-04-23",
                "eol_date": "2025-04-23"
            })),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_version_reports_success_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/checks/release/nginx/1.0.0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let result = server
        .dispatch(
            "delete_version",
            args(json!({"product_name": "nginx", "version": "1.0.0"})),
        )
        .await
        .unwrap();

    let value: Value = serde_json::from_str(extract_text(&result)).unwrap();
    assert_eq!(
        value,
        json!({
            "status": "success",
            "message": "Version 1.0.0 of product nginx deleted successfully"
        })
    );
}

#[tokio::test]
async fn test_dot_segment_identifiers_never_reach_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    for tool in ["delete_version", "get_specific_version"] {
        for arguments in [
            json!({"product_name": "..", "version": "product"}),
            json!({"product_name": "nginx", "version": ".."}),
            json!({"product_name": ".", "version": "1.0.0"}),
        ] {
            let err = server
                .dispatch(tool, args(arguments.clone()))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::INVALID_PARAMS, "{tool} {arguments}");
            assert!(err.message.contains("must not be '.' or '..'"));
        }
    }
}

#[tokio::test]
async fn test_load_versions_forwards_each_shape_unchanged() {
    let release = json!({
        "product_name": "nginx",
        "version": "1.0",
        "release_date": "2020-01-01",
        "active_support_end_date": "2021-01-01",
        "security_support_end_date": "2021-01-01",
        "eol_date": "2021-01-01"
    });

    for payload in [
        json!([release.clone()]),
        release.clone(),
        json!({"releases": [release.clone()]}),
    ] {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/checks/release/load"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"created": 1})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let server = session(&mock_server).await;
        let result = server
            .dispatch(
                "load_versions",
                args(json!({"releases": payload.to_string()})),
            )
            .await
            .unwrap();
        assert!(!result.is_error.unwrap_or(false));
    }
}

#[tokio::test]
async fn test_load_versions_invalid_json_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let result = server
        .dispatch("load_versions", args(json!({"releases": "[{not json"})))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(extract_text(&result).starts_with("Error: Invalid JSON format - "));
}

#[tokio::test]
async fn test_upstream_404_is_reported_as_error_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release/nginx/9.9.9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Version not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let result = server
        .dispatch(
            "get_specific_version",
            args(json!({"product_name": "nginx", "version": "9.9.9"})),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(extract_text(&result), "Error: API Error 404: Version not found");
}

#[tokio::test]
async fn test_invalid_json_response_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/release/nginx"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = session(&mock_server).await;
    let result = server
        .dispatch("get_versions", args(json!({"product_name": "nginx"})))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(extract_text(&result).starts_with("Error: Invalid JSON response: "));
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    let client = OpsifyClient::new("test-key", "http://127.0.0.1:9").unwrap();
    let server = OpsifyServer::session(client, false);

    let result = server
        .dispatch("get_versions", args(json!({"product_name": "nginx"})))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(extract_text(&result).starts_with("Error: Network error: "));
}
