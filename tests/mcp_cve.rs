//! Tests for CVE search in both hosts.

use opsify_mcp::mcp::OpsifyServer;
use opsify_mcp::{JsonObject, OpsifyClient};
use rmcp::model::{CallToolResult, ErrorCode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn args(value: Value) -> Option<JsonObject> {
    value.as_object().cloned()
}

fn extract_text(result: &CallToolResult) -> &str {
    result.content[0]
        .raw
        .as_text()
        .expect("Expected text content")
        .text
        .as_str()
}

fn client(mock_server: &MockServer) -> OpsifyClient {
    OpsifyClient::new("test-key", &mock_server.uri()).unwrap()
}

fn sample_cves() -> Value {
    json!([
        {
            "cve_id": "CVE-2024-7347",
            "title": "mp4 module buffer over-read",
            "score": 4.7,
            "state": "PUBLISHED",
            "published_date": "2024-08-14",
            "vendor": "F5",
            "description": "A buffer over-read in the mp4 module.",
            "references": ["https://nginx.org/en/security_advisories.html"]
        },
        {
            "cve_id": "CVE-2024-24989",
            "title": "HTTP/3 QUIC null pointer dereference",
            "score": 7.5,
            "state": "PUBLISHED"
        }
    ])
}

#[tokio::test]
async fn test_search_cve_query_defaults_and_omissions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/cve/search"))
        .and(query_param("product_name", "nginx"))
        .and(query_param("product_version", "1.25.0"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("cve_id"))
        .and(query_param_is_missing("score"))
        .and(query_param_is_missing("severity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_cves()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = OpsifyServer::session(client(&mock_server), false);
    let result = server
        .dispatch(
            "search_cve",
            args(json!({"product_name": "nginx", "product_version": "1.25.0"})),
        )
        .await
        .unwrap();

    let value: Value = serde_json::from_str(extract_text(&result)).unwrap();
    assert_eq!(value, sample_cves());
}

#[tokio::test]
async fn test_search_cve_forwards_score_and_window() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/cve/search"))
        .and(query_param("score", "9.8"))
        .and(query_param("severity", "CRITICAL"))
        .and(query_param("skip", "10"))
        .and(query_param("limit", "5"))
        .and(query_param("from_date", "2024-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = OpsifyServer::session(client(&mock_server), false);
    server
        .dispatch(
            "search_cve",
            args(json!({
                "score": 9.8,
                "severity": "CRITICAL",
                "skip": 10,
                "limit": 5,
                "from_date": "2024-01-01T00:00:00Z"
            })),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_numeric_product_version_is_rejected_in_both_hosts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    for server in [
        OpsifyServer::session(client(&mock_server), false),
        OpsifyServer::check(client(&mock_server)),
    ] {
        let err = server
            .dispatch("search_cve", args(json!({"product_version": 1.25})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }
}

#[tokio::test]
async fn test_stdio_host_renders_summary() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/cve/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_cves()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = OpsifyServer::check(client(&mock_server));
    let result = server
        .dispatch("search_cve", args(json!({"product_name": "nginx"})))
        .await
        .unwrap();

    let expected = "Found 2 CVEs:\n\
        CVE ID: CVE-2024-7347\n\
        Title: mp4 module buffer over-read\n\
        Score: 4.7\n\
        State: PUBLISHED\n\
        Published: 2024-08-14\n\
        Vendor: F5\n\
        Description: A buffer over-read in the mp4 module.\n\
        References: https://nginx.org/en/security_advisories.html\n\
        \n\
        CVE ID: CVE-2024-24989\n\
        Title: HTTP/3 QUIC null pointer dereference\n\
        Score: 7.5\n\
        State: PUBLISHED\n\
        Published: N/A\n\
        Vendor: N/A\n\
        Description: N/A\n\
        References: N/A";
    assert_eq!(extract_text(&result), expected);
}

#[tokio::test]
async fn test_stdio_host_empty_result_sentinel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/cve/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = OpsifyServer::check(client(&mock_server));
    let result = server
        .dispatch("search_cve", args(json!({"cve_id": "CVE-1999-0001"})))
        .await
        .unwrap();

    assert_eq!(
        extract_text(&result),
        "No CVEs found for the given criteria."
    );
}

#[tokio::test]
async fn test_stdio_host_upstream_failure_is_internal_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/cve/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = OpsifyServer::check(client(&mock_server));
    let err = server
        .dispatch("search_cve", args(json!({"cve_id": "CVE-2024-1"})))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert!(err.message.contains("API Error 503: maintenance"));
}

#[tokio::test]
async fn test_session_host_upstream_failure_is_error_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checks/cve/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = OpsifyServer::session(client(&mock_server), false);
    let result = server
        .dispatch("search_cve", args(json!({"cve_id": "CVE-2024-1"})))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(extract_text(&result), "Error: API Error 503: maintenance");
}
