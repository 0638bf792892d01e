#![allow(clippy::unwrap_used)]
// Integration tests for `HrClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hrsync_api::{Error, HrClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HrClient) {
    let server = MockServer::start().await;
    let client = HrClient::from_reqwest(&format!("{}/api/", server.uri()), reqwest::Client::new())
        .unwrap();
    (server, client)
}

// ── Requests ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_returns_raw_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&server)
        .await;

    let raw = client.get("employees").await.unwrap();
    assert_eq!(raw, json!([{ "id": 1 }]));
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/departments/3"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    client.set_token(Some("s3cret".to_string().into()));
    let raw = client.get("/departments/3").await.unwrap();
    assert_eq!(raw["id"], 3);
}

#[tokio::test]
async fn test_put_plain_text_confirmation() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/attendances/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let raw = client.put("attendances/9", &json!({ "notes": "x" })).await.unwrap();
    assert_eq!(raw, json!("OK"));
}

#[tokio::test]
async fn test_delete_empty_body_is_null() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/employees/2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let raw = client.delete("employees/2").await.unwrap();
    assert!(raw.is_null());
}

#[tokio::test]
async fn test_query_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/attendances/date-range"))
        .and(query_param("startDate", "2025-11-26"))
        .and(query_param("endDate", "2025-11-27"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client
        .get_with_params(
            "attendances/date-range",
            &[
                ("startDate", "2025-11-26".to_owned()),
                ("endDate", "2025-11-27".to_owned()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(raw, json!([]));
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_message_from_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/departments"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "code already used" })),
        )
        .mount(&server)
        .await;

    let err = client.post("departments", &json!({})).await.unwrap_err();
    match err {
        Error::Http {
            status, message, ..
        } => {
            assert_eq!(status, 409);
            assert_eq!(message, "code already used");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_title_fallback() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/employees/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "title": "Not Found",
            "status": 404
        })))
        .mount(&server)
        .await;

    let err = client.get("employees/77").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Not Found"));
}

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get("employees").await;
    assert!(
        matches!(result, Err(Error::Unauthorized)),
        "expected Unauthorized, got: {result:?}"
    );
}

// ── Health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_ok() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Healthy"))
        .mount(&server)
        .await;

    client.check_health().await.unwrap();
}

#[tokio::test]
async fn test_health_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client.check_health().await;
    assert!(matches!(result, Err(Error::Unhealthy { status: 503 })));
}

#[tokio::test]
async fn test_health_timeout_is_bounded() {
    let (server, client) = setup().await;
    let client = client.with_health_timeout(Duration::from_millis(100));

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let result = client.check_health().await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_normalizes_candidate() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/other/health"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let url = client
        .test_connection(&format!("  {}/other//", server.uri()))
        .await
        .unwrap();
    assert_eq!(url.path(), "/other");
    // The client's own address is untouched.
    assert_eq!(client.base_url().path(), "/api");
}

// ── File transfer ───────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_multipart() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/employees/import"))
        .and(body_string_contains("filename=\"staff.xlsx\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "imported": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client
        .upload("employees/import", "staff.xlsx", b"binary".to_vec())
        .await
        .unwrap();
    assert_eq!(raw["imported"], 2);
}

#[tokio::test]
async fn test_download_binary() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/departments/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04]))
        .mount(&server)
        .await;

    let bytes = client.download("departments/export").await.unwrap();
    assert_eq!(&bytes[..], &[0x50, 0x4b, 0x03, 0x04]);
}
