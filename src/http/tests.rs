//! Tests for the HTTP module

use super::*;
use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::types::Method;
use serde_json::json;
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = ClientConfig::builder()
        .base_url(format!("{}/v2", server.uri()))
        .build();
    HttpClient::new(&config, Credentials::token("test-token")).unwrap()
}

fn response(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse { status, body }
}

// ============================================================================
// RequestConfig / ApiResponse
// ============================================================================

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("page", "1")
        .query("per_page", "20")
        .json(json!({"name": "x"}));

    assert_eq!(
        config.query,
        vec![
            ("page".to_string(), "1".to_string()),
            ("per_page".to_string(), "20".to_string())
        ]
    );
    assert_eq!(config.body, Some(json!({"name": "x"})));
}

#[test]
fn test_api_response_from_text() {
    assert_eq!(ApiResponse::from_text(204, "").body, serde_json::Value::Null);
    assert_eq!(ApiResponse::from_text(200, r#"{"a":1}"#).body, json!({"a": 1}));
    assert_eq!(
        ApiResponse::from_text(500, "upstream exploded").body,
        json!("upstream exploded")
    );
    assert!(ApiResponse::from_text(201, "").is_success());
    assert!(!ApiResponse::from_text(404, "").is_success());
}

#[test]
fn test_http_client_rejects_bad_base_url() {
    let config = ClientConfig::builder().base_url("::nope::").build();
    let result = HttpClient::new(&config, Credentials::token("t"));
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

// ============================================================================
// Classifier
// ============================================================================

#[test_case(Method::GET, 200 ; "get ok")]
#[test_case(Method::POST, 201 ; "post created")]
#[test_case(Method::POST, 202 ; "post accepted")]
#[test_case(Method::PUT, 204 ; "put no content")]
#[test_case(Method::PUT, 200 ; "put ok")]
fn test_classify_success(method: Method, status: u16) {
    let body = classify(method, response(status, json!({"ok": true}))).unwrap();
    assert_eq!(body, json!({"ok": true}));
}

#[test_case(Method::GET, 400)]
#[test_case(Method::GET, 422)]
#[test_case(Method::POST, 400)]
#[test_case(Method::POST, 409)]
#[test_case(Method::POST, 429)]
#[test_case(Method::PUT, 422)]
#[test_case(Method::DELETE, 400)]
fn test_classify_client_errors(method: Method, status: u16) {
    let err = classify(method, response(status, json!({"id": "bad", "message": "nope"})))
        .unwrap_err();
    match err {
        Error::ClientRequest {
            status: Some(s),
            message,
        } => {
            assert_eq!(s, status);
            assert_eq!(message, "nope");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_classify_conflict_on_get_is_unexpected() {
    let err = classify(Method::GET, response(409, json!({"message": "conflict"}))).unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 409, .. }));
}

#[test_case(Method::GET)]
#[test_case(Method::POST)]
#[test_case(Method::PUT)]
#[test_case(Method::DELETE)]
fn test_classify_forbidden(method: Method) {
    let err = classify(method, response(403, json!({"message": "denied"}))).unwrap_err();
    assert!(matches!(err, Error::Forbidden { ref message } if message == "denied"));
}

#[test_case(Method::GET)]
#[test_case(Method::POST)]
#[test_case(Method::PUT)]
fn test_classify_not_found(method: Method) {
    let err = classify(method, response(404, json!({"message": "missing"}))).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_classify_delete_not_found_is_deleted() {
    let gone = classify(Method::DELETE, response(404, json!({"message": "missing"}))).unwrap();
    let removed = classify(Method::DELETE, response(204, serde_json::Value::Null)).unwrap();
    assert_eq!(gone, json!({"status": "deleted"}));
    assert_eq!(gone, removed);
}

#[test_case(500)]
#[test_case(503)]
fn test_classify_server_error(status: u16) {
    let err = classify(Method::GET, response(status, json!({"message": "boom"}))).unwrap_err();
    assert!(matches!(err, Error::Server { status: s, .. } if s == status));
}

#[test]
fn test_classify_unauthorized_falls_through() {
    let err = classify(Method::GET, response(401, json!({"message": "bad token"}))).unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 401, ref body } if body == "bad token"));
}

#[test]
fn test_error_message_fallbacks() {
    assert_eq!(error_message(&json!({"message": "m"}), 400), "m");
    assert_eq!(error_message(&json!("plain text"), 400), "plain text");
    assert_eq!(error_message(&serde_json::Value::Null, 404), "Not Found");
    assert_eq!(error_message(&json!({"error": 1}), 400), r#"{"error":1}"#);
}

// ============================================================================
// Client against a mock server
// ============================================================================

#[tokio::test]
async fn test_get_attaches_bearer_and_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"droplets": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let res = client
        .get(
            "droplets",
            vec![
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "5".to_string()),
            ],
        )
        .await
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"droplets": []}));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/tags"))
        .and(body_json(json!({"name": "web"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"tag": {"name": "web"}})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let res = client
        .post("tags", json!({"name": "web"}), Vec::new())
        .await
        .unwrap();

    assert_eq!(res.status, 201);
    assert_eq!(res.body["tag"]["name"], "web");
}

#[tokio::test]
async fn test_put_and_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v2/firewalls/abc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let res = client
        .put("firewalls/abc", json!({"name": "fw"}), Vec::new())
        .await
        .unwrap();

    assert_eq!(res.status, 204);
    assert_eq!(res.body, serde_json::Value::Null);
}

#[tokio::test]
async fn test_delete_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/firewalls/abc/droplets"))
        .and(body_json(json!({"droplet_ids": [1, 2]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let res = client
        .delete(
            "firewalls/abc/droplets",
            Some(json!({"droplet_ids": [1, 2]})),
            Vec::new(),
        )
        .await
        .unwrap();
    assert_eq!(res.status, 204);
}

#[tokio::test]
async fn test_head_request() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/v2/account"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let res = client.head("account", Vec::new()).await.unwrap();
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn test_get_bytes_raw_download() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/kubernetes/clusters/k1/kubeconfig"))
        .respond_with(ResponseTemplate::new(200).set_body_string("apiVersion: v1\n"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (status, bytes) = client
        .get_bytes("kubernetes/clusters/k1/kubeconfig", Vec::new())
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(&bytes[..], b"apiVersion: v1\n");
}

#[tokio::test]
async fn test_absolute_url_bypasses_base() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let res = client
        .get(&format!("{}/elsewhere", server.uri()), Vec::new())
        .await
        .unwrap();
    assert_eq!(res.body["ok"], 1);
}
