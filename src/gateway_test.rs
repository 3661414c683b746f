use super::*;
use crate::storage::MemoryStorage;
use crate::test_support::{StubBody, StubRoute, StubServer, gateway, unreachable_base_url};
use serde_json::json;

// =============================================================================
// pure helpers
// =============================================================================

#[test]
fn join_url_handles_leading_slash_and_query() {
    assert_eq!(join_url("http://h/api", "/auth/me"), "http://h/api/auth/me");
    assert_eq!(join_url("http://h/api", "health"), "http://h/api/health");
    assert_eq!(join_url("http://h/api", "?user_id=1"), "http://h/api?user_id=1");
    assert_eq!(join_url("http://h/api", ""), "http://h/api");
}

#[test]
fn headers_without_token_have_no_authorization() {
    let headers = request_headers(None).unwrap();
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    assert!(headers.get(AUTHORIZATION).is_none());
}

#[test]
fn headers_with_token_carry_bearer() {
    let headers = request_headers(Some("T1")).unwrap();
    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer T1");
    assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
}

#[test]
fn headers_reject_token_with_newline() {
    assert!(matches!(request_headers(Some("bad\ntoken")), Err(ApiError::Config(_))));
}

#[test]
fn error_from_body_uses_server_message() {
    let err = error_from_body(401, br#"{"error":"invalid credentials"}"#);
    assert_eq!(err.to_string(), "invalid credentials");
    assert_eq!(err.status(), Some(401));
}

#[test]
fn error_from_body_falls_back_to_status() {
    assert_eq!(error_from_body(500, b"").to_string(), "HTTP 500");
    assert_eq!(error_from_body(502, b"<html>bad gateway</html>").to_string(), "HTTP 502");
    assert_eq!(error_from_body(400, br#"{"message":"nope"}"#).to_string(), "HTTP 400");
    assert_eq!(error_from_body(400, br#"{"error":""}"#).to_string(), "HTTP 400");
    assert_eq!(error_from_body(400, br#"{"error":{"code":1}}"#).to_string(), "HTTP 400");
}

#[test]
fn parse_success_body_treats_empty_as_null() {
    let value: Value = parse_success_body(b"").unwrap();
    assert!(value.is_null());
    let (): () = parse_success_body(b"  \n").unwrap();
}

#[test]
fn parse_success_body_rejects_malformed_json() {
    let err = parse_success_body::<Value>(b"{not json").unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =============================================================================
// token state
// =============================================================================

#[test]
fn new_loads_stored_token() {
    let (gw, _) = gateway("http://127.0.0.1:1/api", Some("T0"));
    assert_eq!(gw.token().as_deref(), Some("T0"));
}

#[test]
fn new_ignores_empty_stored_token() {
    let (gw, _) = gateway("http://127.0.0.1:1/api", Some(""));
    assert_eq!(gw.token(), None);
}

#[test]
fn set_token_persists_and_erases() {
    let (gw, storage) = gateway("http://127.0.0.1:1/api", None);

    gw.set_token(Some("T1")).unwrap();
    assert_eq!(gw.token().as_deref(), Some("T1"));
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
    assert_eq!(gw.stored_token().unwrap().as_deref(), Some("T1"));

    gw.set_token(None).unwrap();
    assert_eq!(gw.token(), None);
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
}

#[test]
fn set_token_empty_string_erases() {
    let (gw, storage) = gateway("http://127.0.0.1:1/api", Some("T0"));
    gw.set_token(Some("")).unwrap();
    assert_eq!(gw.token(), None);
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
}

#[test]
fn url_joins_against_base() {
    let storage = Arc::new(MemoryStorage::new());
    let gw = ApiGateway::new(&ClientConfig::new("http://localhost:5000/api/"), storage).unwrap();
    assert_eq!(gw.base_url(), "http://localhost:5000/api");
    assert_eq!(gw.url("/projects/3"), "http://localhost:5000/api/projects/3");
}

// =============================================================================
// request pipeline
// =============================================================================

#[tokio::test]
async fn request_without_token_sends_no_authorization() {
    let server = StubServer::start(vec![StubRoute::json(Method::GET, "/health", 200, json!({ "status": "ok" }))]).await;
    let (gw, _) = gateway(&server.base_url, None);

    let body: Value = gw.get("/health").await.unwrap();
    assert_eq!(body["status"], "ok");

    let hits = server.hits();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].authorization, None);
    assert_eq!(hits[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn request_with_token_sends_bearer() {
    let server = StubServer::start(vec![StubRoute::json(Method::GET, "/auth/me", 200, json!({ "id": 1 }))]).await;
    let (gw, _) = gateway(&server.base_url, Some("T1"));

    let _: Value = gw.get("/auth/me").await.unwrap();
    assert_eq!(server.hits()[0].authorization.as_deref(), Some("Bearer T1"));
}

#[tokio::test]
async fn clearing_token_stops_authorization_header() {
    let server = StubServer::start(vec![StubRoute::json(Method::GET, "/health", 200, json!({}))]).await;
    let (gw, _) = gateway(&server.base_url, Some("T1"));

    let _: Value = gw.get("/health").await.unwrap();
    gw.set_token(None).unwrap();
    let _: Value = gw.get("/health").await.unwrap();

    let hits = server.hits();
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer T1"));
    assert_eq!(hits[1].authorization, None);
}

#[tokio::test]
async fn post_sends_json_body() {
    let server = StubServer::start(vec![StubRoute::json(Method::POST, "/projects", 201, json!({ "id": 5 }))]).await;
    let (gw, _) = gateway(&server.base_url, None);

    let created: Value = gw.post("/projects", &json!({ "name": "Launch" })).await.unwrap();
    assert_eq!(created["id"], 5);

    let hit = &server.hits()[0];
    assert_eq!(hit.method, Method::POST);
    assert_eq!(serde_json::from_str::<Value>(&hit.body).unwrap(), json!({ "name": "Launch" }));
}

#[tokio::test]
async fn rejected_request_carries_server_message() {
    let server = StubServer::start(vec![StubRoute::json(
        Method::POST,
        "/auth/login",
        401,
        json!({ "error": "invalid credentials" }),
    )])
    .await;
    let (gw, _) = gateway(&server.base_url, None);

    let err = gw.post::<Value, _>("/auth/login", &json!({})).await.unwrap_err();
    assert_eq!(err.to_string(), "invalid credentials");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn rejected_request_without_json_falls_back_to_status() {
    let server =
        StubServer::start(vec![StubRoute::new(Method::GET, "/health", 503, StubBody::Raw("maintenance"))]).await;
    let (gw, _) = gateway(&server.base_url, None);

    let err = gw.get::<Value>("/health").await.unwrap_err();
    assert_eq!(err, ApiError::Status { status: 503, message: "HTTP 503".to_owned() });
}

#[tokio::test]
async fn empty_success_body_decodes_as_unit() {
    let server = StubServer::start(vec![StubRoute::new(Method::DELETE, "/tasks/9", 204, StubBody::Empty)]).await;
    let (gw, _) = gateway(&server.base_url, None);

    gw.delete::<()>("/tasks/9").await.unwrap();
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let server = StubServer::start(vec![StubRoute::new(Method::GET, "/health", 200, StubBody::Raw("{oops"))]).await;
    let (gw, _) = gateway(&server.base_url, None);

    let err = gw.get::<Value>("/health").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn invalid_token_fails_before_any_request_is_sent() {
    let server = StubServer::start(vec![StubRoute::json(Method::GET, "/health", 200, json!({}))]).await;
    let (gw, _) = gateway(&server.base_url, Some("bad\ntoken"));

    let err = gw.get::<Value>("/health").await.unwrap_err();
    assert!(matches!(err, ApiError::Config(_)), "got {err:?}");
    assert!(server.hits().is_empty());
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let base = unreachable_base_url().await;
    let (gw, _) = gateway(&base, Some("T1"));

    let err = gw.get::<Value>("/health").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert_eq!(gw.token().as_deref(), Some("T1"));
}

#[test]
fn set_token_keeps_old_token_when_storage_refuses_write() {
    let storage = Arc::new(crate::test_support::ReadOnlyStorage { token: Some("T0".into()) });
    let gw = ApiGateway::new(&ClientConfig::new("http://127.0.0.1:1/api"), storage).unwrap();

    assert!(matches!(gw.set_token(Some("T1")), Err(ApiError::Storage(_))));
    assert_eq!(gw.token().as_deref(), Some("T0"));
}

#[test]
fn erasing_token_clears_memory_even_when_storage_refuses() {
    let storage = Arc::new(crate::test_support::ReadOnlyStorage { token: Some("T0".into()) });
    let gw = ApiGateway::new(&ClientConfig::new("http://127.0.0.1:1/api"), storage).unwrap();

    assert!(gw.set_token(None).is_err());
    assert_eq!(gw.token(), None);
}
