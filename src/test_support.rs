//! In-process stub of the Nexo REST API for async tests.
//!
//! Routes are matched on method + path (relative to `/api`, query ignored).
//! Every request is recorded, matched or not, so tests can assert on headers
//! and on whether a call happened at all.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::gateway::ApiGateway;
use crate::storage::{KeyValueStorage, MemoryStorage, TOKEN_KEY};

#[derive(Clone, Debug)]
pub(crate) enum StubBody {
    Json(Value),
    Raw(&'static str),
    Empty,
}

#[derive(Clone, Debug)]
pub(crate) struct StubRoute {
    method: Method,
    path: String,
    status: u16,
    body: StubBody,
}

impl StubRoute {
    pub(crate) fn new(method: Method, path: &str, status: u16, body: StubBody) -> Self {
        Self { method, path: path.to_owned(), status, body }
    }

    pub(crate) fn json(method: Method, path: &str, status: u16, body: Value) -> Self {
        Self::new(method, path, status, StubBody::Json(body))
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Hit {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct StubState {
    routes: Arc<Vec<StubRoute>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

pub(crate) struct StubServer {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl StubServer {
    pub(crate) async fn start(routes: Vec<StubRoute>) -> Self {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let state = StubState { routes: Arc::new(routes), hits: hits.clone() };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}/api"), hits }
    }

    pub(crate) fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub(crate) fn hits_for(&self, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|h| h.path == path).collect()
    }
}

async fn handle(State(state): State<StubState>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path()).to_owned();
    let header_str = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(ToOwned::to_owned);

    state.hits.lock().unwrap().push(Hit {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(ToOwned::to_owned),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let Some(route) = state.routes.iter().find(|r| r.method == method && r.path == path) else {
        return (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "application/json")], r#"{"error":"no stub"}"#)
            .into_response();
    };

    let status = StatusCode::from_u16(route.status).unwrap();
    match &route.body {
        StubBody::Json(value) => {
            (status, [(header::CONTENT_TYPE, "application/json")], value.to_string()).into_response()
        }
        StubBody::Raw(text) => (status, *text).into_response(),
        StubBody::Empty => status.into_response(),
    }
}

/// Base URL nothing listens on: bind, note the port, release it.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

/// Gateway over fresh memory storage, optionally pre-seeded with a token.
pub(crate) fn gateway(base_url: &str, stored_token: Option<&str>) -> (Arc<ApiGateway>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    if let Some(token) = stored_token {
        storage.set_item(TOKEN_KEY, token).unwrap();
    }
    let gateway = ApiGateway::new(&ClientConfig::new(base_url), storage.clone()).unwrap();
    (Arc::new(gateway), storage)
}

/// Storage that serves a fixed token but refuses every write.
pub(crate) struct ReadOnlyStorage {
    pub token: Option<String>,
}

impl KeyValueStorage for ReadOnlyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(if key == TOKEN_KEY { self.token.clone() } else { None })
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), ApiError> {
        Err(ApiError::Storage("read-only".to_owned()))
    }

    fn remove_item(&self, _key: &str) -> Result<(), ApiError> {
        Err(ApiError::Storage("read-only".to_owned()))
    }
}
