use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Bytes that are not valid UTF-8, served by `/binary/{code}`.
pub const INVALID_UTF8: &[u8] = &[0xff, 0xfe, 0xfd, 0x28];

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlowParams {
    #[serde(default)]
    pub ms: u64,
}

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/binary/{code}", any(binary))
        .route("/echo", any(echo))
        .route("/slow", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

async fn status(Path(code): Path<u16>, Query(params): Query<StatusParams>) -> (StatusCode, String) {
    let Ok(status) = StatusCode::from_u16(code) else {
        return (StatusCode::BAD_REQUEST, format!("unsupported status code {code}"));
    };
    let body = params
        .body
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
    tracing::debug!(code, "responding with requested status");
    (status, body)
}

async fn binary(Path(code): Path<u16>) -> (StatusCode, Vec<u8>) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, INVALID_UTF8.to_vec()),
        Err(_) => (StatusCode::BAD_REQUEST, INVALID_UTF8.to_vec()),
    }
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn slow(Query(params): Query<SlowParams>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    "done"
}
