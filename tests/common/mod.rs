//! A stand-in for the indexing API: serves scripted pages in request order
//! and records what each request carried.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADDRESS: &str = "11111111111111111111111111111111";
pub const API_KEY: &str = "test-key";

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub address: String,
    pub query: HashMap<String, String>,
    pub api_key_header: Option<String>,
}

struct MockState {
    pages: Vec<(u16, String)>,
    delay: Duration,
    hits: AtomicUsize,
    seen: Mutex<Vec<SeenRequest>>,
}

pub struct MockApi {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockApi {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

async fn transactions(
    State(state): State<Arc<MockState>>,
    Path(address): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let n = state.hits.fetch_add(1, Ordering::SeqCst);
    state.seen.lock().unwrap().push(SeenRequest {
        address,
        query,
        api_key_header: headers
            .get("api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    match state.pages.get(n) {
        Some((code, body)) => (StatusCode::from_u16(*code).unwrap(), body.clone()),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "unexpected extra request".into()),
    }
}

pub async fn spawn(pages: Vec<(u16, String)>) -> MockApi {
    spawn_with_delay(pages, Duration::ZERO).await
}

pub async fn spawn_with_delay(pages: Vec<(u16, String)>, delay: Duration) -> MockApi {
    let state = Arc::new(MockState {
        pages,
        delay,
        hits: AtomicUsize::new(0),
        seen: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/v0/addresses/:address/transactions", get(transactions))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        base_url: format!("http://{}/v0/addresses", addr),
        state,
    }
}

/// `count` records with signatures `sig{start}..`.
pub fn records(start: usize, count: usize) -> Vec<Value> {
    (start..start + count)
        .map(|i| {
            json!({
                "signature": format!("sig{}", i),
                "slot": 1000 + i,
                "timestamp": 1700000000 + i,
                "fee": 5000,
                "feePayer": "payer",
                "type": "TRANSFER",
                "description": format!("transfer #{}", i),
                "nativeTransfers": [{"fromUserAccount": "a", "toUserAccount": "b", "amount": i}],
                "tokenTransfers": [],
                "events": {}
            })
        })
        .collect()
}

/// Wrapped page: `{"transactions": [...], "cursor": ...}`.
pub fn page(start: usize, count: usize, cursor: Option<&str>) -> (u16, String) {
    (
        200,
        json!({ "transactions": records(start, count), "cursor": cursor }).to_string(),
    )
}

pub fn status(code: u16, body: &str) -> (u16, String) {
    (code, body.to_string())
}
