use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ViewerError;
use crate::export::{self, ExportFormat};
use crate::flatten::flatten;
use crate::helius::{validate_max_pages, validate_page_size, Credential, HeliusClient};
use crate::models::{SummaryRow, TransactionHistory, TransactionRecord};

/// Request header carrying a per-request API key from the UI.
pub const API_KEY_HEADER: &str = "x-api-key";

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Exports carry the whole displayed result set back in the request body.
const EXPORT_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Read-only settings shared by all handlers; no fetch results are kept here.
#[derive(Debug, Clone)]
pub struct AppState {
    pub cfg: Config,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    #[serde(default)]
    pub address: String,
    pub page_size: Option<i64>,
    pub max_pages: Option<i64>,
}

/// The result set the UI is showing, sent back for serialization only.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub address: String,
    pub format: ExportFormat,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub address: String,
    pub pages_fetched: u32,
    pub has_more: bool,
    pub count: usize,
    pub rows: Vec<SummaryRow>,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug)]
pub enum ApiError {
    Viewer(ViewerError),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Viewer(e) => {
                let status = match &e {
                    ViewerError::Validation(_) => StatusCode::BAD_REQUEST,
                    ViewerError::Auth { .. } => StatusCode::UNAUTHORIZED,
                    ViewerError::Fetch { .. } => StatusCode::BAD_GATEWAY,
                };
                (status, e.kind(), e.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        (status, Json(ErrorResponse { error: message, kind })).into_response()
    }
}

impl From<ViewerError> for ApiError {
    fn from(err: ViewerError) -> Self {
        ApiError::Viewer(err)
    }
}

impl From<eyre::Report> for ApiError {
    fn from(err: eyre::Report) -> Self {
        ApiError::Internal(err.to_string())
    }
}

fn request_credential(headers: &HeaderMap, cfg: &Config) -> Result<Credential, ViewerError> {
    let supplied = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());

    match supplied {
        Some(key) => Credential::new(key),
        None => cfg.api_key.clone().ok_or_else(|| ViewerError::Auth {
            status: None,
            message: "provide an API key (HELIUS_API_KEY or the x-api-key header)".to_string(),
        }),
    }
}

async fn load_history(
    cfg: &Config,
    headers: &HeaderMap,
    address: &str,
    page_size: Option<i64>,
    max_pages: Option<i64>,
) -> Result<TransactionHistory, ViewerError> {
    let page_size = page_size
        .map(validate_page_size)
        .transpose()?
        .unwrap_or(cfg.page_size);
    let max_pages = max_pages
        .map(validate_max_pages)
        .transpose()?
        .unwrap_or(cfg.max_pages);
    let credential = request_credential(headers, cfg)?;

    let client = HeliusClient::new(&cfg.helius_base_url, credential, cfg.request_timeout)?
        .with_page_pause(cfg.page_pause);

    client.fetch(address, page_size, max_pages).await.map_err(|e| {
        warn!("Fetch for {} failed: {}", address.trim(), e);
        e
    })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn get_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let history =
        load_history(&state.cfg, &headers, &q.address, q.page_size, q.max_pages).await?;

    let rows = flatten(&history.records);
    Ok(Json(TransactionsResponse {
        address: q.address.trim().to_string(),
        pages_fetched: history.pages_fetched,
        has_more: history.has_more(),
        count: rows.len(),
        rows,
        transactions: history.records,
    }))
}

/// Serializes the records the client already holds; no API request is made.
async fn export_transactions(Json(req): Json<ExportRequest>) -> Result<Response, ApiError> {
    let body = match req.format {
        ExportFormat::RawJson => export::records_to_json(&req.transactions),
        ExportFormat::SummaryJson => export::rows_to_json(&flatten(&req.transactions)),
        ExportFormat::SummaryCsv => export::rows_to_csv(&flatten(&req.transactions)),
    }
    .map_err(|e| {
        error!("Export failed: {:?}", e);
        ApiError::from(e)
    })?;

    info!(
        "Exported {} transactions as {:?}",
        req.transactions.len(),
        req.format
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        req.format.file_name(req.address.trim())
    );
    Ok((
        [
            (header::CONTENT_TYPE, req.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "Helius transaction viewer running" }))
        .route("/api/transactions", get(get_transactions))
        .route(
            "/api/export",
            post(export_transactions).layer(DefaultBodyLimit::max(EXPORT_BODY_LIMIT)),
        )
        .layer(cors)
        .with_state(state)
}

pub async fn serve(cfg: Config) -> eyre::Result<()> {
    let addr = SocketAddr::new(cfg.bind_addr, cfg.port);
    let app = build_router(Arc::new(AppState { cfg }));

    info!("Viewer listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
