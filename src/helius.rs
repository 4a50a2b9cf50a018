// src/helius.rs
use reqwest::{header, Client, StatusCode, Url};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, ViewerError};
use crate::models::{TransactionHistory, TransactionRecord};

pub const DEFAULT_BASE_URL: &str = "https://api.helius.xyz/v0/addresses";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 1;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_PAUSE: Duration = Duration::from_millis(120);

/// Keys the API has used for the continuation token, in lookup order.
const CURSOR_KEYS: [&str; 4] = ["cursor", "next", "nextCursor", "next_cursor"];
/// Keys holding the record list in wrapped responses, in lookup order.
const LIST_KEYS: [&str; 2] = ["transactions", "result"];

/// API key. Its `Debug`/`Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ViewerError::Auth {
                status: None,
                message: "no API key provided".to_string(),
            });
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// One decoded page of results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<TransactionRecord>,
    pub cursor: Option<String>,
}

fn cursor_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Records under `transactions`, else `result`, else the first array field
/// in document order (`serde_json` is built with `preserve_order`).
fn take_list(map: &mut Map<String, Value>) -> Option<Vec<Value>> {
    let key = LIST_KEYS
        .iter()
        .map(|k| k.to_string())
        .find(|k| map.get(k).is_some_and(Value::is_array))
        .or_else(|| {
            map.iter()
                .find(|(_, v)| v.is_array())
                .map(|(k, _)| k.clone())
        })?;
    match map.remove(&key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

/// Decode a page body. Accepts a bare array of records, or an object with
/// the records under `transactions`, `result` or its first array field.
/// Records are built one by one and never fail on their own content.
pub fn parse_page(body: &str) -> std::result::Result<Page, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;

    let (items, cursor) = match value {
        Value::Array(items) => (items, None),
        Value::Object(mut map) => {
            let cursor = CURSOR_KEYS
                .iter()
                .filter_map(|k| map.get(*k))
                .find_map(cursor_value);
            let items = take_list(&mut map).ok_or("response object holds no transaction list")?;
            (items, cursor)
        }
        other => return Err(format!("unexpected response type: {}", other)),
    };

    let records = items.into_iter().map(TransactionRecord::from).collect();
    Ok(Page { records, cursor })
}

/// Trims and checks the address. Only emptiness is an error: the API is the
/// authority on valid addresses, so a non-base58 value is just logged.
pub fn validate_address(address: &str) -> Result<&str> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ViewerError::Validation("wallet address is empty".to_string()));
    }
    let is_pubkey = matches!(bs58::decode(address).into_vec(), Ok(bytes) if bytes.len() == 32);
    if !is_pubkey {
        warn!("Address {} does not look like a base58 account key, querying anyway", address);
    }
    Ok(address)
}

pub fn validate_page_size(page_size: i64) -> Result<u32> {
    u32::try_from(page_size)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            ViewerError::Validation(format!(
                "page_size must be a positive integer, got {}",
                page_size
            ))
        })
}

pub fn validate_max_pages(max_pages: i64) -> Result<u32> {
    u32::try_from(max_pages).map_err(|_| {
        ViewerError::Validation(format!(
            "max_pages must be a non-negative integer, got {}",
            max_pages
        ))
    })
}

/// Client for the address-transactions endpoint of the indexing API.
#[derive(Debug, Clone)]
pub struct HeliusClient {
    http: Client,
    base_url: Url,
    credential: Credential,
    page_pause: Duration,
}

impl HeliusClient {
    pub fn new(base_url: &str, credential: Credential, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ViewerError::Validation(format!("invalid API base url {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ViewerError::Validation(format!(
                "API base url {} cannot take path segments",
                base_url
            )));
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            credential,
            page_pause: DEFAULT_PAGE_PAUSE,
        })
    }

    /// Pause between consecutive page requests.
    pub fn with_page_pause(mut self, pause: Duration) -> Self {
        self.page_pause = pause;
        self
    }

    fn transactions_url(&self, address: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(address).push("transactions");
        }
        url
    }

    /// Request a single page.
    pub async fn fetch_page(&self, address: &str, limit: u32, cursor: Option<&str>) -> Result<Page> {
        let url = self.transactions_url(address);
        info!(
            "📡 GET {} (limit {}, cursor {})",
            url,
            limit,
            cursor.unwrap_or("-")
        );

        let mut params: Vec<(&str, String)> = vec![
            ("limit", limit.to_string()),
            ("api-key", self.credential.expose().to_string()),
        ];
        if let Some(c) = cursor {
            params.push(("cursor", c.to_string()));
        }

        let resp = self
            .http
            .get(url)
            .query(&params)
            .header(header::ACCEPT, "application/json")
            .header("api-key", self.credential.expose())
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!("📩 {} response, {} bytes", status, text.len());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("unauthorized").to_string()
            } else {
                text
            };
            return Err(ViewerError::Auth {
                status: Some(status.as_u16()),
                message,
            });
        }
        if !status.is_success() {
            return Err(ViewerError::Fetch {
                status: Some(status.as_u16()),
                body: text,
            });
        }

        parse_page(&text).map_err(|e| {
            warn!("Malformed page from indexing API: {}", e);
            ViewerError::Fetch {
                status: Some(status.as_u16()),
                body: text,
            }
        })
    }

    /// Walk the pages for `address` in order. `max_pages == 0` fetches the
    /// first page only. Any failed page fails the whole walk.
    pub async fn fetch(&self, address: &str, page_size: u32, max_pages: u32) -> Result<TransactionHistory> {
        let address = validate_address(address)?;
        if page_size == 0 {
            return Err(ViewerError::Validation(
                "page_size must be a positive integer, got 0".to_string(),
            ));
        }
        let ceiling = max_pages.max(1);

        let mut history = TransactionHistory::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_page(address, page_size, cursor.as_deref()).await?;
            history.pages_fetched += 1;
            info!(
                "Page {} for {}: {} transactions, cursor {}",
                history.pages_fetched,
                address,
                page.records.len(),
                if page.cursor.is_some() { "present" } else { "absent" }
            );

            // a cursor on an empty page is treated as end of data
            if page.records.is_empty() {
                break;
            }
            history.records.extend(page.records);

            match page.cursor {
                Some(next) if history.pages_fetched < ceiling => cursor = Some(next),
                Some(next) => {
                    info!("Stopped at page ceiling {} with more data available", ceiling);
                    history.next_cursor = Some(next);
                    break;
                }
                None => break,
            }

            if !self.page_pause.is_zero() {
                tokio::time::sleep(self.page_pause).await;
            }
        }

        info!(
            "Fetched {} transactions for {} across {} page(s)",
            history.records.len(),
            address,
            history.pages_fetched
        );
        Ok(history)
    }
}

/// Fetch against the public endpoint with default transport settings.
pub async fn fetch(
    address: &str,
    credential: &str,
    page_size: u32,
    max_pages: u32,
) -> Result<Vec<TransactionRecord>> {
    let client = HeliusClient::new(DEFAULT_BASE_URL, Credential::new(credential)?, DEFAULT_TIMEOUT)?;
    Ok(client.fetch(address, page_size, max_pages).await?.records)
}
