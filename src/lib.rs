//! Wallet transaction viewer backed by the Helius indexing API.
//!
//! `helius` walks the paginated address-transactions endpoint, `flatten`
//! projects each record onto a fixed summary row, `export` serializes both
//! for download and `api` serves the web UI.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod flatten;
pub mod helius;
pub mod models;

pub use error::{Result, ViewerError};
pub use export::{records_to_json, rows_to_csv, rows_to_json};
pub use flatten::{flatten, flatten_record};
pub use helius::{fetch, Credential, HeliusClient};
pub use models::{SummaryRow, TransactionHistory, TransactionRecord};
