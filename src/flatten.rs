// src/flatten.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{SummaryRow, TransactionRecord};

/// Lamports carry nine decimal places of SOL.
const SOL_DECIMALS: u32 = 9;

fn epoch_to_utc(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(lamports), SOL_DECIMALS).normalize()
}

/// Project one record onto the summary columns. Never fails: absent
/// fields fall back to empty/zero values.
pub fn flatten_record(tx: &TransactionRecord) -> SummaryRow {
    let signature = tx
        .signature
        .as_deref()
        .or_else(|| tx.raw_str(&["txHash", "transactionHash"]))
        .unwrap_or_default()
        .to_string();

    let timestamp = tx
        .timestamp
        .or_else(|| tx.raw_i64(&["blockTime", "block_time"]));

    let fee = tx.fee.unwrap_or(0);

    let error = tx.transaction_error.as_ref().map(|e| e.to_string());

    let description = tx
        .description
        .as_deref()
        .or(tx.tx_type.as_deref())
        .unwrap_or_default()
        .to_string();

    SummaryRow {
        signature,
        slot: tx.slot,
        timestamp,
        time_utc: epoch_to_utc(timestamp),
        fee,
        fee_sol: lamports_to_sol(fee),
        fee_payer: tx.fee_payer.clone(),
        native_transfer_count: tx.native_transfers.as_ref().map_or(0, Vec::len),
        token_transfer_count: tx.token_transfers.as_ref().map_or(0, Vec::len),
        error,
        description,
    }
}

/// One row per record, in input order.
pub fn flatten(records: &[TransactionRecord]) -> Vec<SummaryRow> {
    records.iter().map(flatten_record).collect()
}
