// src/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Unsigned integer from a JSON number or numeric string. Floats are
/// accepted when they carry no fraction (`1.5e3`, `5000.0`).
pub fn lenient_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Signed counterpart of [`lenient_u64`].
pub fn lenient_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| {
                    f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64
                })
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty_str(v: &Value) -> Option<String> {
    v.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

fn get<'a>(obj: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    obj.and_then(|o| o.get(key))
}

/// One enriched transaction as returned by the indexing API.
///
/// The typed fields are read leniently from the received JSON: a field with
/// an unexpected type is `None` here, never a decode error. The received
/// value itself is kept untouched and is what gets serialized, so raw
/// export hands back exactly what the API sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    pub signature: Option<String>,
    pub slot: Option<u64>,
    pub timestamp: Option<i64>,
    pub fee: Option<u64>,
    pub fee_payer: Option<String>,
    pub tx_type: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub native_transfers: Option<Vec<NativeTransfer>>,
    pub token_transfers: Option<Vec<TokenTransfer>>,
    pub transaction_error: Option<Value>,
    raw: Value,
}

impl From<Value> for TransactionRecord {
    fn from(raw: Value) -> Self {
        let obj = raw.as_object();
        let list = |key: &str| get(obj, key).and_then(Value::as_array);

        Self {
            signature: get(obj, "signature").and_then(non_empty_str),
            slot: get(obj, "slot").and_then(lenient_u64),
            timestamp: get(obj, "timestamp").and_then(lenient_i64),
            fee: get(obj, "fee").and_then(lenient_u64),
            fee_payer: get(obj, "feePayer").and_then(non_empty_str),
            tx_type: get(obj, "type").and_then(non_empty_str),
            source: get(obj, "source").and_then(non_empty_str),
            description: get(obj, "description").and_then(non_empty_str),
            native_transfers: list("nativeTransfers")
                .map(|items| items.iter().map(NativeTransfer::from).collect()),
            token_transfers: list("tokenTransfers")
                .map(|items| items.iter().map(TokenTransfer::from).collect()),
            transaction_error: get(obj, "transactionError")
                .filter(|e| !e.is_null())
                .cloned(),
            raw,
        }
    }
}

impl TransactionRecord {
    /// The record exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// First non-empty string under any of `keys`.
    pub fn raw_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.raw.get(*k))
            .filter_map(Value::as_str)
            .find(|s| !s.is_empty())
    }

    /// First integer-like value under any of `keys`.
    pub fn raw_i64(&self, keys: &[&str]) -> Option<i64> {
        keys.iter()
            .filter_map(|k| self.raw.get(*k))
            .find_map(lenient_i64)
    }
}

impl Serialize for TransactionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransactionRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

/// SOL movement between two accounts, in lamports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeTransfer {
    pub from_user_account: Option<String>,
    pub to_user_account: Option<String>,
    pub amount: Option<u64>,
}

impl From<&Value> for NativeTransfer {
    fn from(v: &Value) -> Self {
        Self {
            from_user_account: v.get("fromUserAccount").and_then(non_empty_str),
            to_user_account: v.get("toUserAccount").and_then(non_empty_str),
            amount: v.get("amount").and_then(lenient_u64),
        }
    }
}

/// SPL token movement; `token_amount` is already scaled by the mint decimals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenTransfer {
    pub from_user_account: Option<String>,
    pub to_user_account: Option<String>,
    pub mint: Option<String>,
    pub token_amount: Option<f64>,
}

impl From<&Value> for TokenTransfer {
    fn from(v: &Value) -> Self {
        Self {
            from_user_account: v.get("fromUserAccount").and_then(non_empty_str),
            to_user_account: v.get("toUserAccount").and_then(non_empty_str),
            mint: v.get("mint").and_then(non_empty_str),
            token_amount: v.get("tokenAmount").and_then(Value::as_f64),
        }
    }
}

/// Fixed display projection of one `TransactionRecord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub signature: String,
    pub slot: Option<u64>,
    pub timestamp: Option<i64>,
    pub time_utc: Option<DateTime<Utc>>,
    pub fee: u64,             // lamports
    pub fee_sol: Decimal,     // exact, fee / 10^9
    pub fee_payer: Option<String>,
    pub native_transfer_count: usize,
    pub token_transfer_count: usize,
    pub error: Option<String>, // compact JSON of transactionError
    pub description: String,
}

/// Result of walking the API's pages for one address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionHistory {
    pub records: Vec<TransactionRecord>,
    pub pages_fetched: u32,
    /// Cursor still pending when the page ceiling stopped the walk.
    pub next_cursor: Option<String>,
}

impl TransactionHistory {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}
