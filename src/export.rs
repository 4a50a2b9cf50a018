// src/export.rs
use eyre::{eyre, Result};

use crate::models::{SummaryRow, TransactionRecord};

/// Column order of the summary CSV.
pub const CSV_HEADER: [&str; 8] = [
    "signature",
    "slot",
    "timestamp",
    "fee",
    "native_transfer_count",
    "token_transfer_count",
    "error",
    "description",
];

/// Download formats offered by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    RawJson,
    SummaryJson,
    SummaryCsv,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::RawJson | ExportFormat::SummaryJson => "application/json",
            ExportFormat::SummaryCsv => "text/csv; charset=utf-8",
        }
    }

    pub fn file_name(self, address: &str) -> String {
        // keep header-unsafe characters out of Content-Disposition
        let safe: String = address
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match self {
            ExportFormat::RawJson => format!("helius_{}_txns.json", safe),
            ExportFormat::SummaryJson => format!("helius_{}_summary.json", safe),
            ExportFormat::SummaryCsv => format!("helius_{}_summary.csv", safe),
        }
    }
}

/// Raw records exactly as the API shaped them, pretty-printed.
pub fn records_to_json(records: &[TransactionRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

pub fn rows_to_json(rows: &[SummaryRow]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(rows)?)
}

pub fn rows_to_csv(rows: &[SummaryRow]) -> Result<Vec<u8>> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    w.write_record(CSV_HEADER)?;

    for row in rows {
        w.write_record([
            row.signature.clone(),
            row.slot.map(|s| s.to_string()).unwrap_or_default(),
            row.timestamp.map(|t| t.to_string()).unwrap_or_default(),
            row.fee.to_string(),
            row.native_transfer_count.to_string(),
            row.token_transfer_count.to_string(),
            row.error.clone().unwrap_or_default(),
            row.description.clone(),
        ])?;
    }

    w.into_inner().map_err(|e| eyre!("csv flush failed: {}", e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use serde_json::json;

    fn sample() -> Vec<TransactionRecord> {
        serde_json::from_value(json!([
            {
                "signature": "sig1",
                "slot": 10,
                "timestamp": 1700000000,
                "fee": 5000,
                "description": "a, \"quoted\" memo",
                "nativeTransfers": [{"amount": 1}],
                "transactionError": {"error": "x"}
            },
            {}
        ]))
        .unwrap()
    }

    #[test]
    fn csv_has_fixed_header_and_one_line_per_row() {
        let csv = String::from_utf8(rows_to_csv(&flatten(&sample())).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("signature,slot,timestamp,fee,native_transfer_count,token_transfer_count,error,description")
        );
        assert_eq!(
            lines.next(),
            Some(r#"sig1,10,1700000000,5000,1,0,"{""error"":""x""}","a, ""quoted"" memo""#)
        );
        assert_eq!(lines.next(), Some(",,,0,0,0,,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_rows_still_get_a_header() {
        let csv = String::from_utf8(rows_to_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn raw_json_parses_back_to_the_same_records() {
        let records = sample();
        let bytes = records_to_json(&records).unwrap();
        let back: Vec<TransactionRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn summary_json_is_an_array_of_rows() {
        let bytes = rows_to_json(&flatten(&sample())).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v.as_array().map(Vec::len), Some(2));
        assert_eq!(v[0]["native_transfer_count"], 1);
        assert_eq!(v[1]["description"], "");
    }

    #[test]
    fn file_names_follow_the_download_convention() {
        let addr = "11111111111111111111111111111111";
        assert_eq!(
            ExportFormat::SummaryCsv.file_name(addr),
            format!("helius_{}_summary.csv", addr)
        );
        assert_eq!(ExportFormat::RawJson.file_name("a\"b"), "helius_ab_txns.json");
    }
}
