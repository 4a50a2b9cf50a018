use anyhow::Context;
use clap::Parser;
use helius_txn_viewer::{
    config,
    export::{self, ExportFormat},
    flatten, HeliusClient,
};
use std::path::PathBuf;

/// Fetch a wallet's transactions once and write the raw JSON and summary CSV.
#[derive(Parser, Debug)]
#[command(name = "fetch_txns")]
struct Args {
    /// Solana wallet address
    address: String,

    /// Records per page (defaults to PAGE_SIZE)
    #[arg(long)]
    page_size: Option<u32>,

    /// Page ceiling, 0 = first page only (defaults to MAX_PAGES)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Directory for the exported files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    let cfg = config::load().map_err(|e| anyhow::anyhow!("{e}"))?;
    let Some(credential) = cfg.api_key.clone() else {
        anyhow::bail!("HELIUS_API_KEY is not set");
    };

    let client = HeliusClient::new(&cfg.helius_base_url, credential, cfg.request_timeout)?
        .with_page_pause(cfg.page_pause);

    let address = args.address.trim();
    println!("Fetching transactions for {}...", address);

    let history = client
        .fetch(
            address,
            args.page_size.unwrap_or(cfg.page_size),
            args.max_pages.unwrap_or(cfg.max_pages),
        )
        .await?;

    println!(
        "Fetched {} transactions (pages fetched: {}){}",
        history.records.len(),
        history.pages_fetched,
        if history.has_more() { ", more available" } else { "" }
    );

    if history.records.is_empty() {
        println!("No transactions returned for this address / page range.");
        return Ok(());
    }

    let rows = flatten(&history.records);
    for row in rows.iter().take(5) {
        println!(
            "Sig: {} | Slot: {} | Fee: {} SOL | {}",
            row.signature,
            row.slot.map(|s| s.to_string()).unwrap_or_default(),
            row.fee_sol,
            row.description
        );
    }

    let outputs = [
        (ExportFormat::RawJson, export::records_to_json(&history.records)),
        (ExportFormat::SummaryCsv, export::rows_to_csv(&rows)),
    ];
    for (format, bytes) in outputs {
        let bytes = bytes.map_err(|e| anyhow::anyhow!("{e}"))?;
        let path = args.out_dir.join(format.file_name(address));
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
