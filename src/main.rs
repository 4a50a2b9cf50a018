use helius_txn_viewer::{api, config};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Helius transaction viewer starting...");

    let cfg = config::load()?;
    info!("  API base: {}", cfg.helius_base_url);
    info!("  Server API key: {}", if cfg.api_key.is_some() { "configured" } else { "not set" });
    info!("  Defaults: page_size {}, max_pages {}", cfg.page_size, cfg.max_pages);

    let api_handle = tokio::spawn(api::serve(cfg));

    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("Server exited cleanly"),
            Ok(Err(e)) => error!("Server error: {:?}", e),
            Err(e) => error!("Server task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Helius transaction viewer stopped.");
    Ok(())
}
