use dotenvy::dotenv;
use eyre::Result;
use std::{env, fmt::Display, net::IpAddr, str::FromStr, time::Duration};
use tracing::{info, warn};

use crate::helius::{
    Credential, DEFAULT_BASE_URL, DEFAULT_MAX_PAGES, DEFAULT_PAGE_PAUSE, DEFAULT_PAGE_SIZE,
    DEFAULT_TIMEOUT,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub helius_base_url: String,
    pub api_key: Option<Credential>, // UI may supply one per request instead
    pub page_size: u32,
    pub max_pages: u32,
    pub request_timeout: Duration,
    pub page_pause: Duration,
    pub bind_addr: IpAddr,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            helius_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout: DEFAULT_TIMEOUT,
            page_pause: DEFAULT_PAGE_PAUSE,
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{}={:?} is not valid, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // .env is optional

    let defaults = Config::default();

    let helius_base_url = env::var("HELIUS_BASE_URL")
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or(defaults.helius_base_url);

    let api_key = env::var("HELIUS_API_KEY")
        .ok()
        .and_then(|k| Credential::new(k).ok());

    let page_size = match parse_or("PAGE_SIZE", defaults.page_size) {
        0 => {
            warn!("PAGE_SIZE=0 is not allowed, using {}", DEFAULT_PAGE_SIZE);
            DEFAULT_PAGE_SIZE
        }
        n => n,
    };

    let cfg = Config {
        helius_base_url,
        api_key,
        page_size,
        max_pages: parse_or("MAX_PAGES", defaults.max_pages),
        request_timeout: Duration::from_secs(parse_or(
            "REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )),
        page_pause: Duration::from_millis(parse_or(
            "PAGE_PAUSE_MS",
            defaults.page_pause.as_millis() as u64,
        )),
        bind_addr: parse_or("BIND_ADDR", defaults.bind_addr),
        port: parse_or("PORT", defaults.port),
    };

    // Credential's Debug is redacted
    info!("Loaded config: {:?}", cfg);

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_the_key() {
        let cfg = Config {
            api_key: Some(Credential::new("super-secret").unwrap()),
            ..Config::default()
        };
        let printed = format!("{:?}", cfg);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("Credential(***)"));
    }

    #[test]
    fn defaults_match_the_public_endpoint() {
        let cfg = Config::default();
        assert_eq!(cfg.helius_base_url, "https://api.helius.xyz/v0/addresses");
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.max_pages, 1);
        assert_eq!(cfg.port, 8080);
    }
}
