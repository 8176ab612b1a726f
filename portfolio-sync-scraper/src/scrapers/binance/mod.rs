//! Binance spot scraper
//!
//! Binance has no "all trades" endpoint: trades are listed per symbol. The scraper reads the
//! account's wallet entries (held or emptied) and the exchange's pair list, then walks
//! `myTrades` for every listed pair of a wallet asset against a quote in [`QUOTE_ASSETS`].
//! A full fetch pages from the first trade id; an incremental one starts at the checkpoint
//! through `startTime`.

mod error;
mod http;
mod scraper;
mod sign;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::scrapers::common::create_http_client;

pub(crate) const BINANCE_API_BASE: &str = "https://api.binance.com";
/// Quote currencies tried for every wallet asset.
pub(crate) const QUOTE_ASSETS: &[&str] = &["USDT", "EUR", "BTC"];
/// `myTrades` page size (API maximum).
pub(crate) const MAX_PAGE_SIZE: usize = 1000;
pub(crate) const RECV_WINDOW_MS: u64 = 5000;

/// Binance spot scraper.
pub struct BinanceScraper {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl BinanceScraper {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BINANCE_API_BASE)
    }

    /// Point the scraper at another host (e.g. `https://testnet.binance.vision`).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: create_http_client("binance", false)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}
