//! Trade Republic scraper
//!
//! Login is two-phase: phone + PIN trigger a 4-digit code sent to the user's app, and the
//! code is exchanged for a `tr_session` cookie. Without that cookie nothing can be fetched,
//! so unattended syncs are impossible for this platform.

mod error;
mod http;
mod scraper;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::scrapers::common::create_http_client;

pub(crate) const TR_API_BASE: &str = "https://api.traderepublic.com";
pub(crate) const SESSION_COOKIE: &str = "tr_session";

/// Trade Republic scraper.
pub struct TradeRepublicScraper {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl TradeRepublicScraper {
    pub fn new() -> Result<Self> {
        Self::with_base_url(TR_API_BASE)
    }

    /// Point the scraper at another host (staging, local proxy).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: create_http_client("traderepublic", false)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}
