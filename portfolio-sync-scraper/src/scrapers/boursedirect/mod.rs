//! Bourse Direct scraper
//!
//! Bourse Direct has no public API; the web front-end logs in with a form post and keeps the
//! session in cookies. Each fetch therefore builds its own cookie-jar client so that sessions
//! of different accounts never mix.

mod error;
mod http;
mod scraper;
mod types;

use crate::error::Result;
use crate::scrapers::common::create_http_client;

pub(crate) const BD_BASE: &str = "https://www.boursedirect.fr";

/// Bourse Direct scraper.
pub struct BourseDirectScraper {
    pub(crate) base_url: String,
}

impl BourseDirectScraper {
    pub fn new() -> Self {
        Self::with_base_url(BD_BASE)
    }

    /// Point the scraper at another host.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fresh client with an empty cookie jar.
    pub(crate) fn session_client() -> Result<reqwest::Client> {
        create_http_client("boursedirect", true)
    }
}

impl Default for BourseDirectScraper {
    fn default() -> Self {
        Self::new()
    }
}
