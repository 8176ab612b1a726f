//! Helpers shared by scraper implementations

use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use sha2::Sha256;

use crate::error::{Result, ScraperError};
use crate::types::Transaction;

type HmacSha256 = Hmac<Sha256>;

// ============ HTTP Client ============

/// Default connect timeout (seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds)
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("portfolio-sync/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the standard timeouts.
///
/// `cookie_store` enables a per-client cookie jar for platforms with form-login sessions.
pub fn create_http_client(platform: &str, cookie_store: bool) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .cookie_store(cookie_store)
        .build()
        .map_err(|e| ScraperError::NetworkError {
            platform: platform.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

// ============ HMAC-SHA256 ============

/// Hex-encoded HMAC-SHA256 of `data` under `key`.
pub fn hmac_sha256_hex(platform: &str, key: &[u8], data: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| ScraperError::ValidationError {
        platform: platform.to_string(),
        field: "apiSecret".to_string(),
        detail: e.to_string(),
    })?;
    mac.update(data);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

// ============ Transactions ============

/// Sort oldest first; ties broken by external id so the order is total.
pub fn sort_chronologically(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        a.executed_at
            .cmp(&b.executed_at)
            .then_with(|| a.external_id.cmp(&b.external_id))
    });
}

/// Parse a decimal that may use a comma as the decimal separator (`"1 234,56"`).
pub fn parse_localized_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    cleaned.parse().ok()
}
