//! Binance `SIGNED` endpoint security

use crate::error::Result;
use crate::scrapers::common::hmac_sha256_hex;

use super::{BinanceScraper, RECV_WINDOW_MS};

impl BinanceScraper {
    /// Append `recvWindow`, `timestamp` and the HMAC-SHA256 `signature` to a query string.
    pub(crate) fn signed_query(
        &self,
        params: &[(&str, String)],
        api_secret: &str,
        timestamp_ms: i64,
    ) -> Result<String> {
        let mut query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>();
        query.push(format!("recvWindow={RECV_WINDOW_MS}"));
        query.push(format!("timestamp={timestamp_ms}"));
        let query = query.join("&");

        let signature = hmac_sha256_hex("binance", api_secret.as_bytes(), query.as_bytes())?;
        Ok(format!("{query}&signature={signature}"))
    }
}
