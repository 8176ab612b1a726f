//! Binance error mapping

use crate::error::ScraperError;
use crate::traits::{RawApiError, ScraperErrorMapper};

use super::BinanceScraper;

/// Error code for a symbol that does not exist on the exchange.
pub(crate) const INVALID_SYMBOL: &str = "-1121";

/// Binance error code mapping
/// Reference: <https://developers.binance.com/docs/binance-spot-api-docs/errors>
impl ScraperErrorMapper for BinanceScraper {
    fn platform_name(&self) -> &'static str {
        "binance"
    }

    fn map_error(&self, raw: RawApiError) -> ScraperError {
        match raw.code.as_deref() {
            // -1022: signature invalid, -2014: API-key format invalid,
            // -2015: invalid API-key, IP, or permissions
            Some("-1022" | "-2014" | "-2015") => self.auth_error(raw.message),
            // -1003: too many requests
            Some("-1003") => ScraperError::RateLimited {
                platform: self.platform_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
            },
            // -1021: timestamp outside recvWindow, -1001: internal disconnect
            Some("-1021" | "-1001") => self.network_error(raw.message),
            Some(INVALID_SYMBOL) => ScraperError::ValidationError {
                platform: self.platform_name().to_string(),
                field: "symbol".to_string(),
                detail: raw.message,
            },
            _ if raw.status.is_some_and(|s| s >= 500) => self.network_error(raw.message),
            _ => self.parse_error(format!(
                "unexpected API error {}: {}",
                raw.code.unwrap_or_default(),
                raw.message
            )),
        }
    }
}
