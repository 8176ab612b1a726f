//! Trade Republic error mapping

use crate::error::ScraperError;
use crate::traits::{RawApiError, ScraperErrorMapper};

use super::TradeRepublicScraper;

impl ScraperErrorMapper for TradeRepublicScraper {
    fn platform_name(&self) -> &'static str {
        "traderepublic"
    }

    fn map_error(&self, raw: RawApiError) -> ScraperError {
        match raw.code.as_deref() {
            // Wrong phone/PIN combination or locked account
            Some("AUTHENTICATION_ERROR" | "LOGIN_FAILED" | "ACCOUNT_LOCKED") => {
                self.auth_error(raw.message)
            }
            // Wrong, reused or expired verification code
            Some("VALIDATION_CODE_INVALID" | "PROCESS_NOT_FOUND" | "PROCESS_EXPIRED") => {
                self.auth_error("invalid or expired code - restart verification")
            }
            Some("TOO_MANY_REQUESTS") => ScraperError::RateLimited {
                platform: self.platform_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
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
