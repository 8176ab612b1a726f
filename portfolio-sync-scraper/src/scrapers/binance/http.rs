//! Binance HTTP calls

use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::error::{Result, ScraperError};
use crate::http_client::HttpUtils;
use crate::traits::{RawApiError, ScraperErrorMapper};
use crate::utils::log_sanitizer::redact_query;

use super::error::INVALID_SYMBOL;
use super::scraper::PageRequest;
use super::types::{AccountInfo, BinanceErrorResponse, ExchangeInfo, Trade};
use super::{BinanceScraper, MAX_PAGE_SIZE};

impl BinanceScraper {
    /// Signed GET against a `USER_DATA` endpoint.
    async fn signed_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        api_key: &str,
        api_secret: &str,
    ) -> Result<T> {
        let query = self.signed_query(params, api_secret, Utc::now().timestamp_millis())?;
        let url = format!("{}{path}?{query}", self.base_url);
        let request = self.client.get(&url).header("X-MBX-APIKEY", api_key);

        let resp = HttpUtils::execute_request(
            request,
            self.platform_name(),
            "GET",
            &format!("{path}?{}", redact_query(&query)),
        )
        .await?;

        if !resp.is_success() {
            let raw = match serde_json::from_str::<BinanceErrorResponse>(&resp.body) {
                Ok(e) => RawApiError::with_code(e.code.to_string(), e.msg),
                Err(_) => RawApiError::new(format!("HTTP {}", resp.status)),
            };
            return Err(self.map_error(raw.with_status(resp.status)));
        }

        HttpUtils::parse_json(&resp.body, self.platform_name())
    }

    pub(crate) async fn get_account(&self, api_key: &str, api_secret: &str) -> Result<AccountInfo> {
        self.signed_get("/api/v3/account", &[], api_key, api_secret)
            .await
    }

    /// Public pair list; no signature needed.
    pub(crate) async fn get_listed_symbols(&self) -> Result<ExchangeInfo> {
        let path = "/api/v3/exchangeInfo?permissions=SPOT";
        let request = self.client.get(format!("{}{path}", self.base_url));
        let resp =
            HttpUtils::execute_request(request, self.platform_name(), "GET", path).await?;
        if !resp.is_success() {
            return Err(self.map_error(
                RawApiError::new(format!("HTTP {}", resp.status)).with_status(resp.status),
            ));
        }
        HttpUtils::parse_json(&resp.body, self.platform_name())
    }

    /// One `myTrades` page. `Ok(None)` when the symbol does not exist.
    pub(crate) async fn get_trades_page(
        &self,
        symbol: &str,
        request: PageRequest,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Option<Vec<Trade>>> {
        let params = [
            ("symbol", symbol.to_string()),
            request.query_param(),
            ("limit", MAX_PAGE_SIZE.to_string()),
        ];
        match self
            .signed_get("/api/v3/myTrades", &params, api_key, api_secret)
            .await
        {
            Ok(trades) => Ok(Some(trades)),
            Err(ScraperError::ValidationError { ref field, .. }) if field == "symbol" => {
                log::debug!(
                    "[{}] {symbol} not listed ({INVALID_SYMBOL}), skipping",
                    self.platform_name()
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
