//! Binance `Scraper` implementation

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::scrapers::common::sort_chronologically;
use crate::traits::{Scraper, ScraperErrorMapper};
use crate::types::{
    CredentialField, IncrementalBoundary, PlatformCredentials, PlatformMetadata, PlatformType,
    Transaction, TransactionKind,
};
use crate::utils::datetime::parse_unix_timestamp;

use super::types::{AccountInfo, SymbolInfo, Trade};
use super::{BinanceScraper, MAX_PAGE_SIZE, QUOTE_ASSETS};

/// Where one `myTrades` request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageRequest {
    /// Trades with an id at or above this one.
    FromId(u64),
    /// Oldest trades at or after this instant (milliseconds since the epoch).
    StartTime(i64),
}

impl PageRequest {
    /// First page: the whole history, or everything strictly after the checkpoint.
    pub(crate) fn first(since: Option<DateTime<Utc>>) -> Self {
        since.map_or(Self::FromId(0), |since| {
            Self::StartTime(since.timestamp_millis() + 1)
        })
    }

    /// Page following `page`, or `None` once a short page shows the history is exhausted.
    pub(crate) fn next(page: &[Trade]) -> Option<Self> {
        if page.len() < MAX_PAGE_SIZE {
            return None;
        }
        page.iter().map(|t| t.id).max().map(|id| Self::FromId(id + 1))
    }

    pub(crate) fn query_param(self) -> (&'static str, String) {
        match self {
            Self::FromId(id) => ("fromId", id.to_string()),
            Self::StartTime(ms) => ("startTime", ms.to_string()),
        }
    }
}

impl BinanceScraper {
    /// Listed pairs worth querying: every wallet asset, held or not, against each quote.
    pub(crate) fn candidate_symbols(
        account: &AccountInfo,
        listed: &[SymbolInfo],
    ) -> Vec<(String, &'static str)> {
        let assets: HashSet<&str> = account.balances.iter().map(|b| b.asset.as_str()).collect();
        let mut symbols: Vec<(String, &'static str)> = listed
            .iter()
            .filter(|s| assets.contains(s.base_asset.as_str()))
            .filter_map(|s| {
                QUOTE_ASSETS
                    .iter()
                    .find(|quote| **quote == s.quote_asset)
                    .map(|quote| (s.symbol.clone(), *quote))
            })
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    pub(crate) fn trade_to_transaction(&self, trade: Trade, quote: &str) -> Result<Transaction> {
        let executed_at = parse_unix_timestamp(trade.time)
            .ok_or_else(|| self.parse_error(format!("invalid trade time {}", trade.time)))?;
        let (kind, amount) = if trade.is_buyer {
            (TransactionKind::Buy, -trade.quote_qty)
        } else {
            (TransactionKind::Sell, trade.quote_qty)
        };
        // Commission paid in BNB or the base asset is not expressible in the quote currency.
        let fee = if trade.commission_asset == quote {
            trade.commission
        } else {
            Decimal::ZERO
        };

        Ok(Transaction {
            external_id: format!("{}-{}", trade.symbol, trade.id),
            account_id: String::new(),
            platform: PlatformType::Binance,
            kind,
            symbol: Some(trade.symbol),
            quantity: trade.qty,
            unit_price: trade.price,
            amount,
            fee,
            currency: quote.to_string(),
            executed_at,
        })
    }

    async fn fetch_symbol(
        &self,
        symbol: &str,
        quote: &str,
        api_key: &str,
        api_secret: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();
        let mut request = PageRequest::first(since);
        loop {
            let Some(page) = self
                .get_trades_page(symbol, request, api_key, api_secret)
                .await?
            else {
                return Ok(transactions);
            };
            let next = PageRequest::next(&page);
            for trade in page {
                let tx = self.trade_to_transaction(trade, quote)?;
                if since.is_none_or(|since| tx.executed_at > since) {
                    transactions.push(tx);
                }
            }
            match next {
                Some(next) => request = next,
                None => return Ok(transactions),
            }
        }
    }
}

#[async_trait]
impl Scraper for BinanceScraper {
    fn id(&self) -> &'static str {
        "binance"
    }

    fn platform(&self) -> PlatformType {
        PlatformType::Binance
    }

    fn metadata() -> PlatformMetadata {
        PlatformMetadata {
            id: PlatformType::Binance,
            name: "Binance".to_string(),
            description: "Spot trade history via a read-only API key".to_string(),
            required_fields: vec![
                CredentialField {
                    key: "apiKey".to_string(),
                    label: "API Key".to_string(),
                    secret: false,
                    help_text: None,
                },
                CredentialField {
                    key: "apiSecret".to_string(),
                    label: "API Secret".to_string(),
                    secret: true,
                    help_text: Some("Read-only permission is sufficient".to_string()),
                },
            ],
            requires_interactive_auth: PlatformType::Binance.requires_interactive_auth(),
            incremental_boundary: IncrementalBoundary::StrictlyAfter,
        }
    }

    async fn fetch_transactions(
        &self,
        credentials: &PlatformCredentials,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>> {
        let PlatformCredentials::Binance {
            api_key,
            api_secret,
        } = credentials
        else {
            return Err(self.auth_error(format!(
                "credentials for {} cannot authenticate against Binance",
                credentials.platform()
            )));
        };

        let account = self.get_account(api_key, api_secret).await?;
        let listed = self.get_listed_symbols().await?;
        let symbols = Self::candidate_symbols(&account, &listed.symbols);
        log::debug!(
            "[{}] Querying {} candidate symbols",
            self.platform_name(),
            symbols.len()
        );

        let mut transactions = Vec::new();
        for (symbol, quote) in &symbols {
            transactions.extend(
                self.fetch_symbol(symbol, quote, api_key, api_secret, since)
                    .await?,
            );
        }

        sort_chronologically(&mut transactions);
        log::info!(
            "[{}] Fetched {} trades",
            self.platform_name(),
            transactions.len()
        );
        Ok(transactions)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn scraper() -> BinanceScraper {
        BinanceScraper::new().unwrap()
    }

    fn listed(pairs: &[(&str, &str, &str)]) -> Vec<SymbolInfo> {
        pairs
            .iter()
            .map(|(symbol, base, quote)| SymbolInfo {
                symbol: (*symbol).to_string(),
                base_asset: (*base).to_string(),
                quote_asset: (*quote).to_string(),
            })
            .collect()
    }

    fn trades(ids: std::ops::Range<u64>) -> Vec<Trade> {
        ids.map(|id| Trade {
            symbol: "BTCUSDT".to_string(),
            id,
            price: dec!(1),
            qty: dec!(1),
            quote_qty: dec!(1),
            commission: Decimal::ZERO,
            commission_asset: "USDT".to_string(),
            time: 1_700_000_000_000,
            is_buyer: true,
        })
        .collect()
    }

    #[test]
    fn candidate_symbols_include_emptied_assets() {
        let account: AccountInfo = serde_json::from_str(
            r#"{"balances":[
                {"asset":"BTC","free":"0.5","locked":"0.0"},
                {"asset":"ETH","free":"0","locked":"0"},
                {"asset":"EUR","free":"10","locked":"0"}
            ]}"#,
        )
        .unwrap();
        let pairs = listed(&[
            ("BTCUSDT", "BTC", "USDT"),
            ("BTCEUR", "BTC", "EUR"),
            ("ETHUSDT", "ETH", "USDT"),
            ("ETHBTC", "ETH", "BTC"),
            ("ETHGBP", "ETH", "GBP"),
            ("SOLUSDT", "SOL", "USDT"),
        ]);
        let symbols: Vec<String> = BinanceScraper::candidate_symbols(&account, &pairs)
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        assert_eq!(symbols, ["BTCEUR", "BTCUSDT", "ETHBTC", "ETHUSDT"]);
    }

    #[test]
    fn full_fetch_pages_from_the_first_trade_id() {
        assert_eq!(PageRequest::first(None), PageRequest::FromId(0));
        assert_eq!(
            PageRequest::next(&trades(1..1 + MAX_PAGE_SIZE as u64)),
            Some(PageRequest::FromId(1 + MAX_PAGE_SIZE as u64))
        );
        assert_eq!(PageRequest::next(&trades(5..8)), None);
        assert_eq!(PageRequest::next(&[]), None);
    }

    #[test]
    fn incremental_fetch_starts_strictly_after_the_checkpoint() {
        let since = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let first = PageRequest::first(Some(since));
        assert_eq!(first, PageRequest::StartTime(1_700_000_000_001));
        assert_eq!(
            first.query_param(),
            ("startTime", "1700000000001".to_string())
        );
    }

    #[test]
    fn buyer_trade_is_negative_cash() {
        let trade: Trade = serde_json::from_str(
            r#"{"symbol":"BTCUSDT","id":28457,"orderId":100234,"price":"4.00000100","qty":"12.00000000",
                "quoteQty":"48.000012","commission":"10.10000000","commissionAsset":"USDT",
                "time":1499865549590,"isBuyer":true,"isMaker":false,"isBestMatch":true}"#,
        )
        .unwrap();
        let tx = scraper().trade_to_transaction(trade, "USDT").unwrap();
        assert_eq!(tx.external_id, "BTCUSDT-28457");
        assert_eq!(tx.kind, TransactionKind::Buy);
        assert_eq!(tx.amount, dec!(-48.000012));
        assert_eq!(tx.fee, dec!(10.1));
        assert_eq!(tx.executed_at.timestamp_millis(), 1_499_865_549_590);
    }

    #[test]
    fn foreign_commission_asset_not_counted() {
        let trade: Trade = serde_json::from_str(
            r#"{"symbol":"ETHEUR","id":1,"price":"2000","qty":"1","quoteQty":"2000",
                "commission":"0.001","commissionAsset":"BNB","time":1700000000000,"isBuyer":false}"#,
        )
        .unwrap();
        let tx = scraper().trade_to_transaction(trade, "EUR").unwrap();
        assert_eq!(tx.kind, TransactionKind::Sell);
        assert_eq!(tx.fee, Decimal::ZERO);
        assert_eq!(tx.currency, "EUR");
    }

    #[tokio::test]
    async fn rejects_foreign_credentials() {
        let creds = PlatformCredentials::BourseDirect {
            username: "u".to_string(),
            password: "p".to_string(),
        };
        let err = scraper().fetch_transactions(&creds, None).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Auth);
    }
}
