//! Trade Republic `Scraper` / `InteractiveAuth` implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::scrapers::common::sort_chronologically;
use crate::traits::{InteractiveAuth, Scraper, ScraperErrorMapper};
use crate::types::{
    AuthSession, CredentialField, IncrementalBoundary, LoginChallenge, PlatformCredentials,
    PlatformMetadata, PlatformType, Transaction, TransactionKind,
};
use crate::utils::datetime::parse_flexible;

use super::TradeRepublicScraper;
use super::types::TimelineItem;

/// Upper bound on timeline pages walked in one fetch.
const MAX_PAGES: usize = 500;

/// Split a newest-first timeline page at the checkpoint.
///
/// Returns the transactions strictly after `since` and whether the checkpoint was reached,
/// in which case older pages hold nothing new.
pub(crate) fn cut_at_checkpoint(
    page: Vec<Transaction>,
    since: Option<DateTime<Utc>>,
) -> (Vec<Transaction>, bool) {
    let Some(since) = since else {
        return (page, false);
    };
    let mut newer = Vec::with_capacity(page.len());
    for tx in page {
        if tx.executed_at <= since {
            return (newer, true);
        }
        newer.push(tx);
    }
    (newer, false)
}

impl TradeRepublicScraper {
    /// Map a timeline event onto a transaction. Returns `Ok(None)` for events that do not
    /// move money (notifications, cancelled orders).
    pub(crate) fn item_to_transaction(&self, item: TimelineItem) -> Result<Option<Transaction>> {
        if item
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("CANCELED"))
        {
            return Ok(None);
        }

        let kind = match item.event_type.as_str() {
            "TRADING_TRADE_EXECUTED" | "TRADING_SAVINGSPLAN_EXECUTED" | "ORDER_EXECUTED" => {
                if item.amount.value.is_sign_negative() {
                    TransactionKind::Buy
                } else {
                    TransactionKind::Sell
                }
            }
            "PAYMENT_INBOUND" | "PAYMENT_INBOUND_SEPA_DIRECT_DEBIT" | "INCOMING_TRANSFER" => {
                TransactionKind::Deposit
            }
            "PAYMENT_OUTBOUND" | "OUTGOING_TRANSFER" => TransactionKind::Withdrawal,
            "CREDIT" | "SSP_CORPORATE_ACTION_CASH" => TransactionKind::Dividend,
            "INTEREST_PAYOUT" | "INTEREST_PAYOUT_CREATED" => TransactionKind::Interest,
            "TAX_CORRECTION" | "CARD_TRANSACTION" => TransactionKind::Other,
            other => {
                log::debug!("[{}] Skipping event type {other}", self.platform_name());
                return Ok(None);
            }
        };

        let executed_at = parse_flexible(&item.timestamp).ok_or_else(|| {
            self.parse_error(format!("invalid timestamp '{}'", item.timestamp))
        })?;

        let quantity = item.shares.unwrap_or(Decimal::ZERO).abs();
        let unit_price = if quantity.is_zero() {
            Decimal::ZERO
        } else {
            (item.amount.value.abs() / quantity).round_dp(8)
        };

        Ok(Some(Transaction {
            external_id: item.id,
            account_id: String::new(),
            platform: PlatformType::TradeRepublic,
            kind,
            symbol: item.isin.or_else(|| {
                matches!(kind, TransactionKind::Buy | TransactionKind::Sell)
                    .then(|| item.title.clone())
            }),
            quantity,
            unit_price,
            amount: item.amount.value,
            fee: item.fee.map_or(Decimal::ZERO, |f| f.value.abs()),
            currency: item.amount.currency,
            executed_at,
        }))
    }
}

#[async_trait]
impl Scraper for TradeRepublicScraper {
    fn id(&self) -> &'static str {
        "traderepublic"
    }

    fn platform(&self) -> PlatformType {
        PlatformType::TradeRepublic
    }

    fn metadata() -> PlatformMetadata {
        PlatformMetadata {
            id: PlatformType::TradeRepublic,
            name: "Trade Republic".to_string(),
            description: "Neo-broker; every login is confirmed with a code sent to the app"
                .to_string(),
            required_fields: vec![
                CredentialField {
                    key: "phone".to_string(),
                    label: "Phone number".to_string(),
                    secret: false,
                    help_text: Some("International format, e.g. +4915112345678".to_string()),
                },
                CredentialField {
                    key: "pin".to_string(),
                    label: "PIN".to_string(),
                    secret: true,
                    help_text: Some("4-digit app PIN".to_string()),
                },
            ],
            requires_interactive_auth: PlatformType::TradeRepublic.requires_interactive_auth(),
            incremental_boundary: IncrementalBoundary::StrictlyAfter,
        }
    }

    async fn fetch_transactions(
        &self,
        _credentials: &PlatformCredentials,
        _since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>> {
        Err(self.auth_error("interactive verification required"))
    }

    fn interactive(&self) -> Option<&dyn InteractiveAuth> {
        Some(self)
    }
}

#[async_trait]
impl InteractiveAuth for TradeRepublicScraper {
    async fn initiate_challenge(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<LoginChallenge> {
        let PlatformCredentials::TradeRepublic { phone, pin } = credentials else {
            return Err(self.auth_error(format!(
                "credentials for {} cannot log into Trade Republic",
                credentials.platform()
            )));
        };
        let resp = self.post_login(phone, pin).await?;
        log::info!(
            "[{}] Verification code sent, valid for {}s",
            self.platform_name(),
            resp.countdown_in_seconds
        );
        Ok(LoginChallenge {
            process_id: resp.process_id,
            expires_in_secs: resp.countdown_in_seconds,
            requires_second_factor: true,
        })
    }

    async fn complete_challenge(&self, process_id: &str, code: &str) -> Result<AuthSession> {
        let token = self.post_verification(process_id, code).await?;
        log::info!("[{}] Verification accepted", self.platform_name());
        Ok(AuthSession::new(token))
    }

    async fn fetch_with_session(
        &self,
        session: &AuthSession,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = self
                .get_timeline_page(&session.token, cursor.as_deref())
                .await?;
            let mut mapped = Vec::with_capacity(page.items.len());
            for item in page.items {
                if let Some(tx) = self.item_to_transaction(item)? {
                    mapped.push(tx);
                }
            }

            let (newer, reached) = cut_at_checkpoint(mapped, since);
            transactions.extend(newer);
            if reached {
                break;
            }
            match page.cursors.after {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        sort_chronologically(&mut transactions);
        log::info!(
            "[{}] Fetched {} transactions",
            self.platform_name(),
            transactions.len()
        );
        Ok(transactions)
    }
}
