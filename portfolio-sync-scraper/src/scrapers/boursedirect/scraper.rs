//! Bourse Direct `Scraper` implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::scrapers::common::{parse_localized_decimal, sort_chronologically};
use crate::traits::{Scraper, ScraperErrorMapper};
use crate::types::{
    CredentialField, IncrementalBoundary, PlatformCredentials, PlatformMetadata, PlatformType,
    Transaction, TransactionKind,
};
use crate::utils::datetime::parse_flexible;

use super::BourseDirectScraper;
use super::types::Operation;

/// Keep what happened on or after the checkpoint's day.
///
/// History dates have day granularity, so the checkpoint's day is always returned again and
/// storage deduplicates it.
pub(crate) fn from_checkpoint_day(
    transactions: Vec<Transaction>,
    since: Option<DateTime<Utc>>,
) -> Vec<Transaction> {
    let Some(day) = since.map(|dt| dt.date_naive()) else {
        return transactions;
    };
    transactions
        .into_iter()
        .filter(|tx| tx.executed_at.date_naive() >= day)
        .collect()
}

impl BourseDirectScraper {
    fn decimal(&self, field: &str, raw: Option<&str>) -> Result<Decimal> {
        let Some(raw) = raw else {
            return Ok(Decimal::ZERO);
        };
        parse_localized_decimal(raw)
            .ok_or_else(|| self.parse_error(format!("invalid {field} '{raw}'")))
    }

    pub(crate) fn operation_to_transaction(&self, op: Operation) -> Result<Transaction> {
        let kind = match op.operation_type.to_uppercase().as_str() {
            "ACHAT" | "ACHAT COMPTANT" => TransactionKind::Buy,
            "VENTE" | "VENTE COMPTANT" => TransactionKind::Sell,
            "DIVIDENDE" | "COUPON" | "COUPONS" => TransactionKind::Dividend,
            "VERSEMENT" | "VIREMENT RECU" => TransactionKind::Deposit,
            "RETRAIT" | "VIREMENT EMIS" => TransactionKind::Withdrawal,
            "INTERETS" => TransactionKind::Interest,
            "FRAIS" | "DROITS DE GARDE" | "TTF" => TransactionKind::Fee,
            _ => TransactionKind::Other,
        };
        let executed_at = parse_flexible(&op.date)
            .ok_or_else(|| self.parse_error(format!("invalid date '{}'", op.date)))?;

        Ok(Transaction {
            quantity: self.decimal("quantite", op.quantite.as_deref())?.abs(),
            unit_price: self.decimal("cours", op.cours.as_deref())?,
            amount: self.decimal("montant", Some(&op.montant))?,
            fee: self.decimal("frais", op.frais.as_deref())?.abs(),
            external_id: op.reference,
            account_id: String::new(),
            platform: PlatformType::BourseDirect,
            kind,
            symbol: op.isin.filter(|s| !s.is_empty()).or_else(|| {
                matches!(kind, TransactionKind::Buy | TransactionKind::Sell)
                    .then(|| op.libelle.clone())
            }),
            currency: op.devise,
            executed_at,
        })
    }
}

#[async_trait]
impl Scraper for BourseDirectScraper {
    fn id(&self) -> &'static str {
        "boursedirect"
    }

    fn platform(&self) -> PlatformType {
        PlatformType::BourseDirect
    }

    fn metadata() -> PlatformMetadata {
        PlatformMetadata {
            id: PlatformType::BourseDirect,
            name: "Bourse Direct".to_string(),
            description: "French online broker, operations history from the web account"
                .to_string(),
            required_fields: vec![
                CredentialField {
                    key: "username".to_string(),
                    label: "Username".to_string(),
                    secret: false,
                    help_text: None,
                },
                CredentialField {
                    key: "password".to_string(),
                    label: "Password".to_string(),
                    secret: true,
                    help_text: None,
                },
            ],
            requires_interactive_auth: PlatformType::BourseDirect.requires_interactive_auth(),
            incremental_boundary: IncrementalBoundary::AtOrAfter,
        }
    }

    async fn fetch_transactions(
        &self,
        credentials: &PlatformCredentials,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>> {
        let PlatformCredentials::BourseDirect { username, password } = credentials else {
            return Err(self.auth_error(format!(
                "credentials for {} cannot log into Bourse Direct",
                credentials.platform()
            )));
        };

        let client = Self::session_client()?;
        self.login(&client, username, password).await?;

        let since_day = since.map(|dt| dt.date_naive());
        let history = self.get_history(&client, since_day).await?;

        let parsed = history
            .operations
            .into_iter()
            .map(|op| self.operation_to_transaction(op))
            .collect::<Result<Vec<_>>>()?;
        let mut transactions = from_checkpoint_day(parsed, since);

        sort_chronologically(&mut transactions);
        log::info!(
            "[{}] Fetched {} operations",
            self.platform_name(),
            transactions.len()
        );
        Ok(transactions)
    }
}
