//! Sync orchestrator
//!
//! One call of [`SyncService::sync_account`] runs the whole pipeline for an account:
//!
//! ```text
//! load account -> decrypt -> parse credentials -> resolve scraper -> fetch -> persist -> checkpoint
//! ```
//!
//! Every stage up to and including persistence is fail-fast. The checkpoint update is best
//! effort: if it fails the stored records stay and the result is reported as partial. The
//! orchestrator never retries; the caller decides when to run again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use portfolio_sync_scraper::{AuthSession, Scraper, ScraperError};

use crate::error::{CoreError, CoreResult};
use crate::services::{CredentialService, ServiceContext};
use crate::types::{
    Account, PlatformCredentials, SyncResult, SyncStage, SyncType, Transaction,
};

/// How the fetch stage authenticates.
#[derive(Clone, Copy)]
enum FetchMode<'a> {
    /// Stored credentials only.
    Unattended,
    /// A session obtained through a completed verification.
    Session(&'a AuthSession),
}

/// Sync orchestrator service
#[derive(Clone)]
pub struct SyncService {
    ctx: Arc<ServiceContext>,
    credentials: CredentialService,
}

impl SyncService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            credentials: CredentialService::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    /// Sync one account with its stored credentials.
    ///
    /// Never fails: every outcome, including an unknown account, is described by the
    /// returned [`SyncResult`].
    pub async fn sync_account(&self, account_id: &str) -> SyncResult {
        self.run(account_id, FetchMode::Unattended).await
    }

    /// Sync one account through an authenticated session from a completed verification.
    pub async fn sync_account_with_session(
        &self,
        account_id: &str,
        session: &AuthSession,
    ) -> SyncResult {
        self.run(account_id, FetchMode::Session(session)).await
    }

    /// Sync every account that can run unattended.
    ///
    /// Accounts on platforms that need interactive verification are skipped and do not
    /// appear in the output. A failing account never stops the batch.
    pub async fn sync_all_accounts(&self) -> CoreResult<Vec<SyncResult>> {
        let accounts = self.ctx.account_repository.find_all().await?;
        log::info!("Fleet sync started: {} accounts", accounts.len());

        let mut results = Vec::with_capacity(accounts.len());
        for account in accounts {
            if self.requires_interactive_auth(&account) {
                log::debug!(
                    "Skipping account {} ({}): interactive verification required",
                    account.id,
                    account.platform
                );
                continue;
            }
            results.push(self.sync_account(&account.id).await);
        }

        Ok(results)
    }

    fn requires_interactive_auth(&self, account: &Account) -> bool {
        account.platform.requires_interactive_auth()
            || self
                .ctx
                .registry
                .get(account.platform)
                .is_ok_and(|scraper| scraper.interactive().is_some())
    }

    async fn run(&self, account_id: &str, mode: FetchMode<'_>) -> SyncResult {
        let mut result = SyncResult::begin(account_id);
        log::info!("Sync started for account {account_id}");

        // 1. Load account
        let account = match self.ctx.get_account(account_id).await {
            Ok(account) => account,
            Err(e) => return Self::abort(result, SyncStage::LoadAccount, &e),
        };
        result.platform = Some(account.platform);
        result.sync_type = if account.last_sync.is_some() {
            SyncType::Incremental
        } else {
            SyncType::Full
        };

        // 2-3. Decrypt and parse credentials
        let map = match self.credentials.decrypt_map(&account) {
            Ok(map) => map,
            Err(e) => {
                let stage = match e {
                    CoreError::ParseError(_) => SyncStage::ParseCredentials,
                    _ => SyncStage::DecryptCredentials,
                };
                return Self::abort(result, stage, &e);
            }
        };
        // Missing or malformed fields in a stored map count as a parse failure.
        let credentials = match CredentialService::parse_map(account.platform, &map) {
            Ok(credentials) => credentials,
            Err(e) => {
                let e = CoreError::ParseError(e.to_string());
                return Self::abort(result, SyncStage::ParseCredentials, &e);
            }
        };

        // 4. Resolve scraper
        let scraper = match self.ctx.get_scraper(account.platform) {
            Ok(scraper) => scraper,
            Err(e) => return Self::abort(result, SyncStage::ResolveScraper, &e),
        };

        // 5-6. Fetch
        let since = account.last_sync;
        let fetch_started = Utc::now();
        let mut transactions = match self
            .fetch(scraper.as_ref(), mode, &credentials, since)
            .await
        {
            Ok(transactions) => transactions,
            Err(e) => return Self::abort(result, SyncStage::Fetch, &CoreError::Scraper(e)),
        };

        // 7. Stamp ownership
        for transaction in &mut transactions {
            transaction.account_id.clone_from(&account.id);
        }
        result.fetched = transactions.len();
        log::debug!(
            "Fetched {} transactions for account {account_id} ({:?}, since {since:?})",
            result.fetched,
            result.sync_type
        );

        // 8. Persist
        result.stored = match self.persist(&account, &transactions).await {
            Ok(stored) => stored,
            Err(e) => return Self::abort(result, SyncStage::Persist, &e),
        };

        // 9. Advance checkpoint
        let checkpoint = since.map_or(fetch_started, |prior| prior.max(fetch_started));
        if let Err(e) = self
            .ctx
            .account_repository
            .update_last_sync(&account.id, checkpoint)
            .await
        {
            e.log(&format!(
                "Sync of account {account_id} stored {} records but could not advance the checkpoint",
                result.stored
            ));
            return result.partial(&e);
        }

        let result = result.succeeded(checkpoint);
        log::info!(
            "Sync finished for account {account_id}: fetched {}, stored {}, {}ms",
            result.fetched,
            result.stored,
            result.duration_ms
        );
        result
    }

    async fn fetch(
        &self,
        scraper: &dyn Scraper,
        mode: FetchMode<'_>,
        credentials: &PlatformCredentials,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>, ScraperError> {
        let limit = self.ctx.config.fetch_timeout;
        let outcome = match mode {
            FetchMode::Unattended => {
                tokio::time::timeout(limit, scraper.fetch_transactions(credentials, since)).await
            }
            FetchMode::Session(session) => {
                let Some(auth) = scraper.interactive() else {
                    return Err(ScraperError::ValidationError {
                        platform: scraper.id().to_string(),
                        field: "session".to_string(),
                        detail: "platform does not use interactive verification".to_string(),
                    });
                };
                tokio::time::timeout(limit, auth.fetch_with_session(session, since)).await
            }
        };

        outcome.unwrap_or_else(|_| {
            Err(ScraperError::Timeout {
                platform: scraper.id().to_string(),
                detail: format!("fetch did not complete within {}s", limit.as_secs()),
            })
        })
    }

    async fn persist(&self, account: &Account, transactions: &[Transaction]) -> CoreResult<usize> {
        if transactions.is_empty() {
            return Ok(0);
        }
        self.ctx
            .transaction_repository
            .create_batch(transactions, account.platform)
            .await
    }

    fn abort(result: SyncResult, stage: SyncStage, error: &CoreError) -> SyncResult {
        error.log(&format!(
            "Sync of account {} failed at {stage:?}",
            result.account_id
        ));
        result.failed(stage, error)
    }
}
