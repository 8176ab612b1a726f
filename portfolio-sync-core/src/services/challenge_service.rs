//! Two-phase verification for platforms that cannot sync unattended

use std::sync::Arc;

use chrono::{Duration, Utc};
use portfolio_sync_scraper::{InteractiveAuth, Scraper, ScraperError};

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::services::{CredentialService, ServiceContext, SyncService};
use crate::types::{Account, ChallengeCompletion, ChallengeState};

/// Upper bound on the verification window, whatever the platform announces.
const MAX_CHALLENGE_WINDOW_SECS: i64 = 600;

const RESTART_VERIFICATION: &str = "invalid or expired code - restart verification";

/// Drives `initiate -> complete` for one account.
///
/// The service is stateless; the [`ChallengeState`] returned by
/// [`initiate_challenge`](Self::initiate_challenge) must be handed back to
/// [`complete_challenge`](Self::complete_challenge). When completion fails, the caller
/// derives the next state with [`ChallengeState::after_error`].
pub struct ChallengeService {
    ctx: Arc<ServiceContext>,
    credentials: CredentialService,
    sync: SyncService,
}

impl ChallengeService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            credentials: CredentialService::new(Arc::clone(&ctx)),
            sync: SyncService::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    /// Phase one: log in with the stored credentials and trigger code delivery.
    pub async fn initiate_challenge(&self, account_id: &str) -> CoreResult<ChallengeState> {
        let account = self.ctx.get_account(account_id).await?;
        let credentials = self.credentials.open(&account)?;
        let scraper = self.ctx.get_scraper(account.platform)?;
        let auth = Self::interactive(scraper.as_ref(), &account)?;

        let challenge = auth.initiate_challenge(&credentials).await.map_err(|e| {
            let e = CoreError::from(e);
            e.log(&format!("Verification could not start for account {account_id}"));
            e
        })?;

        let window = i64::try_from(challenge.expires_in_secs)
            .map_or(MAX_CHALLENGE_WINDOW_SECS, |s| s.min(MAX_CHALLENGE_WINDOW_SECS));
        let expires_at = Utc::now() + Duration::seconds(window);
        log::info!("Verification started for account {account_id}, expires at {expires_at}");

        Ok(ChallengeState::challenged(challenge.process_id, expires_at))
    }

    /// Phase two: submit `code`, then sync the account with the resulting session.
    ///
    /// An expired or already-finished challenge is rejected before any network call. A
    /// rejected code surfaces as an auth error telling the user to restart verification.
    pub async fn complete_challenge(
        &self,
        account_id: &str,
        challenge: &ChallengeState,
        code: &str,
    ) -> CoreResult<ChallengeCompletion> {
        let process_id = challenge.pending_process_id(Utc::now())?;
        let code = code.trim();
        if code.is_empty() {
            return Err(CoreError::ValidationError(
                "verification code is required".to_string(),
            ));
        }

        let account = self.ctx.get_account(account_id).await?;
        let scraper = self.ctx.get_scraper(account.platform)?;
        let auth = Self::interactive(scraper.as_ref(), &account)?;

        let session = auth
            .complete_challenge(process_id, code)
            .await
            .map_err(|e| {
                let e = CoreError::from(restart_on_auth_failure(e));
                e.log(&format!("Verification failed for account {account_id}"));
                e
            })?;

        let state = challenge.completed()?;
        log::info!("Verification completed for account {account_id}");

        let sync_result = self
            .sync
            .sync_account_with_session(account_id, &session)
            .await;
        Ok(ChallengeCompletion { state, sync_result })
    }

    fn interactive<'a>(
        scraper: &'a dyn Scraper,
        account: &Account,
    ) -> CoreResult<&'a dyn InteractiveAuth> {
        scraper.interactive().ok_or_else(|| {
            CoreError::ValidationError(format!(
                "{} accounts do not use interactive verification",
                account.platform
            ))
        })
    }
}

fn restart_on_auth_failure(error: ScraperError) -> ScraperError {
    if error.kind() == ErrorKind::Auth {
        ScraperError::AuthError {
            platform: error.platform().to_string(),
            raw_message: Some(RESTART_VERIFICATION.to_string()),
        }
    } else {
        error
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use portfolio_sync_scraper::ScraperRegistry;

    use super::*;
    use crate::test_utils::{
        create_test_context_with, sample_transactions, sealed_account, MockScraper, TestFixture,
        MOCK_PROCESS_ID, MOCK_VALID_CODE,
    };
    use crate::types::{PlatformType, SyncStatus, SyncType};

    async fn fixture() -> (TestFixture, Arc<MockScraper>) {
        let scraper = Arc::new(MockScraper::new(PlatformType::TradeRepublic).with_interactive_auth());
        scraper
            .set_transactions(sample_transactions(PlatformType::TradeRepublic, 4))
            .await;
        let fixture = create_test_context_with(
            ScraperRegistry::new().register(Arc::clone(&scraper) as Arc<dyn Scraper>),
        );
        fixture
            .accounts
            .insert(sealed_account(&fixture.ctx, "tr-1", PlatformType::TradeRepublic))
            .await;
        (fixture, scraper)
    }

    #[tokio::test]
    async fn full_flow_syncs_with_the_session() {
        let (fixture, scraper) = fixture().await;
        let service = ChallengeService::new(Arc::clone(&fixture.ctx));

        let state = service.initiate_challenge("tr-1").await.unwrap();
        assert_eq!(
            state.pending_process_id(Utc::now()).unwrap(),
            MOCK_PROCESS_ID
        );

        let completion = service
            .complete_challenge("tr-1", &state, MOCK_VALID_CODE)
            .await
            .unwrap();
        assert_eq!(completion.state, ChallengeState::Completed);
        assert_eq!(completion.sync_result.status, SyncStatus::Success);
        assert_eq!(completion.sync_result.sync_type, SyncType::Full);
        assert_eq!(completion.sync_result.stored, 4);
        assert!(fixture.accounts.last_sync("tr-1").await.is_some());
        assert_eq!(scraper.since_calls().await, vec![None]);
    }

    #[tokio::test]
    async fn wrong_code_fails_with_restart_message() {
        let (fixture, _scraper) = fixture().await;
        let service = ChallengeService::new(Arc::clone(&fixture.ctx));
        let state = service.initiate_challenge("tr-1").await.unwrap();

        let err = service
            .complete_challenge("tr-1", &state, "0000")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "auth");
        assert!(!err.is_retryable());
        assert!(err.to_string().contains(RESTART_VERIFICATION));
        assert!(matches!(state.after_error(&err), ChallengeState::Failed { .. }));
        assert!(fixture.accounts.last_sync("tr-1").await.is_none());
    }

    #[tokio::test]
    async fn expired_challenge_is_rejected_before_any_network_call() {
        let (fixture, scraper) = fixture().await;
        let service = ChallengeService::new(Arc::clone(&fixture.ctx));
        let state = ChallengeState::challenged(MOCK_PROCESS_ID, Utc::now() - Duration::seconds(1));

        let err = service
            .complete_challenge("tr-1", &state, MOCK_VALID_CODE)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ChallengeExpired));
        assert_eq!(state.after_error(&err), ChallengeState::Expired);
        assert_eq!(scraper.completion_attempts(), 0);
    }

    #[tokio::test]
    async fn terminal_state_cannot_be_completed_again() {
        let (fixture, scraper) = fixture().await;
        let service = ChallengeService::new(Arc::clone(&fixture.ctx));

        let err = service
            .complete_challenge("tr-1", &ChallengeState::Completed, MOCK_VALID_CODE)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidChallengeState(_)));
        assert_eq!(scraper.completion_attempts(), 0);
    }

    #[tokio::test]
    async fn transport_failure_keeps_the_challenge_open() {
        let (fixture, scraper) = fixture().await;
        let service = ChallengeService::new(Arc::clone(&fixture.ctx));
        let state = service.initiate_challenge("tr-1").await.unwrap();
        scraper
            .set_completion_error(Some(ScraperError::NetworkError {
                platform: "traderepublic".to_string(),
                detail: "connection reset".to_string(),
            }))
            .await;

        let err = service
            .complete_challenge("tr-1", &state, MOCK_VALID_CODE)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(state.after_error(&err), state);
    }

    #[tokio::test]
    async fn blank_code_is_rejected_locally() {
        let (fixture, scraper) = fixture().await;
        let service = ChallengeService::new(Arc::clone(&fixture.ctx));
        let state = service.initiate_challenge("tr-1").await.unwrap();

        let err = service
            .complete_challenge("tr-1", &state, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(scraper.completion_attempts(), 0);
    }

    #[tokio::test]
    async fn non_interactive_platform_is_rejected() {
        let binance = Arc::new(MockScraper::new(PlatformType::Binance));
        let fixture = create_test_context_with(
            ScraperRegistry::new().register(Arc::clone(&binance) as Arc<dyn Scraper>),
        );
        fixture
            .accounts
            .insert(sealed_account(&fixture.ctx, "bn-1", PlatformType::Binance))
            .await;

        let err = ChallengeService::new(Arc::clone(&fixture.ctx))
            .initiate_challenge("bn-1")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let (fixture, _scraper) = fixture().await;
        let err = ChallengeService::new(Arc::clone(&fixture.ctx))
            .initiate_challenge("nope")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound(_)));
    }
}
