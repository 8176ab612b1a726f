//! Test helper module
//!
//! Mock collaborators and factory methods for service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use portfolio_sync_scraper::{
    AuthSession, IncrementalBoundary, InteractiveAuth, LoginChallenge, Scraper, ScraperError,
    ScraperRegistry,
};
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::services::{CredentialService, ServiceContext};
use crate::traits::{AccountRepository, PriceService, TransactionRepository};
use crate::types::{
    Account, PlatformCredentials, PlatformMetadata, PlatformType, SyncConfig, Transaction,
    TransactionKind,
};
use crate::vault::CredentialVault;

pub const TEST_KEY: [u8; 32] = [42u8; 32];
pub const MOCK_PROCESS_ID: &str = "proc-0001";
pub const MOCK_VALID_CODE: &str = "1234";
const MOCK_SESSION_TOKEN: &str = "session-ok";

// ===== MockAccountRepository =====

pub struct MockAccountRepository {
    accounts: RwLock<HashMap<String, Account>>,
    /// If Some, update_last_sync returns this error
    update_error: RwLock<Option<String>>,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            update_error: RwLock::new(None),
        }
    }

    pub async fn insert(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.id.clone(), account);
    }

    pub async fn last_sync(&self, id: &str) -> Option<DateTime<Utc>> {
        self.accounts
            .read()
            .await
            .get(id)
            .and_then(|a| a.last_sync)
    }

    pub async fn set_last_sync(&self, id: &str, last_sync: Option<DateTime<Utc>>) {
        if let Some(account) = self.accounts.write().await.get_mut(id) {
            account.last_sync = last_sync;
        }
    }

    pub async fn set_update_error(&self, err: Option<String>) {
        *self.update_error.write().await = err;
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    async fn find_all(&self) -> CoreResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn update_last_sync(&self, id: &str, timestamp: DateTime<Utc>) -> CoreResult<()> {
        if let Some(ref msg) = *self.update_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        let mut store = self.accounts.write().await;
        let account = store
            .get_mut(id)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))?;
        account.last_sync = account.last_sync.max(Some(timestamp));
        Ok(())
    }
}

// ===== MockTransactionRepository =====

/// Deduplicates on `(platform, external_id)` like a unique index would.
pub struct MockTransactionRepository {
    stored: RwLock<HashMap<(PlatformType, String), Transaction>>,
    error: RwLock<Option<String>>,
}

impl MockTransactionRepository {
    pub fn new() -> Self {
        Self {
            stored: RwLock::new(HashMap::new()),
            error: RwLock::new(None),
        }
    }

    pub async fn set_error(&self, err: Option<String>) {
        *self.error.write().await = err;
    }

    pub async fn stored(&self) -> Vec<Transaction> {
        self.stored.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl TransactionRepository for MockTransactionRepository {
    async fn create_batch(
        &self,
        transactions: &[Transaction],
        platform: PlatformType,
    ) -> CoreResult<usize> {
        if let Some(ref msg) = *self.error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        let mut store = self.stored.write().await;
        let mut inserted = 0;
        for transaction in transactions {
            let key = (platform, transaction.external_id.clone());
            if !store.contains_key(&key) {
                store.insert(key, transaction.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

// ===== MockPriceService =====

pub struct MockPriceService {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl MockPriceService {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PriceService for MockPriceService {
    async fn update_all_prices(&self) -> CoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::StorageError("quote feed unavailable".to_string()));
        }
        Ok(())
    }
}

// ===== MockScraper =====

/// Scraper returning canned transactions.
///
/// With [`with_interactive_auth`](Self::with_interactive_auth) it behaves like a platform
/// needing a verification code: unattended fetches fail, and the code is [`MOCK_VALID_CODE`].
pub struct MockScraper {
    platform: PlatformType,
    interactive: bool,
    delay: Option<Duration>,
    transactions: RwLock<Vec<Transaction>>,
    error: RwLock<Option<ScraperError>>,
    completion_error: RwLock<Option<ScraperError>>,
    since_calls: RwLock<Vec<Option<DateTime<Utc>>>>,
    completion_attempts: AtomicUsize,
}

impl MockScraper {
    pub fn new(platform: PlatformType) -> Self {
        Self {
            platform,
            interactive: false,
            delay: None,
            transactions: RwLock::new(Vec::new()),
            error: RwLock::new(None),
            completion_error: RwLock::new(None),
            since_calls: RwLock::new(Vec::new()),
            completion_attempts: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_interactive_auth(mut self) -> Self {
        self.interactive = true;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn set_transactions(&self, transactions: Vec<Transaction>) {
        *self.transactions.write().await = transactions;
    }

    pub async fn set_error(&self, err: Option<ScraperError>) {
        *self.error.write().await = err;
    }

    pub async fn set_completion_error(&self, err: Option<ScraperError>) {
        *self.completion_error.write().await = err;
    }

    /// The `since` argument of every fetch, in call order.
    pub async fn since_calls(&self) -> Vec<Option<DateTime<Utc>>> {
        self.since_calls.read().await.clone()
    }

    pub fn completion_attempts(&self) -> usize {
        self.completion_attempts.load(Ordering::SeqCst)
    }

    fn auth_error(&self, message: &str) -> ScraperError {
        ScraperError::AuthError {
            platform: self.platform.as_str().to_string(),
            raw_message: Some(message.to_string()),
        }
    }

    async fn serve(&self, since: Option<DateTime<Utc>>) -> portfolio_sync_scraper::Result<Vec<Transaction>> {
        self.since_calls.write().await.push(since);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.error.read().await.clone() {
            return Err(err);
        }
        Ok(self.transactions.read().await.clone())
    }
}

#[async_trait]
impl Scraper for MockScraper {
    fn id(&self) -> &'static str {
        self.platform.as_str()
    }

    fn platform(&self) -> PlatformType {
        self.platform
    }

    fn metadata() -> PlatformMetadata {
        PlatformMetadata {
            id: PlatformType::Binance,
            name: "Mock".to_string(),
            description: "In-memory scraper".to_string(),
            required_fields: Vec::new(),
            requires_interactive_auth: false,
            incremental_boundary: IncrementalBoundary::StrictlyAfter,
        }
    }

    async fn fetch_transactions(
        &self,
        _credentials: &PlatformCredentials,
        since: Option<DateTime<Utc>>,
    ) -> portfolio_sync_scraper::Result<Vec<Transaction>> {
        if self.interactive {
            return Err(self.auth_error("interactive verification required"));
        }
        self.serve(since).await
    }

    fn interactive(&self) -> Option<&dyn InteractiveAuth> {
        if self.interactive {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl InteractiveAuth for MockScraper {
    async fn initiate_challenge(
        &self,
        _credentials: &PlatformCredentials,
    ) -> portfolio_sync_scraper::Result<LoginChallenge> {
        Ok(LoginChallenge {
            process_id: MOCK_PROCESS_ID.to_string(),
            expires_in_secs: 30,
            requires_second_factor: true,
        })
    }

    async fn complete_challenge(
        &self,
        process_id: &str,
        code: &str,
    ) -> portfolio_sync_scraper::Result<AuthSession> {
        self.completion_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.completion_error.read().await.clone() {
            return Err(err);
        }
        if process_id != MOCK_PROCESS_ID || code != MOCK_VALID_CODE {
            return Err(self.auth_error("VALIDATION_CODE_INVALID"));
        }
        Ok(AuthSession::new(MOCK_SESSION_TOKEN))
    }

    async fn fetch_with_session(
        &self,
        session: &AuthSession,
        since: Option<DateTime<Utc>>,
    ) -> portfolio_sync_scraper::Result<Vec<Transaction>> {
        if *session != AuthSession::new(MOCK_SESSION_TOKEN) {
            return Err(self.auth_error("session rejected"));
        }
        self.serve(since).await
    }
}

// ===== Factory methods =====

/// A service context plus handles on its mocks.
pub struct TestFixture {
    pub ctx: Arc<ServiceContext>,
    pub accounts: Arc<MockAccountRepository>,
    pub transactions: Arc<MockTransactionRepository>,
    pub prices: Arc<MockPriceService>,
}

/// Create a test `ServiceContext` with an empty registry
pub fn create_test_context() -> TestFixture {
    create_test_context_with(ScraperRegistry::new())
}

/// Create a test `ServiceContext` around `registry`
pub fn create_test_context_with(registry: ScraperRegistry) -> TestFixture {
    let accounts = Arc::new(MockAccountRepository::new());
    let transactions = Arc::new(MockTransactionRepository::new());
    let prices = Arc::new(MockPriceService::new());
    let vault = CredentialVault::new(&TEST_KEY).unwrap_or_else(|e| panic!("test key: {e}"));

    let ctx = Arc::new(ServiceContext::new(
        accounts.clone(),
        transactions.clone(),
        prices.clone(),
        Arc::new(registry),
        Arc::new(vault),
        SyncConfig::default(),
    ));

    TestFixture {
        ctx,
        accounts,
        transactions,
        prices,
    }
}

/// An account with an arbitrary credential token and no checkpoint.
pub fn test_account(id: &str, platform: PlatformType, credentials: String) -> Account {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
    Account {
        id: id.to_string(),
        name: format!("{platform} account"),
        platform,
        credentials,
        created_at: created,
        updated_at: created,
        last_sync: None,
    }
}

/// Valid credentials for `platform`.
pub fn test_credentials(platform: PlatformType) -> PlatformCredentials {
    match platform {
        PlatformType::TradeRepublic => PlatformCredentials::TradeRepublic {
            phone: "+4915112345678".to_string(),
            pin: "1234".to_string(),
        },
        PlatformType::Binance => PlatformCredentials::Binance {
            api_key: "testApiKey01".to_string(),
            api_secret: "testApiSecret01".to_string(),
        },
        PlatformType::BourseDirect => PlatformCredentials::BourseDirect {
            username: "jdupont".to_string(),
            password: "hunter2".to_string(),
        },
    }
}

/// An account whose credentials are sealed with the fixture's vault.
pub fn sealed_account(ctx: &Arc<ServiceContext>, id: &str, platform: PlatformType) -> Account {
    let token = CredentialService::new(Arc::clone(ctx))
        .seal(&test_credentials(platform))
        .unwrap_or_else(|e| panic!("seal test credentials: {e}"));
    test_account(id, platform, token)
}

/// `count` distinct buy transactions, one per day from 2024-03-01.
pub fn sample_transactions(platform: PlatformType, count: usize) -> Vec<Transaction> {
    let start = Utc
        .with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
        .single()
        .unwrap_or_default();
    (0..count)
        .map(|i| Transaction {
            external_id: format!("{platform}-{i}"),
            account_id: String::new(),
            platform,
            kind: TransactionKind::Buy,
            symbol: Some("BTCEUR".to_string()),
            quantity: dec!(0.01),
            unit_price: dec!(60000),
            amount: dec!(-600),
            fee: dec!(0.6),
            currency: "EUR".to_string(),
            executed_at: start + chrono::Duration::days(i64::try_from(i).unwrap_or_default()),
        })
        .collect()
}
