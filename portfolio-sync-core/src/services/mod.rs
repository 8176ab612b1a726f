//! Business logic service layer

mod challenge_service;
mod credential_service;
mod sync_service;

pub use challenge_service::ChallengeService;
pub use credential_service::CredentialService;
pub use sync_service::SyncService;

use std::sync::Arc;

use portfolio_sync_scraper::{Scraper, ScraperRegistry};

use crate::error::{CoreError, CoreResult};
use crate::traits::{AccountRepository, PriceService, TransactionRepository};
use crate::types::{Account, PlatformType, SyncConfig};
use crate::vault::CredentialVault;

/// Service context - holds all dependencies
///
/// The host builds this once, injecting its storage and price adapters. Everything in it is
/// immutable after construction and shared by reference.
pub struct ServiceContext {
    /// Account persistence repository
    pub account_repository: Arc<dyn AccountRepository>,
    /// Transaction persistence repository
    pub transaction_repository: Arc<dyn TransactionRepository>,
    /// Market price collaborator
    pub price_service: Arc<dyn PriceService>,
    /// Scraper registry
    pub registry: Arc<ScraperRegistry>,
    /// Credential vault
    pub vault: Arc<CredentialVault>,
    /// Orchestrator tuning
    pub config: SyncConfig,
}

impl ServiceContext {
    /// Create a service context
    #[must_use]
    pub fn new(
        account_repository: Arc<dyn AccountRepository>,
        transaction_repository: Arc<dyn TransactionRepository>,
        price_service: Arc<dyn PriceService>,
        registry: Arc<ScraperRegistry>,
        vault: Arc<CredentialVault>,
        config: SyncConfig,
    ) -> Self {
        Self {
            account_repository,
            transaction_repository,
            price_service,
            registry,
            vault,
            config,
        }
    }

    /// Load an account, failing `AccountNotFound` when it does not exist.
    pub async fn get_account(&self, account_id: &str) -> CoreResult<Account> {
        self.account_repository
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))
    }

    /// Resolve the scraper for a platform.
    pub fn get_scraper(&self, platform: PlatformType) -> CoreResult<Arc<dyn Scraper>> {
        self.registry
            .get(platform)
            .map_err(|e| CoreError::UnsupportedPlatform(e.platform))
    }
}
