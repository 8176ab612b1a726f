//! Application bootstrap for Portfolio Sync.
//!
//! Provides `AppState` (service container) and `AppStateBuilder` (adapter injection),
//! plus the lifecycle of the background jobs.

pub mod adapters;
mod settings;

pub use settings::SyncSettings;

use std::sync::Arc;

use portfolio_sync_core::error::{CoreError, CoreResult};
use portfolio_sync_core::services::{
    ChallengeService, CredentialService, ServiceContext, SyncService,
};
use portfolio_sync_core::traits::{AccountRepository, PriceService, TransactionRepository};
use portfolio_sync_core::types::PlatformMetadata;
use portfolio_sync_core::Scheduler;
use portfolio_sync_scraper::{get_all_platform_metadata, ScraperRegistry};

/// Application state.
///
/// Holds all services and the `ServiceContext`. Every host constructs this once at
/// startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    /// Credential sealing for account create/update
    pub credential_service: CredentialService,
    /// Sync orchestrator
    pub sync_service: SyncService,
    /// Interactive verification
    pub challenge_service: ChallengeService,
    /// Background jobs
    pub scheduler: Scheduler,
}

impl AppState {
    /// Start the price refresh and fleet sync loops. Idempotent.
    pub async fn start_background_jobs(&self) {
        self.scheduler.start().await;
    }

    /// Stop the background loops, letting running jobs finish.
    pub async fn shutdown(&self) {
        self.scheduler.stop().await;
    }

    /// Metadata of the platforms this instance can sync.
    pub fn supported_platforms(&self) -> Vec<PlatformMetadata> {
        let supported = self.ctx.registry.list_supported_platforms();
        get_all_platform_metadata()
            .into_iter()
            .filter(|m| supported.contains(&m.id))
            .collect()
    }
}

/// Builder for constructing `AppState` with host-specific adapters.
///
/// # Required
/// - `settings` with a valid `encryptionKey`
/// - `account_repository`, `transaction_repository`, `price_service`
///
/// # Optional
/// - `scraper_registry`: defaults to every built-in scraper
pub struct AppStateBuilder {
    settings: SyncSettings,
    account_repository: Option<Arc<dyn AccountRepository>>,
    transaction_repository: Option<Arc<dyn TransactionRepository>>,
    price_service: Option<Arc<dyn PriceService>>,
    scraper_registry: Option<ScraperRegistry>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: SyncSettings::default(),
            account_repository: None,
            transaction_repository: None,
            price_service: None,
            scraper_registry: None,
        }
    }

    #[must_use]
    pub fn settings(mut self, settings: SyncSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn account_repository(mut self, repo: Arc<dyn AccountRepository>) -> Self {
        self.account_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn transaction_repository(mut self, repo: Arc<dyn TransactionRepository>) -> Self {
        self.transaction_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn price_service(mut self, service: Arc<dyn PriceService>) -> Self {
        self.price_service = Some(service);
        self
    }

    #[must_use]
    pub fn scraper_registry(mut self, registry: ScraperRegistry) -> Self {
        self.scraper_registry = Some(registry);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing or the
    /// settings are invalid, and a scraper error if the default registry cannot be built.
    pub fn build(self) -> CoreResult<AppState> {
        let account_repository = self.account_repository.ok_or_else(|| {
            CoreError::ValidationError("account_repository is required".to_string())
        })?;
        let transaction_repository = self.transaction_repository.ok_or_else(|| {
            CoreError::ValidationError("transaction_repository is required".to_string())
        })?;
        let price_service = self.price_service.ok_or_else(|| {
            CoreError::ValidationError("price_service is required".to_string())
        })?;

        let vault = self.settings.vault()?;
        let config = self.settings.sync_config()?;
        let intervals = self.settings.job_intervals()?;

        let registry = match self.scraper_registry {
            Some(registry) => registry,
            None => ScraperRegistry::with_default_scrapers()?,
        };
        log::info!(
            "Scraper registry ready: {:?}",
            registry.list_supported_platforms()
        );

        let ctx = Arc::new(ServiceContext::new(
            account_repository,
            transaction_repository,
            price_service,
            Arc::new(registry),
            Arc::new(vault),
            config,
        ));

        Ok(AppState {
            credential_service: CredentialService::new(Arc::clone(&ctx)),
            sync_service: SyncService::new(Arc::clone(&ctx)),
            challenge_service: ChallengeService::new(Arc::clone(&ctx)),
            scheduler: Scheduler::with_default_jobs(&ctx, intervals),
            ctx,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
