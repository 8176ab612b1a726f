//! Built-in jobs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::ScheduledJob;
use crate::error::CoreResult;
use crate::services::SyncService;
use crate::traits::PriceService;
use crate::types::SyncStatus;

/// Refreshes market prices through the price collaborator.
pub struct PriceRefreshJob {
    prices: Arc<dyn PriceService>,
    interval: Duration,
}

impl PriceRefreshJob {
    #[must_use]
    pub fn new(prices: Arc<dyn PriceService>, interval: Duration) -> Self {
        Self { prices, interval }
    }
}

#[async_trait]
impl ScheduledJob for PriceRefreshJob {
    fn name(&self) -> &'static str {
        "price-refresh"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> CoreResult<()> {
        self.prices.update_all_prices().await
    }
}

/// Syncs every account that can run unattended.
pub struct FleetSyncJob {
    sync: SyncService,
    interval: Duration,
}

impl FleetSyncJob {
    #[must_use]
    pub fn new(sync: SyncService, interval: Duration) -> Self {
        Self { sync, interval }
    }
}

#[async_trait]
impl ScheduledJob for FleetSyncJob {
    fn name(&self) -> &'static str {
        "fleet-sync"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> CoreResult<()> {
        let results = self.sync.sync_all_accounts().await?;

        let count = |status: SyncStatus| results.iter().filter(|r| r.status == status).count();
        let (succeeded, partial, failed) = (
            count(SyncStatus::Success),
            count(SyncStatus::Partial),
            count(SyncStatus::Failed),
        );
        let stored: usize = results.iter().map(|r| r.stored).sum();

        if failed > 0 || partial > 0 {
            log::warn!(
                "Fleet sync finished: {succeeded} succeeded, {partial} partial, {failed} failed, {stored} new transactions"
            );
        } else {
            log::info!(
                "Fleet sync finished: {succeeded} succeeded, {stored} new transactions"
            );
        }
        Ok(())
    }
}
