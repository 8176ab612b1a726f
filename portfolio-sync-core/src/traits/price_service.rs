//! Market price refresh

use async_trait::async_trait;

use crate::error::CoreResult;

/// Price collaborator driven by the hourly job.
#[async_trait]
pub trait PriceService: Send + Sync {
    /// Refresh the quotes of every held instrument.
    async fn update_all_prices(&self) -> CoreResult<()>;
}
