//! Transaction persistence abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{PlatformType, Transaction};

/// Transaction store.
///
/// Implementations must tolerate concurrent batches for different accounts.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Insert a batch atomically, skipping records whose `(platform, external_id)` already exists.
    ///
    /// Returns the number of records newly stored. Either the whole batch is applied or none of it.
    async fn create_batch(
        &self,
        transactions: &[Transaction],
        platform: PlatformType,
    ) -> CoreResult<usize>;
}
