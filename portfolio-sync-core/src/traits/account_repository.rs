//! Account persistence abstract Trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::types::Account;

/// Account store.
///
/// The sync engine only reads accounts and advances their checkpoint; creating, editing
/// and deleting accounts belongs to the host.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Get all accounts
    async fn find_all(&self) -> CoreResult<Vec<Account>>;

    /// Get account based on ID
    ///
    /// # Arguments
    /// * `id` - Account ID
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Account>>;

    /// Advance the sync checkpoint
    ///
    /// A timestamp at or before the stored checkpoint leaves it unchanged, so two runs racing
    /// on one account cannot move it backwards.
    ///
    /// # Arguments
    /// * `id` - Account ID
    /// * `timestamp` - new value of `Account::last_sync`
    async fn update_last_sync(&self, id: &str, timestamp: DateTime<Utc>) -> CoreResult<()>;
}
