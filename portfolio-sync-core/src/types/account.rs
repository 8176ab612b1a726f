//! Account types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portfolio_sync_scraper::PlatformType;

/// A linked brokerage/exchange account.
///
/// Every field except `last_sync` belongs to the account-management layer; the sync
/// orchestrator only ever advances `last_sync`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Platform the account lives on
    pub platform: PlatformType,
    /// Vault token holding the credential map (never plaintext)
    pub credentials: String,
    #[serde(with = "portfolio_sync_scraper::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "portfolio_sync_scraper::datetime")]
    pub updated_at: DateTime<Utc>,
    /// Checkpoint of the last successful sync; `None` until the first one
    #[serde(
        default,
        with = "portfolio_sync_scraper::datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_sync: Option<DateTime<Utc>>,
}
