//! Portfolio Sync Core Library
//!
//! Business logic of the account synchronization engine:
//! - [`CredentialVault`]: authenticated encryption of stored credentials
//! - [`SyncService`]: the per-account sync pipeline and the fleet sync
//! - [`ChallengeService`]: two-phase login for platforms that need a verification code
//! - [`Scheduler`]: periodic price refresh and fleet sync
//!
//! Storage and pricing are reached through the traits in [`traits`]; the host application
//! provides the implementations and wires them into a [`ServiceContext`].

pub mod error;
pub mod scheduler;
pub mod services;
pub mod traits;
pub mod types;
pub mod vault;

#[cfg(test)]
#[allow(clippy::panic)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use scheduler::{FleetSyncJob, JobIntervals, PriceRefreshJob, ScheduledJob, Scheduler};
pub use services::{ChallengeService, CredentialService, ServiceContext, SyncService};
pub use traits::{AccountRepository, PriceService, TransactionRepository};
pub use vault::{CredentialVault, VaultError};

pub use portfolio_sync_scraper::ScraperRegistry;
