//! Type definitions

mod account;
mod challenge;
mod sync;

pub use account::Account;
pub use challenge::{ChallengeCompletion, ChallengeState};
pub use sync::{SyncConfig, SyncResult, SyncStage, SyncStatus, SyncType};

// Re-export scraper library public types
pub use portfolio_sync_scraper::{
    PlatformCredentials, PlatformMetadata, PlatformType, Transaction, TransactionKind,
};
