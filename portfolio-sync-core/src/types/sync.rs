//! Sync result types

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portfolio_sync_scraper::PlatformType;

use crate::error::CoreError;

/// `full` iff the account had no checkpoint when the sync started.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    #[default]
    Full,
    Incremental,
}

/// Overall outcome of one sync attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Records persisted and checkpoint advanced.
    Success,
    /// Records persisted but the checkpoint could not be advanced.
    Partial,
    /// Nothing was persisted.
    Failed,
}

/// Pipeline step at which a sync stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SyncStage {
    LoadAccount,
    DecryptCredentials,
    /// The decrypted map is not JSON, or a credential field is missing or malformed. Always `parsing` kind.
    ParseCredentials,
    ResolveScraper,
    Fetch,
    Persist,
    Checkpoint,
}

/// Structured outcome of one `sync_account` call. Always populated, whatever failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub account_id: String,
    /// `None` only when the account could not be loaded.
    pub platform: Option<PlatformType>,
    pub fetched: usize,
    pub stored: usize,
    pub sync_type: SyncType,
    #[serde(with = "portfolio_sync_scraper::datetime")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "portfolio_sync_scraper::datetime")]
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<SyncStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub retryable: bool,
    /// Set when data was stored but the checkpoint update failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// The new checkpoint, when it was advanced.
    #[serde(
        default,
        with = "portfolio_sync_scraper::datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub checkpoint: Option<DateTime<Utc>>,
}

impl SyncResult {
    pub(crate) fn begin(account_id: &str) -> Self {
        let now = Utc::now();
        Self {
            account_id: account_id.to_string(),
            platform: None,
            fetched: 0,
            stored: 0,
            sync_type: SyncType::Full,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            status: SyncStatus::Failed,
            failed_stage: None,
            error: None,
            error_kind: None,
            retryable: false,
            warning: None,
            checkpoint: None,
        }
    }

    fn finish(mut self, status: SyncStatus) -> Self {
        self.status = status;
        self.finished_at = Utc::now();
        self.duration_ms = u64::try_from(
            (self.finished_at - self.started_at)
                .num_milliseconds()
                .max(0),
        )
        .unwrap_or_default();
        self
    }

    pub(crate) fn failed(mut self, stage: SyncStage, error: &CoreError) -> Self {
        self.failed_stage = Some(stage);
        self.error = Some(error.to_string());
        self.error_kind = Some(error.kind().to_string());
        self.retryable = error.is_retryable();
        self.finish(SyncStatus::Failed)
    }

    pub(crate) fn succeeded(mut self, checkpoint: DateTime<Utc>) -> Self {
        self.checkpoint = Some(checkpoint);
        self.finish(SyncStatus::Success)
    }

    pub(crate) fn partial(mut self, error: &CoreError) -> Self {
        self.failed_stage = Some(SyncStage::Checkpoint);
        self.warning = Some(format!("data stored but checkpoint not advanced: {error}"));
        self.error_kind = Some(error.kind().to_string());
        self.retryable = error.is_retryable();
        self.finish(SyncStatus::Partial)
    }

    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }
}

/// Orchestrator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Upper bound on a single `fetch_transactions` call.
    pub fetch_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
        }
    }
}
