//! Engine settings
//!
//! Loading them (file, environment, UI) is the host's job; this type only defines the shape,
//! the defaults and the validation.

use std::time::Duration;

use portfolio_sync_core::error::{CoreError, CoreResult};
use portfolio_sync_core::types::SyncConfig;
use portfolio_sync_core::{CredentialVault, JobIntervals};
use serde::Deserialize;

/// Sync engine settings. Every field is optional in the serialized form.
///
/// ```json
/// {
///   "encryptionKey": "<base64 of 32 random bytes>",
///   "priceRefreshIntervalSecs": 3600,
///   "fleetSyncIntervalSecs": 86400,
///   "fetchTimeoutSecs": 30
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Base64-encoded 32-byte vault key.
    pub encryption_key: String,
    pub price_refresh_interval_secs: u64,
    pub fleet_sync_interval_secs: u64,
    /// Upper bound on one platform fetch.
    pub fetch_timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            encryption_key: String::new(),
            price_refresh_interval_secs: 3600,
            fleet_sync_interval_secs: 86_400,
            fetch_timeout_secs: 30,
        }
    }
}

impl SyncSettings {
    /// Defaults with the given key.
    #[must_use]
    pub fn with_encryption_key(encryption_key: impl Into<String>) -> Self {
        Self {
            encryption_key: encryption_key.into(),
            ..Self::default()
        }
    }

    /// Build the credential vault from `encryption_key`.
    pub fn vault(&self) -> CoreResult<CredentialVault> {
        if self.encryption_key.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "encryptionKey is required".to_string(),
            ));
        }
        CredentialVault::from_base64_key(&self.encryption_key)
            .map_err(|e| CoreError::ValidationError(format!("encryptionKey: {e}")))
    }

    pub fn sync_config(&self) -> CoreResult<SyncConfig> {
        Ok(SyncConfig {
            fetch_timeout: positive("fetchTimeoutSecs", self.fetch_timeout_secs)?,
        })
    }

    pub fn job_intervals(&self) -> CoreResult<JobIntervals> {
        Ok(JobIntervals {
            price_refresh: positive(
                "priceRefreshIntervalSecs",
                self.price_refresh_interval_secs,
            )?,
            fleet_sync: positive("fleetSyncIntervalSecs", self.fleet_sync_interval_secs)?,
        })
    }
}

fn positive(field: &str, secs: u64) -> CoreResult<Duration> {
    if secs == 0 {
        return Err(CoreError::ValidationError(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(Duration::from_secs(secs))
}

impl std::fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSettings")
            .field("encryption_key", &"***")
            .field(
                "price_refresh_interval_secs",
                &self.price_refresh_interval_secs,
            )
            .field("fleet_sync_interval_secs", &self.fleet_sync_interval_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}
