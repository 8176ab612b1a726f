use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{Result, ScraperError};
use crate::types::{
    AuthSession, LoginChallenge, PlatformCredentials, PlatformMetadata, PlatformType, Transaction,
};

/// Raw error reported by a platform API (internal).
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Platform-specific error code, if any.
    pub code: Option<String>,
    /// Original error message.
    pub message: String,
    /// HTTP status the error came with.
    pub status: Option<u16>,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Maps raw platform errors to [`ScraperError`] (internal).
pub(crate) trait ScraperErrorMapper {
    fn platform_name(&self) -> &'static str;

    fn map_error(&self, raw: RawApiError) -> ScraperError;

    fn parse_error(&self, detail: impl ToString) -> ScraperError {
        ScraperError::ParsingError {
            platform: self.platform_name().to_string(),
            detail: detail.to_string(),
        }
    }

    fn auth_error(&self, message: impl Into<String>) -> ScraperError {
        ScraperError::AuthError {
            platform: self.platform_name().to_string(),
            raw_message: Some(message.into()),
        }
    }

    fn network_error(&self, detail: impl ToString) -> ScraperError {
        ScraperError::NetworkError {
            platform: self.platform_name().to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Capability implemented by every platform scraper.
///
/// Implementations are stateless apart from their HTTP client, so a single instance is shared
/// by every account of the platform and may be used concurrently.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Platform identifier, identical to `self.platform().as_str()`.
    fn id(&self) -> &'static str;

    fn platform(&self) -> PlatformType;

    /// Type-level metadata, available before any instance exists.
    fn metadata() -> PlatformMetadata
    where
        Self: Sized;

    /// Check the shape of a decrypted credential map without touching the network.
    fn validate_credentials(
        &self,
        credentials: &HashMap<String, String>,
    ) -> Result<PlatformCredentials> {
        Ok(PlatformCredentials::from_map(self.platform(), credentials)?)
    }

    /// Fetch the transaction history.
    ///
    /// With `since = None` the full history is returned; otherwise only what the platform
    /// considers newer than the checkpoint (see
    /// [`IncrementalBoundary`](crate::IncrementalBoundary)). Results are sorted by execution
    /// time, oldest first.
    async fn fetch_transactions(
        &self,
        credentials: &PlatformCredentials,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>>;

    /// Second-factor login support, for platforms that need a human in the loop.
    fn interactive(&self) -> Option<&dyn InteractiveAuth> {
        None
    }
}

/// Two-phase login for platforms that require a verification code.
#[async_trait]
pub trait InteractiveAuth: Send + Sync {
    /// Phase one: submit the primary credentials and trigger the code delivery.
    async fn initiate_challenge(&self, credentials: &PlatformCredentials)
    -> Result<LoginChallenge>;

    /// Phase two: submit the code received by the user for `process_id`.
    async fn complete_challenge(&self, process_id: &str, code: &str) -> Result<AuthSession>;

    /// Fetch transactions using an already-authenticated session.
    async fn fetch_with_session(
        &self,
        session: &AuthSession,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>>;
}
