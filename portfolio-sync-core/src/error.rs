//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error types
pub use portfolio_sync_scraper::{CredentialValidationError, ErrorKind, ScraperError};

use crate::vault::VaultError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Stored credentials could not be decrypted (wrong key or corrupted data)
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// Decrypted credentials are not the expected JSON shape
    #[error("Credential parse error: {0}")]
    ParseError(String),

    /// Credential validation errors (structured, field level)
    #[error("{0}")]
    CredentialValidation(CredentialValidationError),

    /// No scraper registered for the platform
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The challenge is not in a state that accepts this operation
    #[error("Invalid challenge state: {0}")]
    InvalidChallengeState(String),

    /// The verification window has closed
    #[error("Verification expired, restart verification")]
    ChallengeExpired,

    /// Scraper error (converted from the library)
    #[error("{0}")]
    Scraper(#[from] ScraperError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, missing resource, revoked credentials).
    ///
    /// Log at `warn` when `true`, at `error` when `false`.
    /// **Update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::AccountNotFound(_)
            | Self::ValidationError(_)
            | Self::CredentialValidation(_)
            | Self::UnsupportedPlatform(_)
            | Self::InvalidChallengeState(_)
            | Self::ChallengeExpired => true,
            Self::Scraper(e) => e.is_expected(),
            Self::CredentialError(_) | Self::ParseError(_) | Self::StorageError(_) => false,
        }
    }

    /// Error taxonomy kind, as reported in `SyncResult::error_kind`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scraper(e) => match e.kind() {
                ErrorKind::Auth => "auth",
                ErrorKind::Network => "network",
                ErrorKind::Parsing => "parsing",
                ErrorKind::Validation => "validation",
            },
            Self::AccountNotFound(_) => "notFound",
            Self::CredentialError(_) => "credential",
            Self::ParseError(_) => "parsing",
            Self::CredentialValidation(_) | Self::ValidationError(_) => "validation",
            Self::UnsupportedPlatform(_) => "unsupportedPlatform",
            Self::StorageError(_) => "storage",
            Self::InvalidChallengeState(_) | Self::ChallengeExpired => "challenge",
        }
    }

    /// Whether the same call may succeed if repeated later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Scraper(e) => e.is_retryable(),
            Self::StorageError(_) => true,
            _ => false,
        }
    }

    /// Log at the level matching [`is_expected`](Self::is_expected).
    pub(crate) fn log(&self, context: &str) {
        if self.is_expected() {
            log::warn!("{context}: {self}");
        } else {
            log::error!("{context}: {self}");
        }
    }
}

impl From<VaultError> for CoreError {
    fn from(e: VaultError) -> Self {
        Self::CredentialError(e.to_string())
    }
}

impl From<CredentialValidationError> for CoreError {
    fn from(e: CredentialValidationError) -> Self {
        Self::CredentialValidation(e)
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
