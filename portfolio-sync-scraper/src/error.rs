use serde::{Deserialize, Serialize};

/// Coarse classification of a [`ScraperError`].
///
/// Callers decide their retry policy from this kind alone; the concrete variant only adds context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The platform rejected the credentials or the verification code.
    Auth,
    /// Transport failure, timeout or rate limiting.
    Network,
    /// The platform answered with a shape we do not understand.
    Parsing,
    /// Caller-supplied input was rejected before any network call.
    Validation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::Network => write!(f, "network"),
            Self::Parsing => write!(f, "parsing"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// Unified error type for all scraper operations.
///
/// Each variant includes a `platform` field identifying which scraper produced the error,
/// plus variant-specific context. The underlying cause (reqwest error, serde error, raw API
/// message) is rendered into `detail` / `raw_message` at the failure site so the error stays
/// `Clone` and serializable.
///
/// # Retryable Errors
///
/// The following variants are transient and may succeed at the next attempt:
/// - [`NetworkError`](Self::NetworkError)
/// - [`Timeout`](Self::Timeout)
/// - [`RateLimited`](Self::RateLimited)
///
/// Scrapers never retry on their own; retry policy belongs to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ScraperError {
    /// A network-level error occurred (DNS resolution failure, connection refused, 5xx gateway, etc.).
    NetworkError {
        /// Platform that produced the error.
        platform: String,
        /// Error details.
        detail: String,
    },

    /// The request did not complete in time.
    Timeout {
        /// Platform that produced the error.
        platform: String,
        /// Error details.
        detail: String,
    },

    /// The platform throttled us.
    RateLimited {
        /// Platform that produced the error.
        platform: String,
        /// Seconds to wait, if the platform said so.
        retry_after: Option<u64>,
        /// Original error message from the platform, if available.
        raw_message: Option<String>,
    },

    /// The platform rejected the credentials, the session or the verification code.
    AuthError {
        /// Platform that produced the error.
        platform: String,
        /// Original error message from the platform, if available.
        raw_message: Option<String>,
    },

    /// The platform response could not be parsed.
    ParsingError {
        /// Platform that produced the error.
        platform: String,
        /// Error details.
        detail: String,
    },

    /// Credentials or parameters were rejected locally, before any network call.
    ValidationError {
        /// Platform that produced the error.
        platform: String,
        /// Offending field.
        field: String,
        /// What is wrong with it.
        detail: String,
    },
}

impl ScraperError {
    /// Classify the error into the four-kind taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => {
                ErrorKind::Network
            }
            Self::AuthError { .. } => ErrorKind::Auth,
            Self::ParsingError { .. } => ErrorKind::Parsing,
            Self::ValidationError { .. } => ErrorKind::Validation,
        }
    }

    /// Whether the same call may succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// Platform identifier carried by every variant.
    pub fn platform(&self) -> &str {
        match self {
            Self::NetworkError { platform, .. }
            | Self::Timeout { platform, .. }
            | Self::RateLimited { platform, .. }
            | Self::AuthError { platform, .. }
            | Self::ParsingError { platform, .. }
            | Self::ValidationError { platform, .. } => platform,
        }
    }

    /// Whether this is expected behavior (bad user input, revoked credentials, throttling)
    /// rather than a defect. Used to pick the log level.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::AuthError { .. } | Self::ValidationError { .. } | Self::RateLimited { .. }
        )
    }
}

impl std::fmt::Display for ScraperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { platform, detail } => {
                write!(f, "[{platform}] Network error: {detail}")
            }
            Self::Timeout { platform, detail } => {
                write!(f, "[{platform}] Request timeout: {detail}")
            }
            Self::RateLimited {
                platform,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{platform}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{platform}] Rate limited")
                }
            }
            Self::AuthError {
                platform,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{platform}] Authentication failed: {msg}")
                } else {
                    write!(f, "[{platform}] Authentication failed")
                }
            }
            Self::ParsingError { platform, detail } => {
                write!(f, "[{platform}] Parse error: {detail}")
            }
            Self::ValidationError {
                platform,
                field,
                detail,
            } => {
                write!(f, "[{platform}] Invalid '{field}': {detail}")
            }
        }
    }
}

impl std::error::Error for ScraperError {}

/// Convenience type alias for `Result<T, ScraperError>`.
pub type Result<T> = std::result::Result<T, ScraperError>;
