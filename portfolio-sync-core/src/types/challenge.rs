//! Two-phase login state
//!
//! ```text
//! Idle -> Challenged{process_id, expires_at} -> Completed | Expired | Failed{reason}
//! ```
//!
//! The state is held by the caller (for example in the HTTP session) and handed back on
//! completion; the core keeps nothing between the two calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::types::SyncResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ChallengeState {
    #[default]
    Idle,
    #[serde(rename_all = "camelCase")]
    Challenged {
        process_id: String,
        #[serde(with = "portfolio_sync_scraper::datetime")]
        expires_at: DateTime<Utc>,
    },
    Completed,
    Expired,
    Failed {
        reason: String,
    },
}

impl ChallengeState {
    pub fn challenged(process_id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self::Challenged {
            process_id: process_id.into(),
            expires_at,
        }
    }

    /// `Completed`, `Expired` and `Failed` accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired | Self::Failed { .. })
    }

    /// The process id to submit a code against, if the challenge is still open at `now`.
    pub fn pending_process_id(&self, now: DateTime<Utc>) -> CoreResult<&str> {
        match self {
            Self::Challenged {
                process_id,
                expires_at,
            } => {
                if now >= *expires_at {
                    Err(CoreError::ChallengeExpired)
                } else {
                    Ok(process_id)
                }
            }
            Self::Idle => Err(CoreError::InvalidChallengeState(
                "no verification in progress".to_string(),
            )),
            other => Err(CoreError::InvalidChallengeState(format!(
                "verification already {}",
                other.label()
            ))),
        }
    }

    pub fn completed(&self) -> CoreResult<Self> {
        match self {
            Self::Challenged { .. } => Ok(Self::Completed),
            other => Err(CoreError::InvalidChallengeState(format!(
                "cannot complete from {}",
                other.label()
            ))),
        }
    }

    /// State after `error` interrupted a completion attempt.
    ///
    /// An expired window becomes `Expired`. Transport failures and requests rejected before
    /// reaching the platform leave the challenge open; anything else is final.
    pub fn after_error(&self, error: &CoreError) -> Self {
        match error {
            CoreError::ChallengeExpired => Self::Expired,
            CoreError::Scraper(e) if e.kind() == ErrorKind::Network => self.clone(),
            CoreError::InvalidChallengeState(_) | CoreError::ValidationError(_) => self.clone(),
            other => Self::Failed {
                reason: other.to_string(),
            },
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Challenged { .. } => "challenged",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Outcome of a successful code submission.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeCompletion {
    /// Always [`ChallengeState::Completed`].
    pub state: ChallengeState,
    /// Result of the sync run with the fresh session.
    pub sync_result: SyncResult,
}
