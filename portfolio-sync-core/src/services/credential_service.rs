//! Sealing and opening of stored credentials
//!
//! The plaintext inside a vault token is a flat JSON object using the keys of
//! [`PlatformCredentials::to_map`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{Account, PlatformCredentials, PlatformType};

/// Converts between typed credentials and the `Account::credentials` token.
#[derive(Clone)]
pub struct CredentialService {
    ctx: Arc<ServiceContext>,
}

impl CredentialService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Encrypt credentials into a token suitable for `Account::credentials`.
    pub fn seal(&self, credentials: &PlatformCredentials) -> CoreResult<String> {
        let plaintext = serde_json::to_string(&credentials.to_map())
            .map_err(|e| CoreError::ParseError(e.to_string()))?;
        Ok(self.ctx.vault.encrypt(&plaintext)?)
    }

    /// Decrypt and validate the credentials stored on `account`.
    pub fn open(&self, account: &Account) -> CoreResult<PlatformCredentials> {
        let map = self.decrypt_map(account)?;
        Self::parse_map(account.platform, &map)
    }

    /// Decrypt the stored token into its raw field map.
    ///
    /// Fails `CredentialError` when the vault rejects the token and `ParseError` when the
    /// plaintext is not a flat JSON object of strings.
    pub(crate) fn decrypt_map(&self, account: &Account) -> CoreResult<HashMap<String, String>> {
        let plaintext = self.ctx.vault.decrypt(&account.credentials)?;
        serde_json::from_str(&plaintext).map_err(|e| {
            CoreError::ParseError(format!(
                "credentials of account {} are not a JSON object: {e}",
                account.id
            ))
        })
    }

    pub(crate) fn parse_map(
        platform: PlatformType,
        map: &HashMap<String, String>,
    ) -> CoreResult<PlatformCredentials> {
        Ok(PlatformCredentials::from_map(platform, map)?)
    }
}
