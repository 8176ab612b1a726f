use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============ Platform Types ============

/// Identifies which brokerage or exchange a scraper talks to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    /// Trade Republic (neo-broker, interactive login with an SMS/app code).
    #[serde(rename = "traderepublic")]
    TradeRepublic,
    /// Binance spot exchange (API key + secret).
    Binance,
    /// Bourse Direct (French online broker, username + password).
    #[serde(rename = "boursedirect")]
    BourseDirect,
}

impl PlatformType {
    /// Stable lowercase identifier, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TradeRepublic => "traderepublic",
            Self::Binance => "binance",
            Self::BourseDirect => "boursedirect",
        }
    }

    /// Every platform known to this crate, regardless of enabled features.
    pub fn all() -> [Self; 3] {
        [Self::TradeRepublic, Self::Binance, Self::BourseDirect]
    }

    /// Whether logging in needs a human-supplied verification code.
    ///
    /// A property of the platform, known even when no scraper for it is compiled in.
    pub fn requires_interactive_auth(self) -> bool {
        matches!(self, Self::TradeRepublic)
    }
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformType {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "traderepublic" => Ok(Self::TradeRepublic),
            "binance" => Ok(Self::Binance),
            "boursedirect" => Ok(Self::BourseDirect),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

// ============ Metadata ============

/// How a platform interprets the checkpoint of an incremental fetch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IncrementalBoundary {
    /// Only records strictly after the checkpoint are returned.
    StrictlyAfter,
    /// Records at the checkpoint (same day for date-granular platforms) are returned again;
    /// storage deduplicates them by external id.
    AtOrAfter,
}

/// A credential field required by a platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialField {
    /// Machine-readable key inside the credential map (e.g., `"apiKey"`).
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Whether the value must be masked in UIs.
    pub secret: bool,
    /// Optional hint about the expected format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// Static metadata describing a platform scraper.
///
/// Obtain via [`Scraper::metadata()`](crate::Scraper::metadata) or
/// [`get_all_platform_metadata()`](crate::get_all_platform_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMetadata {
    /// Platform identifier.
    pub id: PlatformType,
    /// Human-readable platform name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Credential fields the platform needs.
    pub required_fields: Vec<CredentialField>,
    /// Whether logging in needs a human-supplied verification code.
    pub requires_interactive_auth: bool,
    /// Checkpoint semantics of incremental fetches.
    pub incremental_boundary: IncrementalBoundary,
}

// ============ Credential Types ============

/// Validation error for platform credentials.
///
/// Returned when credential fields are missing, empty, or malformed. Raised before any
/// network call is made.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A required credential field is missing entirely.
    #[error("Missing required field: {label}")]
    MissingField {
        /// Which platform the error relates to.
        platform: PlatformType,
        /// Machine-readable field key.
        field: String,
        /// Human-readable field label.
        label: String,
    },
    /// A credential field is present but empty or whitespace-only.
    #[error("Field must not be empty: {label}")]
    EmptyField {
        /// Which platform the error relates to.
        platform: PlatformType,
        /// Machine-readable field key.
        field: String,
        /// Human-readable field label.
        label: String,
    },
    /// A credential field has an invalid format.
    #[error("{label}: {reason}")]
    InvalidFormat {
        /// Which platform the error relates to.
        platform: PlatformType,
        /// Machine-readable field key.
        field: String,
        /// Human-readable field label.
        label: String,
        /// Description of what's wrong with the format.
        reason: String,
    },
}

impl CredentialValidationError {
    /// Key of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field, .. }
            | Self::EmptyField { field, .. }
            | Self::InvalidFormat { field, .. } => field,
        }
    }
}

impl From<CredentialValidationError> for crate::error::ScraperError {
    fn from(e: CredentialValidationError) -> Self {
        let platform = match &e {
            CredentialValidationError::MissingField { platform, .. }
            | CredentialValidationError::EmptyField { platform, .. }
            | CredentialValidationError::InvalidFormat { platform, .. } => *platform,
        };
        Self::ValidationError {
            platform: platform.to_string(),
            field: e.field().to_string(),
            detail: e.to_string(),
        }
    }
}

/// Type-safe credential container for all supported platforms.
///
/// Serialized as a flat key/value object without a tag; the platform comes from the account
/// record. Use [`PlatformCredentials::from_map`] / [`PlatformCredentials::to_map`] to convert.
///
/// The `Debug` implementation never prints secret values.
#[derive(Clone, PartialEq, Eq)]
pub enum PlatformCredentials {
    /// Trade Republic login.
    TradeRepublic {
        /// Phone number in international format (`+4915112345678`).
        phone: String,
        /// Four-digit app PIN.
        pin: String,
    },
    /// Binance API key pair.
    Binance {
        /// API key (sent as `X-MBX-APIKEY`).
        api_key: String,
        /// API secret (used for HMAC signing only).
        api_secret: String,
    },
    /// Bourse Direct web login.
    BourseDirect {
        /// Account login.
        username: String,
        /// Account password.
        password: String,
    },
}

impl std::fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TradeRepublic { phone, .. } => f
                .debug_struct("TradeRepublic")
                .field("phone", &mask(phone))
                .field("pin", &"***")
                .finish(),
            Self::Binance { api_key, .. } => f
                .debug_struct("Binance")
                .field("api_key", &mask(api_key))
                .field("api_secret", &"***")
                .finish(),
            Self::BourseDirect { username, .. } => f
                .debug_struct("BourseDirect")
                .field("username", &mask(username))
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Keeps the last two characters, enough to tell accounts apart in a debug dump.
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("***{tail}")
}

impl PlatformCredentials {
    /// Construct credentials from a flat map, validating every required field.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError`] naming the first missing or malformed field.
    pub fn from_map(
        platform: PlatformType,
        map: &HashMap<String, String>,
    ) -> Result<Self, CredentialValidationError> {
        match platform {
            PlatformType::TradeRepublic => {
                let phone = Self::get_required_field(platform, map, "phone", "Phone number")?;
                let pin = Self::get_required_field(platform, map, "pin", "PIN")?;
                let phone_digits = phone.strip_prefix('+').unwrap_or_default();
                if phone_digits.len() < 6 || !phone_digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(CredentialValidationError::InvalidFormat {
                        platform,
                        field: "phone".to_string(),
                        label: "Phone number".to_string(),
                        reason: "expected international format, e.g. +4915112345678".to_string(),
                    });
                }
                if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
                    return Err(CredentialValidationError::InvalidFormat {
                        platform,
                        field: "pin".to_string(),
                        label: "PIN".to_string(),
                        reason: "must be exactly 4 digits".to_string(),
                    });
                }
                Ok(Self::TradeRepublic { phone, pin })
            }
            PlatformType::Binance => {
                let api_key = Self::get_required_field(platform, map, "apiKey", "API Key")?;
                let api_secret =
                    Self::get_required_field(platform, map, "apiSecret", "API Secret")?;
                for (field, label, value) in [
                    ("apiKey", "API Key", &api_key),
                    ("apiSecret", "API Secret", &api_secret),
                ] {
                    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                        return Err(CredentialValidationError::InvalidFormat {
                            platform,
                            field: field.to_string(),
                            label: label.to_string(),
                            reason: "must contain only letters and digits".to_string(),
                        });
                    }
                }
                Ok(Self::Binance {
                    api_key,
                    api_secret,
                })
            }
            PlatformType::BourseDirect => Ok(Self::BourseDirect {
                username: Self::get_required_field(platform, map, "username", "Username")?,
                password: Self::get_required_field(platform, map, "password", "Password")?,
            }),
        }
    }

    /// Obtain a required field from the map and verify that it is not empty.
    fn get_required_field(
        platform: PlatformType,
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> Result<String, CredentialValidationError> {
        match map.get(key) {
            None => Err(CredentialValidationError::MissingField {
                platform,
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) if v.trim().is_empty() => Err(CredentialValidationError::EmptyField {
                platform,
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) => Ok(v.trim().to_string()),
        }
    }

    /// Convert credentials to a flat map for storage inside the vault.
    pub fn to_map(&self) -> HashMap<String, String> {
        match self {
            Self::TradeRepublic { phone, pin } => [
                ("phone".to_string(), phone.clone()),
                ("pin".to_string(), pin.clone()),
            ]
            .into(),
            Self::Binance {
                api_key,
                api_secret,
            } => [
                ("apiKey".to_string(), api_key.clone()),
                ("apiSecret".to_string(), api_secret.clone()),
            ]
            .into(),
            Self::BourseDirect { username, password } => [
                ("username".to_string(), username.clone()),
                ("password".to_string(), password.clone()),
            ]
            .into(),
        }
    }

    /// Returns the [`PlatformType`] corresponding to this credential variant.
    pub fn platform(&self) -> PlatformType {
        match self {
            Self::TradeRepublic { .. } => PlatformType::TradeRepublic,
            Self::Binance { .. } => PlatformType::Binance,
            Self::BourseDirect { .. } => PlatformType::BourseDirect,
        }
    }
}

// ============ Transactions ============

/// What a transaction did to the account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Buy,
    Sell,
    Deposit,
    Withdrawal,
    Dividend,
    Interest,
    Fee,
    Other,
}

/// One transaction harvested from a platform.
///
/// `external_id` is unique per platform and is what storage deduplicates on. `account_id` is
/// left empty by scrapers and stamped by the sync orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Platform-unique identifier.
    pub external_id: String,
    /// Owning account, stamped after the fetch.
    #[serde(default)]
    pub account_id: String,
    /// Source platform.
    pub platform: PlatformType,
    /// Transaction kind.
    pub kind: TransactionKind,
    /// Ticker, trading pair or ISIN, when the transaction concerns an instrument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Number of units (zero for pure cash movements).
    pub quantity: Decimal,
    /// Price per unit in `currency`.
    pub unit_price: Decimal,
    /// Gross cash amount in `currency`, signed from the account's perspective.
    pub amount: Decimal,
    /// Fees paid in `currency`.
    pub fee: Decimal,
    /// ISO currency or asset code.
    pub currency: String,
    /// When the transaction became effective.
    #[serde(with = "crate::utils::datetime")]
    pub executed_at: DateTime<Utc>,
}

/// Result of the first phase of an interactive login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginChallenge {
    /// Correlation id the code must be submitted against. Single use.
    pub process_id: String,
    /// Seconds the platform keeps the process open.
    pub expires_in_secs: u64,
    /// Always `true` for challenges; kept explicit for API consumers.
    pub requires_second_factor: bool,
}

/// Session obtained after a successful second factor.
///
/// Opaque to callers. `Debug` hides the token.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub(crate) token: String,
}

impl AuthSession {
    /// Wrap a raw session token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"***")
            .finish()
    }
}
