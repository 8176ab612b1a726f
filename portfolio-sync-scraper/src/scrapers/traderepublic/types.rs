//! Trade Republic API payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub phone_number: &'a str,
    pub pin: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub process_id: String,
    #[serde(default = "default_countdown")]
    pub countdown_in_seconds: u64,
}

fn default_countdown() -> u64 {
    30
}

/// Error envelope: `{"errors":[{"errorCode":"...","errorMessage":"..."}]}`
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorItem {
    pub error_code: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimelinePage {
    #[serde(default)]
    pub items: Vec<TimelineItem>,
    #[serde(default)]
    pub cursors: Cursors,
}

#[derive(Debug, Default, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    /// RFC3339 with millisecond precision.
    pub timestamp: String,
    #[serde(default)]
    pub title: String,
    pub event_type: String,
    #[serde(default)]
    pub status: Option<String>,
    pub amount: Money,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub shares: Option<Decimal>,
    #[serde(default)]
    pub fee: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Money {
    pub value: Decimal,
    pub currency: String,
}
