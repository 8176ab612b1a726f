//! Date/time serde helpers and timestamp parsing.
//!
//! - Serialization: `DateTime<Utc>` -> RFC3339 string
//! - Deserialization: RFC3339 string or Unix timestamp (seconds or milliseconds)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Timestamp {
    String(String),
    I64(i64),
}

fn from_timestamp<E: serde::de::Error>(ts: Timestamp) -> Result<DateTime<Utc>, E> {
    match ts {
        Timestamp::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| E::custom(format!("Invalid RFC3339 timestamp: {e}"))),
        Timestamp::I64(ts) => {
            parse_unix_timestamp(ts).ok_or_else(|| E::custom("Invalid Unix timestamp"))
        }
    }
}

pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    from_timestamp(Timestamp::deserialize(deserializer)?)
}

/// Same format for `Option<DateTime<Utc>>` fields.
pub mod option {
    use super::{DateTime, Deserialize, Deserializer, Serializer, Timestamp, Utc};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Timestamp>::deserialize(deserializer)?
            .map(super::from_timestamp)
            .transpose()
    }
}

/// Parse a Unix timestamp, telling seconds and milliseconds apart by magnitude.
pub fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}

/// Parse the loose timestamp formats brokers return: RFC3339 (also with a `+0000` offset),
/// `YYYY-MM-DDTHH:MM:SS`
/// (taken as UTC) or a bare `YYYY-MM-DD` / `DD/MM/YYYY` date (midnight UTC).
pub fn parse_flexible(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    ["%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
