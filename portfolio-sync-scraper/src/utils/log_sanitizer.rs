//! Log sanitization utilities
//!
//! Keeps credentials, session tokens and request signatures out of debug/error logs,
//! and bounds how much of a response body ends up in a log line.

/// Maximum number of bytes of a body included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Query parameters whose values never reach the logs.
const SENSITIVE_PARAMS: &[&str] = &["signature", "apikey", "token", "pin", "password"];

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging, appending the original length when cut.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Replace the values of sensitive query parameters with `***`.
///
/// `timestamp=1&signature=abc` becomes `timestamp=1&signature=***`.
pub fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SENSITIVE_PARAMS.contains(&key.to_ascii_lowercase().as_str()) => {
                format!("{key}=***")
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Show only the last four characters of an identifier such as a phone number.
pub fn mask_identifier(value: &str) -> String {
    let count = value.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("****{tail}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn short_string_unchanged() {
        let s = "hello world";
        assert_eq!(truncate_for_log(s), s);
    }

    #[test]
    fn over_limit_truncated() {
        let s = "a".repeat(TRUNCATE_LIMIT + 100);
        let result = truncate_for_log(&s);
        assert!(result.contains(&format!("{} bytes]", TRUNCATE_LIMIT + 100)));
        assert!(result.len() < s.len());
    }

    #[test]
    fn multibyte_chars_safe() {
        let s = "€".repeat(200);
        let result = truncate_for_log(&s);
        assert!(result.contains("... [truncated, total"));
    }

    #[test]
    fn signature_redacted() {
        assert_eq!(
            redact_query("symbol=BTCUSDT&timestamp=1&signature=deadbeef"),
            "symbol=BTCUSDT&timestamp=1&signature=***"
        );
        assert_eq!(redact_query("limit=1000"), "limit=1000");
    }

    #[test]
    fn identifier_masked() {
        assert_eq!(mask_identifier("+4915112345678"), "****5678");
        assert_eq!(mask_identifier("abc"), "****");
    }
}
