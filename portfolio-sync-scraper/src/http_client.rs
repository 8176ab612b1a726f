//! Shared HTTP plumbing for scrapers.
//!
//! Every scraper builds its own `RequestBuilder` (signing, cookies and headers differ per
//! platform); this module sends it, logs it, and classifies transport-level failures.
//! Nothing here retries: a failed request surfaces immediately and the caller decides.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Status, body and cookies of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// `(name, value)` of every cookie set by the response, in order.
    pub cookies: Vec<(String, String)>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the cookie `name` set by this response, if any.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// HTTP helpers shared by every scraper.
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request and read its body.
    ///
    /// HTTP 429 becomes [`ScraperError::RateLimited`] (honoring `Retry-After`), 401/403 become
    /// [`ScraperError::AuthError`] and 502..=504 become [`ScraperError::NetworkError`].
    /// Every other status is returned to the caller,
    /// which owns the platform-specific interpretation.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        platform: &str,
        method_name: &str,
        path: &str,
    ) -> Result<HttpResponse, ScraperError> {
        log::debug!("[{platform}] {method_name} {path}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ScraperError::Timeout {
                    platform: platform.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ScraperError::NetworkError {
                    platform: platform.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[{platform}] Response Status: {status}");

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let cookies: Vec<(String, String)> = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        if status == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{platform}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ScraperError::RateLimited {
                platform: platform.to_string(),
                retry_after,
                raw_message: Some(truncate_for_log(&body)),
            });
        }

        if matches!(status, 401 | 403) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{platform}] Rejected (HTTP {status})");
            return Err(ScraperError::AuthError {
                platform: platform.to_string(),
                raw_message: Some(format!("HTTP {status}: {}", truncate_for_log(&body))),
            });
        }

        if matches!(status, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{platform}] Upstream unavailable (HTTP {status})");
            return Err(ScraperError::NetworkError {
                platform: platform.to_string(),
                detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::NetworkError {
                platform: platform.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("[{platform}] Response Body: {}", truncate_for_log(&body));

        Ok(HttpResponse {
            status,
            body,
            cookies,
        })
    }

    /// Parse a JSON body, logging a truncated copy on failure.
    pub fn parse_json<T>(body: &str, platform: &str) -> Result<T, ScraperError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!("[{platform}] JSON parse failed: {e}");
            log::error!("[{platform}] Raw response: {}", truncate_for_log(body));
            ScraperError::ParsingError {
                platform: platform.to_string(),
                detail: e.to_string(),
            }
        })
    }
}
