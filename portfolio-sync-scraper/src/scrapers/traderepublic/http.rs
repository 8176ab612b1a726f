//! Trade Republic HTTP calls

use crate::error::Result;
use crate::http_client::{HttpResponse, HttpUtils};
use crate::traits::{RawApiError, ScraperErrorMapper};
use crate::utils::log_sanitizer::mask_identifier;

use super::types::{ErrorResponse, LoginRequest, LoginResponse, TimelinePage};
use super::{SESSION_COOKIE, TradeRepublicScraper};

impl TradeRepublicScraper {
    /// Turn a non-2xx response into a mapped error.
    fn api_error(&self, resp: &HttpResponse) -> crate::error::ScraperError {
        let raw = match serde_json::from_str::<ErrorResponse>(&resp.body) {
            Ok(parsed) if !parsed.errors.is_empty() => {
                let first = &parsed.errors[0];
                RawApiError::with_code(
                    first.error_code.clone(),
                    first
                        .error_message
                        .clone()
                        .unwrap_or_else(|| first.error_code.clone()),
                )
            }
            _ => RawApiError::new(format!("HTTP {}", resp.status)),
        };
        log::error!("[{}] API error: {}", self.platform_name(), raw.message);
        self.map_error(raw.with_status(resp.status))
    }

    pub(crate) async fn post_login(&self, phone: &str, pin: &str) -> Result<LoginResponse> {
        log::info!(
            "[{}] Starting login for {}",
            self.platform_name(),
            mask_identifier(phone)
        );
        let path = "/api/v1/auth/web/login";
        let request = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(&LoginRequest {
                phone_number: phone,
                pin,
            });
        let resp = HttpUtils::execute_request(request, self.platform_name(), "POST", path).await?;
        if !resp.is_success() {
            return Err(self.api_error(&resp));
        }
        HttpUtils::parse_json(&resp.body, self.platform_name())
    }

    /// Submit the verification code; returns the session token.
    pub(crate) async fn post_verification(&self, process_id: &str, code: &str) -> Result<String> {
        let path = format!(
            "/api/v1/auth/web/login/{}/{}",
            urlencoding::encode(process_id),
            urlencoding::encode(code)
        );
        let request = self.client.post(format!("{}{path}", self.base_url));
        let resp = HttpUtils::execute_request(
            request,
            self.platform_name(),
            "POST",
            "/api/v1/auth/web/login/{processId}/***",
        )
        .await?;

        if resp.status == 400 || resp.status == 404 {
            // Body shape varies here; any client error on this endpoint means the code is bad.
            return Err(self.auth_error("invalid or expired code - restart verification"));
        }
        if !resp.is_success() {
            return Err(self.api_error(&resp));
        }
        resp.cookie(SESSION_COOKIE)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| self.auth_error("login succeeded but no session cookie was issued"))
    }

    pub(crate) async fn get_timeline_page(
        &self,
        session_token: &str,
        cursor: Option<&str>,
    ) -> Result<TimelinePage> {
        let mut path = "/api/v1/timeline/transactions".to_string();
        if let Some(cursor) = cursor {
            path.push_str(&format!("?after={}", urlencoding::encode(cursor)));
        }
        let request = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("Cookie", format!("{SESSION_COOKIE}={session_token}"));
        let resp = HttpUtils::execute_request(request, self.platform_name(), "GET", &path).await?;
        if !resp.is_success() {
            return Err(self.api_error(&resp));
        }
        HttpUtils::parse_json(&resp.body, self.platform_name())
    }
}
