//! Bourse Direct HTTP calls

use chrono::NaiveDate;
use reqwest::Client;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{RawApiError, ScraperErrorMapper};
use crate::utils::log_sanitizer::mask_identifier;

use super::BourseDirectScraper;
use super::types::HistoryResponse;

/// Marker the login page shows after a failed attempt.
const LOGIN_FAILED_MARKER: &str = "identifiant ou mot de passe incorrect";

/// Whether a body is an HTML page rather than the JSON we asked for.
pub(crate) fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    head.starts_with('<')
}

impl BourseDirectScraper {
    pub(crate) async fn login(&self, client: &Client, username: &str, password: &str) -> Result<()> {
        log::info!(
            "[{}] Logging in as {}",
            self.platform_name(),
            mask_identifier(username)
        );
        let path = "/connexion";
        let request = client
            .post(format!("{}{path}", self.base_url))
            .form(&[("login", username), ("password", password)]);
        let resp = HttpUtils::execute_request(request, self.platform_name(), "POST", path).await?;

        if !resp.is_success() {
            return Err(self.map_error(
                RawApiError::new(format!("login returned HTTP {}", resp.status))
                    .with_status(resp.status),
            ));
        }
        if resp.body.to_lowercase().contains(LOGIN_FAILED_MARKER) {
            return Err(self.auth_error("invalid username or password"));
        }
        Ok(())
    }

    pub(crate) async fn get_history(
        &self,
        client: &Client,
        date_from: Option<NaiveDate>,
    ) -> Result<HistoryResponse> {
        let mut path = "/api/operations/historique".to_string();
        if let Some(date) = date_from {
            path.push_str(&format!("?dateDebut={}", date.format("%Y-%m-%d")));
        }
        let request = client
            .get(format!("{}{path}", self.base_url))
            .header("Accept", "application/json");
        let resp = HttpUtils::execute_request(request, self.platform_name(), "GET", &path).await?;

        if !resp.is_success() {
            return Err(self.map_error(
                RawApiError::new(format!("history returned HTTP {}", resp.status))
                    .with_status(resp.status),
            ));
        }
        if looks_like_html(&resp.body) {
            return Err(self.auth_error("session rejected, login page returned"));
        }
        HttpUtils::parse_json(&resp.body, self.platform_name())
    }
}
