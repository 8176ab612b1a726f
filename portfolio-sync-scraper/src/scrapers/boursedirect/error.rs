//! Bourse Direct error mapping

use crate::error::ScraperError;
use crate::traits::{RawApiError, ScraperErrorMapper};

use super::BourseDirectScraper;

impl ScraperErrorMapper for BourseDirectScraper {
    fn platform_name(&self) -> &'static str {
        "boursedirect"
    }

    fn map_error(&self, raw: RawApiError) -> ScraperError {
        match raw.status {
            Some(status) if status >= 500 => self.network_error(raw.message),
            // The site redirects to the login page when the session is missing.
            Some(302 | 303) => self.auth_error(raw.message),
            _ => self.parse_error(raw.message),
        }
    }
}
