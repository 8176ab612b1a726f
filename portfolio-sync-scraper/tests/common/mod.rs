//! Shared helpers for live platform tests

#![allow(dead_code)]

pub mod fake_server;

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use portfolio_sync_scraper::{PlatformCredentials, PlatformType, Scraper, ScraperRegistry};

/// Skip the test when an environment variable is missing.
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("skipping: missing environment variable {}", $var);
                return;
            }
        )+
    };
}

/// Assert that a `Result` is `Ok` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got Err({:?})", res.as_ref().err());
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// A scraper together with validated credentials read from the environment.
pub struct TestContext {
    pub scraper: Arc<dyn Scraper>,
    pub credentials: PlatformCredentials,
}

impl TestContext {
    fn from_env(platform: PlatformType, vars: &[(&str, &str)]) -> Option<Self> {
        let mut raw = HashMap::new();
        for (key, var) in vars {
            raw.insert((*key).to_string(), env::var(var).ok()?);
        }
        let registry = ScraperRegistry::with_default_scrapers().ok()?;
        let scraper = registry.get(platform).ok()?;
        let credentials = scraper.validate_credentials(&raw).ok()?;
        Some(Self {
            scraper,
            credentials,
        })
    }

    pub fn binance() -> Option<Self> {
        Self::from_env(
            PlatformType::Binance,
            &[
                ("apiKey", "BINANCE_API_KEY"),
                ("apiSecret", "BINANCE_API_SECRET"),
            ],
        )
    }

    pub fn boursedirect() -> Option<Self> {
        Self::from_env(
            PlatformType::BourseDirect,
            &[
                ("username", "BOURSEDIRECT_USERNAME"),
                ("password", "BOURSEDIRECT_PASSWORD"),
            ],
        )
    }
}
