//! # portfolio-sync-scraper
//!
//! Transaction-history scrapers for brokerages and exchanges, behind one capability trait.
//!
//! ## Supported Platforms
//!
//! | Platform | Feature Flag | Auth Method | Incremental boundary |
//! |----------|-------------|-------------|----------------------|
//! | [Trade Republic](https://traderepublic.com/) | `traderepublic` | Phone + PIN, then app code | strictly after |
//! | [Binance](https://www.binance.com/) | `binance` | API key, HMAC-SHA256 signed query | strictly after |
//! | [Bourse Direct](https://www.boursedirect.fr/) | `boursedirect` | Form login, cookie session | at or after (day) |
//!
//! ## Feature Flags
//!
//! - **`all-platforms`** *(default)*: enable every platform listed above.
//! - **`traderepublic`**, **`binance`**, **`boursedirect`**: enable a single platform.
//! - **`native-tls`** *(default)* / **`rustls`**: TLS backend.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use portfolio_sync_scraper::{PlatformType, ScraperRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ScraperRegistry::with_default_scrapers()?;
//!     let scraper = registry.get(PlatformType::Binance)?;
//!
//!     let raw: HashMap<String, String> = [
//!         ("apiKey".to_string(), "key".to_string()),
//!         ("apiSecret".to_string(), "secret".to_string()),
//!     ]
//!     .into();
//!     let credentials = scraper.validate_credentials(&raw)?;
//!
//!     // Full history; pass Some(checkpoint) for an incremental fetch.
//!     for tx in scraper.fetch_transactions(&credentials, None).await? {
//!         println!("{} {:?} {} {}", tx.executed_at, tx.kind, tx.amount, tx.currency);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Interactive login
//!
//! Platforms that need a verification code expose [`Scraper::interactive`]. Their unattended
//! [`Scraper::fetch_transactions`] fails with an [`ScraperError::AuthError`]; use
//! [`InteractiveAuth::initiate_challenge`], then [`InteractiveAuth::complete_challenge`] with the
//! code the user received, then [`InteractiveAuth::fetch_with_session`].
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ScraperError>`](ScraperError). Each error belongs to
//! one [`ErrorKind`] (`Auth`, `Network`, `Parsing`, `Validation`); only the network kind is
//! retryable. Scrapers never retry internally.

mod error;
mod http_client;
mod registry;
mod scrapers;
mod traits;
mod types;
mod utils;

pub use error::{ErrorKind, Result, ScraperError};

pub use registry::{ScraperRegistry, UnsupportedPlatform, get_all_platform_metadata};

// Internal traits (`ScraperErrorMapper`) are not exported
pub use traits::{InteractiveAuth, Scraper};

pub use types::{
    AuthSession, CredentialField, CredentialValidationError, IncrementalBoundary, LoginChallenge,
    PlatformCredentials, PlatformMetadata, PlatformType, Transaction, TransactionKind,
    UnknownPlatform,
};

pub use utils::datetime;

#[cfg(feature = "binance")]
pub use scrapers::BinanceScraper;

#[cfg(feature = "boursedirect")]
pub use scrapers::BourseDirectScraper;

#[cfg(feature = "traderepublic")]
pub use scrapers::TradeRepublicScraper;
