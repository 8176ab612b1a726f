//! Platform scraper implementations

/// Shared utilities used by scraper implementations.
pub mod common;

#[cfg(feature = "binance")]
mod binance;
#[cfg(feature = "boursedirect")]
mod boursedirect;
#[cfg(feature = "traderepublic")]
mod traderepublic;

#[cfg(feature = "binance")]
pub use binance::BinanceScraper;
#[cfg(feature = "boursedirect")]
pub use boursedirect::BourseDirectScraper;
#[cfg(feature = "traderepublic")]
pub use traderepublic::TradeRepublicScraper;
