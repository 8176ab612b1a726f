//! Scraper registry and platform metadata.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::Scraper;
use crate::types::{PlatformMetadata, PlatformType};

#[cfg(feature = "binance")]
use crate::scrapers::BinanceScraper;
#[cfg(feature = "boursedirect")]
use crate::scrapers::BourseDirectScraper;
#[cfg(feature = "traderepublic")]
use crate::scrapers::TradeRepublicScraper;

/// Returned when no scraper is registered for a platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported platform: {platform}")]
pub struct UnsupportedPlatform {
    pub platform: String,
}

type Lookup = std::result::Result<Arc<dyn Scraper>, UnsupportedPlatform>;

/// Maps platform ids to scraper instances.
///
/// Built once at startup and read-only afterwards, so lookups need no locking and the
/// registry can be shared freely behind an `Arc`.
///
/// # Examples
///
/// ```rust,no_run
/// use portfolio_sync_scraper::{PlatformType, ScraperRegistry};
///
/// let registry = ScraperRegistry::with_default_scrapers().unwrap();
/// let scraper = registry.get(PlatformType::Binance).unwrap();
/// assert_eq!(scraper.id(), "binance");
/// ```
#[derive(Clone, Default)]
pub struct ScraperRegistry {
    scrapers: HashMap<PlatformType, Arc<dyn Scraper>>,
}

impl ScraperRegistry {
    /// An empty registry; add scrapers with [`register`](Self::register).
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every scraper enabled via feature flags.
    pub fn with_default_scrapers() -> Result<Self> {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "traderepublic")]
        {
            registry = registry.register(Arc::new(TradeRepublicScraper::new()?));
        }
        #[cfg(feature = "binance")]
        {
            registry = registry.register(Arc::new(BinanceScraper::new()?));
        }
        #[cfg(feature = "boursedirect")]
        {
            registry = registry.register(Arc::new(BourseDirectScraper::new()));
        }
        log::debug!(
            "Scraper registry initialized with {:?}",
            registry.list_supported_platforms()
        );
        Ok(registry)
    }

    /// Add (or replace) the scraper for its platform.
    #[must_use]
    pub fn register(mut self, scraper: Arc<dyn Scraper>) -> Self {
        self.scrapers.insert(scraper.platform(), scraper);
        self
    }

    pub fn get(&self, platform: PlatformType) -> Lookup {
        self.scrapers
            .get(&platform)
            .cloned()
            .ok_or_else(|| UnsupportedPlatform {
                platform: platform.to_string(),
            })
    }

    /// Look a scraper up by its string id (`"binance"`, ...).
    pub fn get_by_id(&self, id: &str) -> Lookup {
        let platform: PlatformType = id.parse().map_err(|_| UnsupportedPlatform {
            platform: id.to_string(),
        })?;
        self.get(platform)
    }

    /// Registered platforms, sorted by id.
    pub fn list_supported_platforms(&self) -> Vec<PlatformType> {
        let mut platforms: Vec<PlatformType> = self.scrapers.keys().copied().collect();
        platforms.sort_by_key(|p| p.as_str());
        platforms
    }

    pub fn len(&self) -> usize {
        self.scrapers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }
}

impl std::fmt::Debug for ScraperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperRegistry")
            .field("platforms", &self.list_supported_platforms())
            .finish()
    }
}

/// Returns metadata for all platforms enabled via feature flags, sorted by id.
///
/// Useful for building dynamic UIs that enumerate available platforms
/// and their required credential fields.
pub fn get_all_platform_metadata() -> Vec<PlatformMetadata> {
    let mut all: Vec<PlatformMetadata> = vec![
        #[cfg(feature = "traderepublic")]
        TradeRepublicScraper::metadata(),
        #[cfg(feature = "binance")]
        BinanceScraper::metadata(),
        #[cfg(feature = "boursedirect")]
        BourseDirectScraper::metadata(),
    ];
    all.sort_by_key(|m| m.id.as_str());
    all
}
