pub mod caching;
pub mod exchange_rate_api;
pub mod fallback;
pub mod frankfurter;
pub mod util;

use crate::core::cache::Cache;
use crate::core::config::{RateSourceKind, RatesProviderConfig};
use crate::core::rates::{RateProvider, RateTable};
use caching::CachingRateProvider;
use exchange_rate_api::ExchangeRateApiProvider;
use fallback::FallbackRateProvider;
use frankfurter::FrankfurterProvider;
use std::sync::Arc;
use std::time::Duration;

/// Live source behind a TTL cache, degrading to the static table on failure.
pub fn build_rate_provider(
    config: &RatesProviderConfig,
    cache: Arc<dyn Cache<String, RateTable>>,
    ttl: Duration,
) -> Arc<dyn RateProvider> {
    let base_url = config.base_url();
    match config.source {
        RateSourceKind::ExchangeRateApi => {
            let live = ExchangeRateApiProvider::new(base_url, config.retries);
            Arc::new(FallbackRateProvider::new(CachingRateProvider::new(
                live, cache, ttl,
            )))
        }
        RateSourceKind::Frankfurter => {
            let live = FrankfurterProvider::new(base_url, config.retries);
            Arc::new(FallbackRateProvider::new(CachingRateProvider::new(
                live, cache, ttl,
            )))
        }
    }
}
