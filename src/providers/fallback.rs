use crate::core::rates::{RateProvider, RateTable};
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// Never fails: a failed live fetch degrades to the static fallback table.
pub struct FallbackRateProvider<T: RateProvider> {
    inner: T,
}

impl<T: RateProvider> FallbackRateProvider<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: RateProvider> RateProvider for FallbackRateProvider<T> {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        match self.inner.fetch_rates(base).await {
            Ok(table) => Ok(table),
            Err(e) => {
                warn!(error = %e, "Currency API failed for {base}, using fallback rates");
                Ok(RateTable::fallback(base))
            }
        }
    }
}
