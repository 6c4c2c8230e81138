use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::util::{http_client, with_retry};
use crate::core::rates::{RateProvider, RateTable};

/// Rates from the Frankfurter API (`/latest?from={BASE}`).
///
/// The response omits the base currency; it is added back at rate 1.
pub struct FrankfurterProvider {
    base_url: String,
    retries: usize,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, retries: usize) -> Self {
        FrankfurterProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            retries,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    base: String,
    rates: BTreeMap<String, Decimal>,
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    #[instrument(name = "FrankfurterFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/latest?from={}", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let client = http_client()?;
        let response = with_retry(|| client.get(&url).send(), self.retries, 500)
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let data: FrankfurterResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse rates response for {}: {}", base, e))?;
        if data.base != base {
            return Err(anyhow!(
                "Rates returned for {} instead of {}",
                data.base,
                base
            ));
        }

        Ok(RateTable::live(base, data.rates))
    }
}
