//! Exchange rate tables and the provider abstraction that fetches them.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// USD based rates used when no live table can be fetched.
const FALLBACK_RATES: &[(&str, i64, u32)] = &[
    ("USD", 1, 0),
    ("PHP", 5850, 2),
    ("EUR", 93, 2),
    ("GBP", 79, 2),
    ("AUD", 152, 2),
    ("CAD", 136, 2),
    ("JPY", 1550, 1),
];
const FALLBACK_BASE: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    Live,
    Fallback,
}

/// Units of each currency per one unit of `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: BTreeMap<String, Decimal>,
    pub source: RateSource,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Builds a live table, making sure the base itself is present at rate 1.
    pub fn live(base: &str, mut rates: BTreeMap<String, Decimal>) -> Self {
        rates.insert(base.to_string(), Decimal::ONE);
        RateTable {
            base: base.to_string(),
            rates,
            source: RateSource::Live,
            fetched_at: Utc::now(),
        }
    }

    /// Static table rebased onto `base` when the fallback knows that currency.
    ///
    /// Unknown bases get the USD table unchanged.
    pub fn fallback(base: &str) -> Self {
        let usd: BTreeMap<String, Decimal> = FALLBACK_RATES
            .iter()
            .map(|(code, num, scale)| (code.to_string(), Decimal::new(*num, *scale)))
            .collect();

        let (table_base, rates) = match usd.get(base) {
            Some(base_rate) if !base_rate.is_zero() => {
                let rebased = usd
                    .iter()
                    .map(|(code, rate)| (code.clone(), rate / base_rate))
                    .collect();
                (base.to_string(), rebased)
            }
            _ => (FALLBACK_BASE.to_string(), usd),
        };

        RateTable {
            base: table_base,
            rates,
            source: RateSource::Fallback,
            fetched_at: Utc::now(),
        }
    }

    /// Rate for `currency`, ignoring missing and zero entries.
    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied().filter(|r| !r.is_zero())
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}
