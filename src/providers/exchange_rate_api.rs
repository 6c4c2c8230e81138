use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::util::{http_client, with_retry};
use crate::core::rates::{RateProvider, RateTable};

/// Rates from exchangerate-api.com (`/v4/latest/{BASE}`).
pub struct ExchangeRateApiProvider {
    base_url: String,
    retries: usize,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, retries: usize) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            retries,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: BTreeMap<String, Decimal>,
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateApiFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/v4/latest/{}", self.base_url, base);
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

        let text = response.text().await?;
        let data: LatestResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse rates response for {}: {}", base, e))?;
        if data.rates.is_empty() {
            return Err(anyhow!("No rates found for base currency: {}", base));
        }

        Ok(RateTable::live(base, data.rates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::RateSource;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_latest(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "base": "USD",
            "date": "2024-06-01",
            "rates": { "USD": 1, "PHP": 58.5, "EUR": 0.93 }
        }"#;
        let mock_server = mock_latest(200, mock_response).await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), 0);
        let table = provider.fetch_rates("USD").await.unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.source, RateSource::Live);
        assert_eq!(table.rate("PHP"), Some(Decimal::new(585, 1)));
        assert_eq!(table.rate("EUR"), Some(Decimal::new(93, 2)));
        assert_eq!(table.rate("USD"), Some(Decimal::ONE));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mock_server = mock_latest(500, "").await;
        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), 0);

        let result = provider.fetch_rates("USD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for base currency: USD"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = mock_latest(200, r#"{"result": "error"}"#).await;
        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), 0);

        let result = provider.fetch_rates("USD").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse rates response for USD")
        );
    }

    #[tokio::test]
    async fn test_empty_rates() {
        let mock_server = mock_latest(200, r#"{"rates": {}}"#).await;
        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), 0);

        let result = provider.fetch_rates("USD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rates found for base currency: USD"
        );
    }
}
