use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ProviderConfig;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Provider responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Can't decode provider response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Daily snapshot returned by the provider. Fields other than `rates` are ignored.
#[derive(Debug, Deserialize, PartialEq)]
pub struct RatesResponse {
    pub rates: HashMap<String, f64>,
}

/// Client for a fixer.io style historical endpoint: `GET {endpoint}/{YYYY-MM-DD}`.
#[derive(Debug, Clone)]
pub struct RateProvider {
    client: Client,
    endpoint: String,
    access_key: String,
    symbols: String,
}

impl RateProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::Request)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
            symbols: config.symbols.join(","),
        })
    }

    fn day_url(&self, date: NaiveDate) -> String {
        format!("{}/{}", self.endpoint, date.format("%Y-%m-%d"))
    }

    /// Errors never carry the request URL, since its query holds the access key.
    pub async fn fetch_rates(&self, date: NaiveDate) -> Result<HashMap<String, f64>, ProviderError> {
        log::debug!("Requesting rates for {} from {}", date, self.endpoint);

        let resp = self
            .client
            .get(self.day_url(date))
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("symbols", self.symbols.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.without_url()))?;
        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status()));
        }

        let body: RatesResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.without_url()))?;

        Ok(body.rates)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn provider(endpoint: &str) -> RateProvider {
        RateProvider::new(&ProviderConfig {
            endpoint: endpoint.to_string(),
            access_key: "secret".to_string(),
            symbols: vec!["GBP".to_string(), "AUD".to_string()],
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn day_url_drops_trailing_slash() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();

        assert_eq!(
            provider("http://data.fixer.io/api/").day_url(date),
            "http://data.fixer.io/api/2020-01-05"
        );
    }

    #[test]
    fn response_ignores_extra_fields() {
        let body = r#"{"success": true, "base": "EUR", "date": "2020-01-05", "rates": {"GBP": 1.2, "AUD": 0.9}}"#;
        let parsed: RatesResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.rates.len(), 2);
        assert_eq!(parsed.rates["GBP"], 1.2);
    }
}
