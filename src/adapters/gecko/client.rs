//! GeckoTerminal Client
//!
//! Secondary quote provider, queried only when DexScreener yields nothing
//! for a pair. Looks the pool up directly and normalizes into the same
//! `Quote` shape with the same validity checks. GeckoTerminal reports every
//! numeric field as a string.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::time::sleep;

use crate::adapters::dexscreener::ORACLE_USER_AGENT;
use crate::adapters::fetch::{FetchError, RetryPolicy};
use crate::domain::quote::{pick_change_pct, Quote};
use crate::ports::quote_source::{QuoteSource, SourceError};

/// Public GeckoTerminal API base
pub const DEFAULT_API_URL: &str = "https://api.geckoterminal.com/api/v2";

const NET_ERROR_DELAY: Duration = Duration::from_millis(200);

/// GeckoTerminal client configuration
#[derive(Debug, Clone)]
pub struct GeckoConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GeckoConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::exponential(3, Duration::from_millis(250)),
        }
    }
}

/// Fallback market-data provider client.
pub struct GeckoClient {
    config: GeckoConfig,
    http: Client,
}

impl GeckoClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(GeckoConfig::default())
    }

    pub fn with_config(config: GeckoConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(ORACLE_USER_AGENT));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Fetch a quote for one pool. Non-success statuses and missing data
    /// yield `Ok(None)`; only transport failures after retries are errors.
    pub async fn pool_quote(
        &self,
        network: &str,
        pool: &str,
        symbol: &str,
    ) -> Result<Option<Quote>, FetchError> {
        let url = format!(
            "{}/networks/{}/pools/{}",
            self.config.api_url, network, pool
        );

        let max_attempts = self.config.retry.max_attempts;
        let mut last_error = FetchError::RateLimited(max_attempts);

        for attempt in 0..max_attempts {
            let response = match self.http.get(&url).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = FetchError::Network(e.to_string());
                    sleep(NET_ERROR_DELAY).await;
                    continue;
                }
            };

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let backoff = self.config.retry.delay(attempt);
                tracing::warn!(
                    "gecko rate limited for {}, backing off {:?} (attempt {}/{})",
                    symbol,
                    backoff,
                    attempt + 1,
                    max_attempts
                );
                last_error = FetchError::RateLimited(attempt + 1);
                sleep(backoff).await;
                continue;
            }

            if !response.status().is_success() {
                return Ok(None);
            }

            let body: Value = match response.json().await {
                Ok(v) => v,
                Err(e) => {
                    last_error = FetchError::Network(e.to_string());
                    sleep(NET_ERROR_DELAY).await;
                    continue;
                }
            };

            return Ok(quote_from_pool(network, pool, &body));
        }

        Err(last_error)
    }
}

fn string_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalize a GeckoTerminal pool response into a validated `Quote`.
fn quote_from_pool(network: &str, pool: &str, body: &Value) -> Option<Quote> {
    let attrs = body.pointer("/data/attributes")?;

    let price = string_f64(attrs.get("base_token_price_usd"))?;

    let change = pick_change_pct([
        string_f64(attrs.pointer("/price_change_percentage/h24")),
        string_f64(attrs.pointer("/price_change_percentage/h6")),
        string_f64(attrs.pointer("/price_change_percentage/h1")),
        string_f64(attrs.pointer("/price_change_percentage/m5")),
    ]);

    let liquidity = string_f64(attrs.get("reserve_in_usd"));
    let fdv = string_f64(attrs.get("fdv_usd"));

    Quote::new(network, pool, price, change, liquidity, fdv, attrs.clone())
}

#[async_trait]
impl QuoteSource for GeckoClient {
    fn name(&self) -> &'static str {
        "gecko"
    }

    async fn try_quote(
        &self,
        network: &str,
        pair: &str,
        symbol: &str,
    ) -> Result<Option<Quote>, SourceError> {
        self.pool_quote(network, pair, symbol)
            .await
            .map_err(|e| SourceError::Provider(e.to_string()))
    }
}
