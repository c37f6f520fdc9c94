//! DexScreener Client
//!
//! Primary quote provider. Resolves quotes for sets of pair addresses with
//! as few provider calls as possible: cache read-through, 30-address batch
//! requests paced 100 ms apart, exponential backoff on 429, and a
//! resolver-plus-single-fetch recovery path for addresses the batch response
//! does not cover (these are presumed to be bare token addresses).
//!
//! All calls are awaited strictly in sequence; the pacing delays are the
//! rate-limit backpressure mechanism.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::sleep;

use super::resolver::resolve_best_pair;
use super::types::{pairs_array, quote_from_pair, single_pair};
use crate::adapters::fetch::{FetchError, RetryPolicy};
use crate::domain::cache::{Lookup, QuoteCache};
use crate::domain::quote::{is_hex_pair_address, Quote};
use crate::ports::quote_source::{QuoteSource, SourceError};

/// Public DexScreener API base
pub const DEFAULT_API_URL: &str = "https://api.dexscreener.com";

/// Identifying user-agent sent with every request
pub const ORACLE_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; FlipBot/1.0; +https://flipflop.local)";

/// Provider batch limit per pairs request
pub const CHUNK_SIZE: usize = 30;

/// Pacing between consecutive chunk requests
pub const CHUNK_PACING: Duration = Duration::from_millis(100);

/// Wait after a network-level failure before retrying
const NET_ERROR_DELAY: Duration = Duration::from_millis(200);

/// Per-address outcome of a batch lookup. `Ok(None)` is a definitive
/// "no quote"; `Err` means the whole chunk failed after retries.
pub type PairOutcome = Result<Option<Quote>, FetchError>;

/// DexScreener client configuration
#[derive(Debug, Clone)]
pub struct DexscreenerConfig {
    /// API base URL
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry schedule for rate-limited requests
    pub retry: RetryPolicy,
}

impl Default for DexscreenerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::exponential(3, Duration::from_millis(250)),
        }
    }
}

/// Primary market-data provider client.
pub struct DexscreenerClient {
    config: DexscreenerConfig,
    http: Client,
    cache: Arc<Mutex<QuoteCache>>,
}

impl DexscreenerClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(DexscreenerConfig::default())
    }

    pub fn with_config(config: DexscreenerConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(ORACLE_USER_AGENT));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            config,
            http,
            cache: Arc::new(Mutex::new(QuoteCache::new())),
        })
    }

    /// Replace the quote cache, e.g. to share one across clients or inject a
    /// short-TTL cache in tests.
    pub fn with_cache(mut self, cache: Arc<Mutex<QuoteCache>>) -> Self {
        self.cache = cache;
        self
    }

    /// Handle to the quote cache
    pub fn cache(&self) -> Arc<Mutex<QuoteCache>> {
        Arc::clone(&self.cache)
    }

    /// Resolve quotes for a set of pair addresses on one network.
    ///
    /// Keys in the returned map are the lowercased requested addresses.
    /// Cache hits (positive and negative) short-circuit without a provider
    /// call; the rest are fetched in 30-address chunks, strictly in order.
    pub async fn pair_quotes(
        &self,
        network: &str,
        pairs: &[String],
    ) -> HashMap<String, PairOutcome> {
        let mut out: HashMap<String, PairOutcome> = HashMap::new();
        let mut to_fetch: Vec<String> = Vec::new();

        {
            let cache = self.cache.lock().await;
            for pair in pairs {
                let key = pair.trim().to_lowercase();
                if key.is_empty() || out.contains_key(&key) || to_fetch.contains(&key) {
                    continue;
                }
                match cache.get(network, &key) {
                    Lookup::Hit(value) => {
                        out.insert(key, Ok(value));
                    }
                    Lookup::Miss => to_fetch.push(key),
                }
            }
        }

        let chunks: Vec<&[String]> = to_fetch.chunks(CHUNK_SIZE).collect();
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                sleep(CHUNK_PACING).await;
            }
            self.fetch_chunk(network, chunk, &mut out).await;
        }

        out
    }

    /// Resolve one pair, through the same cache/batch/recovery path.
    pub async fn pair_quote(&self, network: &str, pair: &str) -> PairOutcome {
        let key = pair.trim().to_lowercase();
        let mut outcomes = self.pair_quotes(network, std::slice::from_ref(&key)).await;
        outcomes.remove(&key).unwrap_or(Ok(None))
    }

    /// Fetch one chunk with retry/backoff, recording an outcome for every
    /// address in it.
    async fn fetch_chunk(
        &self,
        network: &str,
        chunk: &[String],
        out: &mut HashMap<String, PairOutcome>,
    ) {
        let url = format!(
            "{}/latest/dex/pairs/{}/{}",
            self.config.api_url,
            network,
            chunk.join(",")
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
                    "dexscreener rate limited, backing off {:?} (attempt {}/{})",
                    backoff,
                    attempt + 1,
                    max_attempts
                );
                last_error = FetchError::RateLimited(attempt + 1);
                sleep(backoff).await;
                continue;
            }

            if !response.status().is_success() {
                // Permanent for this chunk, no further retries
                last_error = FetchError::Status(response.status().as_u16());
                break;
            }

            let body: Value = match response.json().await {
                Ok(v) => v,
                Err(e) => {
                    last_error = FetchError::Network(e.to_string());
                    sleep(NET_ERROR_DELAY).await;
                    continue;
                }
            };

            let mut found: HashMap<String, Quote> = HashMap::new();
            for item in pairs_array(&body) {
                if let Some(quote) = quote_from_pair(network, item) {
                    found.insert(quote.pair.clone(), quote);
                }
            }

            let mut unresolved: Vec<String> = Vec::new();
            for key in chunk {
                match found.get(key) {
                    Some(quote) => {
                        self.store(network, key, Some(quote.clone())).await;
                        out.insert(key.clone(), Ok(Some(quote.clone())));
                    }
                    None => unresolved.push(key.clone()),
                }
            }

            for requested in unresolved {
                let quote = self.recover_unresolved(network, &requested).await;
                out.insert(requested, Ok(quote));
            }

            return;
        }

        tracing::warn!(
            "dexscreener chunk of {} pairs failed: {}",
            chunk.len(),
            last_error
        );
        for key in chunk {
            out.insert(key.clone(), Err(last_error.clone()));
        }
    }

    /// Recovery path for an address the batch response did not cover:
    /// non-hex strings resolve to "no quote" immediately; valid addresses
    /// are treated as bare token addresses, resolved to their best pair and
    /// fetched individually. Outcomes are cached either way.
    async fn recover_unresolved(&self, network: &str, requested: &str) -> Option<Quote> {
        if !is_hex_pair_address(requested) {
            self.store(network, requested, None).await;
            return None;
        }

        let best =
            resolve_best_pair(&self.http, &self.config.api_url, network, requested).await;

        let quote = match best {
            Some(resolved) => self.fetch_single_pair(network, &resolved).await,
            None => None,
        };

        if let Some(ref q) = quote {
            // Cache under the real resolved key too, so direct lookups for
            // the pool also hit
            let real_key = q.pair.clone();
            self.store(network, &real_key, Some(q.clone())).await;
        }
        self.store(network, requested, quote.clone()).await;
        quote
    }

    /// Fetch a single pair with the same retry/backoff policy as the batch
    /// path. Failures degrade to `None`.
    pub async fn fetch_single_pair(&self, network: &str, pair: &str) -> Option<Quote> {
        let url = format!("{}/latest/dex/pairs/{}/{}", self.config.api_url, network, pair);

        for attempt in 0..self.config.retry.max_attempts {
            let response = match self.http.get(&url).send().await {
                Ok(r) => r,
                Err(_) => {
                    sleep(NET_ERROR_DELAY).await;
                    continue;
                }
            };

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                sleep(self.config.retry.delay(attempt)).await;
                continue;
            }

            if !response.status().is_success() {
                return None;
            }

            let body: Value = match response.json().await {
                Ok(v) => v,
                Err(_) => {
                    sleep(NET_ERROR_DELAY).await;
                    continue;
                }
            };

            return single_pair(&body).and_then(|item| quote_from_pair(network, item));
        }

        None
    }

    /// Resolve a bare token address to its best pair. Exposed for the
    /// `resolve` CLI command.
    pub async fn resolve_token(&self, network: &str, token: &str) -> Option<String> {
        resolve_best_pair(&self.http, &self.config.api_url, network, &token.to_lowercase())
            .await
    }

    async fn store(&self, network: &str, pair: &str, value: Option<Quote>) {
        self.cache.lock().await.insert(network, pair, value);
    }
}

#[async_trait]
impl QuoteSource for DexscreenerClient {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    async fn try_quote(
        &self,
        network: &str,
        pair: &str,
        _symbol: &str,
    ) -> Result<Option<Quote>, SourceError> {
        self.pair_quote(network, pair)
            .await
            .map_err(|e| SourceError::Provider(e.to_string()))
    }
}
