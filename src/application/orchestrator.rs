//! Price Orchestrator
//!
//! Drives one full refresh of the token universe: walks tokens serially with
//! pacing between requests, tries each quote source in order with a fixed
//! retry schedule, shapes successful quotes into snapshot rows, and backfills
//! tokens that resolved nowhere from the previously published snapshot so a
//! provider outage degrades prices to stale instead of absent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::adapters::fetch::RetryPolicy;
use crate::domain::price_data::{build_view_url, derive_baseline, PriceData, SOURCE_CACHED};
use crate::domain::quote::Quote;
use crate::domain::tokens::{extract_pair_address, Token};
use crate::ports::quote_source::QuoteSource;
use crate::ports::snapshot_store::SnapshotStore;

/// Store key the published snapshot lives under.
pub const SNAPSHOT_KEY: &str = "GLOBAL_PRICE_CACHE";

const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MAX_RETRIES: u32 = 3;
const PROGRESS_INTERVAL: usize = 10;

/// Serial, paced price refresher over an ordered list of quote sources.
pub struct PriceOrchestrator {
    universe: Vec<Token>,
    sources: Vec<Arc<dyn QuoteSource>>,
    store: Arc<dyn SnapshotStore>,
    snapshot_key: String,
    request_delay: Duration,
    retry: RetryPolicy,
}

impl PriceOrchestrator {
    pub fn new(
        universe: Vec<Token>,
        sources: Vec<Arc<dyn QuoteSource>>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            universe,
            sources,
            store,
            snapshot_key: SNAPSHOT_KEY.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
            retry: RetryPolicy::fixed(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY),
        }
    }

    /// Override pacing and retry schedule (tests run with zero delays).
    pub fn with_pacing(mut self, request_delay: Duration, retry: RetryPolicy) -> Self {
        self.request_delay = request_delay;
        self.retry = retry;
        self
    }

    pub fn with_snapshot_key(mut self, key: &str) -> Self {
        self.snapshot_key = key.to_string();
        self
    }

    pub fn snapshot_key(&self) -> &str {
        &self.snapshot_key
    }

    /// Previously published rows, keyed by token id. Any store or parse
    /// failure logs and degrades to an empty map: a refresh must never be
    /// blocked by a bad prior snapshot.
    async fn load_last_known(&self) -> HashMap<String, PriceData> {
        let value = match self.store.get(&self.snapshot_key).await {
            Ok(Some(v)) => v,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                warn!("failed to load previous snapshot: {}", e);
                return HashMap::new();
            }
        };

        // Some store backends hand the snapshot back as a JSON string
        let rows: Result<Vec<PriceData>, _> = match value {
            Value::String(s) => serde_json::from_str(&s),
            other => serde_json::from_value(other),
        };

        match rows {
            Ok(rows) => rows.into_iter().map(|r| (r.token_id.clone(), r)).collect(),
            Err(e) => {
                warn!("previous snapshot unreadable, starting fresh: {}", e);
                HashMap::new()
            }
        }
    }

    /// Try every source in order. First valid quote wins; a source that
    /// errors or returns nothing falls through to the next.
    async fn try_sources(&self, token: &Token, pair: &str) -> Option<(Quote, &'static str)> {
        for source in &self.sources {
            match source.try_quote(&token.network, pair, &token.symbol).await {
                Ok(Some(quote)) if quote.price_usd > 0.0 => {
                    return Some((quote, source.name()));
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("{} failed for {}: {}", source.name(), token.symbol, e);
                }
            }
        }
        None
    }

    async fn fetch_one_with_retry(&self, token: &Token) -> Option<(Quote, &'static str)> {
        // The list loader already normalizes, but tokens can arrive from
        // other callers with a raw URL in the pair field
        let pair = extract_pair_address(token.pair.as_deref()?)?;

        for attempt in 0..self.retry.max_attempts {
            if let Some(found) = self.try_sources(token, &pair).await {
                return Some(found);
            }
            if attempt + 1 < self.retry.max_attempts {
                sleep(self.retry.delay(attempt)).await;
            }
        }

        warn!(
            "no source produced a price for {} after {} attempts",
            token.symbol, self.retry.max_attempts
        );
        None
    }

    fn build_row(&self, token: &Token, quote: &Quote, source: &str) -> PriceData {
        let p_live = quote.price_usd;
        let p0 = {
            let baseline = derive_baseline(p_live, quote.change_pct);
            if baseline > 0.0 {
                baseline
            } else {
                p_live
            }
        };

        PriceData {
            token_id: token.id.clone(),
            symbol: token.symbol.clone(),
            p_live,
            p0,
            change_pct: quote.change_pct.unwrap_or(0.0),
            fdv: quote.fdv.unwrap_or(0.0),
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            source: source.to_string(),
            dex_url: build_view_url(&token.network, &quote.pair),
        }
    }

    /// One full refresh pass. Returns a row per token that could be priced,
    /// live where a source resolved and backfilled from the previous
    /// snapshot where none did.
    pub async fn fetch_all_prices(&self) -> Vec<PriceData> {
        let last_known = self.load_last_known().await;

        info!(
            "refreshing {} tokens across {} sources",
            self.universe.len(),
            self.sources.len()
        );

        let mut rows = Vec::with_capacity(self.universe.len());
        let mut unresolved: Vec<&Token> = Vec::new();

        for (i, token) in self.universe.iter().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                sleep(self.request_delay).await;
            }
            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("progress: {}/{}", i + 1, self.universe.len());
            }

            match self.fetch_one_with_retry(token).await {
                Some((quote, source)) => rows.push(self.build_row(token, &quote, source)),
                None => unresolved.push(token),
            }
        }

        let mut backfilled = 0usize;
        for token in unresolved {
            if let Some(prev) = last_known.get(&token.id) {
                let mut row = prev.clone();
                row.source = SOURCE_CACHED.to_string();
                row.ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
                rows.push(row);
                backfilled += 1;
            } else {
                warn!("{} has no live price and no history, dropping", token.symbol);
            }
        }

        if backfilled > 0 {
            info!("backfilled {} tokens from previous snapshot", backfilled);
        }
        info!("refresh complete: {} rows", rows.len());

        rows
    }
}
