//! End-to-end refresh flow over mocked providers and an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use flipflop_oracle::adapters::fetch::RetryPolicy;
use flipflop_oracle::application::{PriceOrchestrator, SNAPSHOT_KEY};
use flipflop_oracle::domain::quote::Quote;
use flipflop_oracle::domain::tokens::Token;
use flipflop_oracle::ports::mocks::{MemorySnapshotStore, MockQuoteSource};
use flipflop_oracle::ports::quote_source::QuoteSource;
use flipflop_oracle::ports::snapshot_store::SnapshotStore;

const PAIR_ALPHA: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const PAIR_BETA: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const PAIR_GAMMA: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

fn token(id: &str, pair: &str) -> Token {
    Token {
        id: id.to_string(),
        symbol: id.to_uppercase(),
        name: id.to_string(),
        network: "base".to_string(),
        pair: Some(pair.to_string()),
    }
}

fn quote(pair: &str, price: f64, change: Option<f64>) -> Quote {
    Quote::new("base", pair, price, change, Some(250_000.0), Some(1e9), json!({})).unwrap()
}

fn orchestrator(
    universe: Vec<Token>,
    sources: Vec<Arc<dyn QuoteSource>>,
    store: Arc<dyn SnapshotStore>,
) -> PriceOrchestrator {
    PriceOrchestrator::new(universe, sources, store)
        .with_pacing(Duration::ZERO, RetryPolicy::fixed(3, Duration::ZERO))
}

fn prior_row(token_id: &str, pair: &str, price: f64) -> serde_json::Value {
    json!({
        "tokenId": token_id,
        "symbol": token_id.to_uppercase(),
        "pLive": price,
        "p0": price,
        "changePct": 0.0,
        "fdv": 0.0,
        "ts": "2026-08-23T12:00:00.000Z",
        "source": "dexscreener",
        "dexUrl": format!("https://dexscreener.com/base/{}", pair)
    })
}

/// Three tokens, three resolution paths: primary hit, fallback hit, and a
/// backfill from the previous snapshot.
#[tokio::test]
async fn test_refresh_mixes_live_fallback_and_cached_rows() {
    let universe = vec![
        token("alpha", PAIR_ALPHA),
        token("beta", PAIR_BETA),
        token("gamma", PAIR_GAMMA),
    ];

    let dexscreener = Arc::new(
        MockQuoteSource::new("dexscreener")
            .with_quote(PAIR_ALPHA, quote(PAIR_ALPHA, 2.0, Some(25.0)))
            .with_failure(PAIR_BETA, "502 from provider")
            .with_failure(PAIR_GAMMA, "502 from provider"),
    );
    let gecko = Arc::new(
        MockQuoteSource::new("gecko").with_quote(PAIR_BETA, quote(PAIR_BETA, 0.05, Some(-4.0))),
    );

    let store = Arc::new(MemorySnapshotStore::new().with_value(
        SNAPSHOT_KEY,
        json!([prior_row("gamma", PAIR_GAMMA, 7.25)]),
    ));

    let orch = orchestrator(universe, vec![dexscreener.clone(), gecko.clone()], store);
    let mut rows = orch.fetch_all_prices().await;
    rows.sort_by(|a, b| a.token_id.cmp(&b.token_id));

    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].token_id, "alpha");
    assert_eq!(rows[0].source, "dexscreener");
    assert_eq!(rows[0].p_live, 2.0);
    assert!((rows[0].p0 - 1.6).abs() < 1e-9);

    assert_eq!(rows[1].token_id, "beta");
    assert_eq!(rows[1].source, "gecko");
    assert_eq!(rows[1].p_live, 0.05);

    assert_eq!(rows[2].token_id, "gamma");
    assert_eq!(rows[2].source, "cached");
    assert_eq!(rows[2].p_live, 7.25);
    assert_ne!(rows[2].ts, "2026-08-23T12:00:00.000Z");

    // primary consulted for everything, fallback only for what it missed
    assert_eq!(dexscreener.call_count(PAIR_ALPHA), 1);
    assert_eq!(gecko.call_count(PAIR_ALPHA), 0);
    // beta failed on the primary once, then the fallback answered
    assert_eq!(gecko.call_count(PAIR_BETA), 1);
    // gamma exhausted the 3-attempt schedule on both sources
    assert_eq!(dexscreener.call_count(PAIR_GAMMA), 3);
    assert_eq!(gecko.call_count(PAIR_GAMMA), 3);
}

/// A token that never resolved anywhere and has no history drops out of the
/// snapshot entirely.
#[tokio::test]
async fn test_unknown_token_without_history_is_dropped() {
    let orch = orchestrator(
        vec![token("alpha", PAIR_ALPHA), token("ghost", PAIR_GAMMA)],
        vec![Arc::new(
            MockQuoteSource::new("dexscreener").with_quote(PAIR_ALPHA, quote(PAIR_ALPHA, 1.0, None)),
        )],
        Arc::new(MemorySnapshotStore::new()),
    );

    let rows = orch.fetch_all_prices().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].token_id, "alpha");
}

/// Total provider outage with no history: the refresh yields nothing, which
/// callers treat as "keep the previous snapshot".
#[tokio::test]
async fn test_total_outage_yields_empty_result() {
    let orch = orchestrator(
        vec![token("alpha", PAIR_ALPHA)],
        vec![Arc::new(
            MockQuoteSource::new("dexscreener").with_failure(PAIR_ALPHA, "connect timeout"),
        )],
        Arc::new(MemorySnapshotStore::new()),
    );

    assert!(orch.fetch_all_prices().await.is_empty());
}

/// Publishing then re-reading through the store round-trips the wire shape.
#[tokio::test]
async fn test_published_snapshot_round_trips_through_store() {
    let store = Arc::new(MemorySnapshotStore::new());

    let orch = orchestrator(
        vec![token("alpha", PAIR_ALPHA)],
        vec![Arc::new(
            MockQuoteSource::new("dexscreener").with_quote(PAIR_ALPHA, quote(PAIR_ALPHA, 3.0, Some(50.0))),
        )],
        store.clone(),
    );

    let rows = orch.fetch_all_prices().await;
    store
        .set(SNAPSHOT_KEY, serde_json::to_value(&rows).unwrap())
        .await
        .unwrap();

    let published = store.stored(SNAPSHOT_KEY).unwrap();
    assert_eq!(published[0]["tokenId"], "alpha");
    assert_eq!(published[0]["pLive"], 3.0);
    assert_eq!(published[0]["changePct"], 50.0);
    assert_eq!(
        published[0]["dexUrl"],
        format!("https://dexscreener.com/base/{}", PAIR_ALPHA)
    );

    // a second refresh off that snapshot backfills identically except ts
    let orch2 = orchestrator(
        vec![token("alpha", PAIR_ALPHA)],
        vec![Arc::new(MockQuoteSource::new("dexscreener"))],
        store.clone(),
    );
    let rows2 = orch2.fetch_all_prices().await;
    assert_eq!(rows2[0].p_live, rows[0].p_live);
    assert_eq!(rows2[0].p0, rows[0].p0);
    assert_eq!(rows2[0].source, "cached");
}
