//! Pair Resolver
//!
//! Maps a bare token address to the single best trading pair to track, for
//! rows where the list only carries a token contract and not a pool. Three
//! lookups are tried in order, each independently fallible and swallowed:
//!
//! 1. per-network token endpoint
//! 2. cross-network token endpoint
//! 3. free-text search, filtered to the requested network
//!
//! Only exhaustion of all three yields "unresolved".

use std::cmp::Ordering;

use reqwest::Client;
use serde_json::Value;

use super::types::{pairs_array, value_as_f64};
use crate::domain::quote::is_hex_pair_address;

struct Candidate {
    addr: String,
    liquidity: f64,
    base: String,
    quote: String,
}

/// GET a JSON body, swallowing every failure mode into `None`.
async fn fetch_json(http: &Client, url: &str) -> Option<Value> {
    let resp = http.get(url).send().await.ok()?;
    if !resp.status().is_success() {
        return None;
    }
    resp.json().await.ok()
}

/// Resolve `token` on `network` to its best pair address, or `None`.
pub(crate) async fn resolve_best_pair(
    http: &Client,
    api_url: &str,
    network: &str,
    token: &str,
) -> Option<String> {
    let network_url = format!("{}/latest/dex/tokens/{}/{}", api_url, network, token);
    if let Some(body) = fetch_json(http, &network_url).await {
        if let Some(best) = pick_best_pair(pairs_array(&body), network, token) {
            return Some(best);
        }
    }

    let global_url = format!("{}/latest/dex/tokens/{}", api_url, token);
    if let Some(body) = fetch_json(http, &global_url).await {
        if let Some(best) = pick_best_pair(pairs_array(&body), network, token) {
            return Some(best);
        }
    }

    let search_url = format!("{}/latest/dex/search?q={}", api_url, token);
    if let Some(body) = fetch_json(http, &search_url).await {
        if let Some(best) = pick_best_pair(pairs_array(&body), network, token) {
            return Some(best);
        }
    }

    tracing::debug!("no pair resolved for token {} on {}", token, network);
    None
}

/// Score candidate pairs and pick the best one.
///
/// Candidates are discarded when the chain does not match, the pair address
/// is malformed, or the liquidity-USD field is absent. Survivors are ranked
/// by "the queried token is the base or quote of this pair" first, liquidity
/// second.
pub(crate) fn pick_best_pair(pairs: &[Value], network: &str, token: &str) -> Option<String> {
    let token = token.to_lowercase();

    let mut valid: Vec<Candidate> = pairs
        .iter()
        .filter_map(|p| {
            let chain = p.get("chainId")?.as_str()?.to_lowercase();
            if chain != network {
                return None;
            }
            let addr = p.get("pairAddress")?.as_str()?.to_lowercase();
            if !is_hex_pair_address(&addr) {
                return None;
            }
            let liquidity = p.pointer("/liquidity/usd").and_then(value_as_f64)?;
            let base = p
                .pointer("/baseToken/address")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_lowercase();
            let quote = p
                .pointer("/quoteToken/address")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_lowercase();
            Some(Candidate {
                addr,
                liquidity,
                base,
                quote,
            })
        })
        .collect();

    if valid.is_empty() {
        return None;
    }

    valid.sort_by(|a, b| {
        let a_match = (a.base == token || a.quote == token) as u8;
        let b_match = (b.base == token || b.quote == token) as u8;
        b_match.cmp(&a_match).then(
            b.liquidity
                .partial_cmp(&a.liquidity)
                .unwrap_or(Ordering::Equal),
        )
    });

    Some(valid.remove(0).addr)
}
