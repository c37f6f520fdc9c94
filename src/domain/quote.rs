//! Normalized Market Quote
//!
//! A `Quote` is the validated price/liquidity record for one trading pair at
//! one point in time. Quotes are only ever constructed from provider payloads
//! that pass the address-format and price-positivity checks, so a `Quote` in
//! hand is always usable downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validated market snapshot for one trading pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    /// Chain/venue identifier, lowercase canonical form
    pub network: String,
    /// Pair contract address, lowercase `0x` + 40 hex chars
    pub pair: String,
    /// Current USD price, positive and finite
    pub price_usd: f64,
    /// Percent change over the best-available window (h24 > h6 > h1 > m5)
    pub change_pct: Option<f64>,
    /// Pool liquidity in USD
    pub liquidity_usd: Option<f64>,
    /// Fully diluted valuation in USD
    pub fdv: Option<f64>,
    /// When this quote was retrieved
    pub fetched_at: DateTime<Utc>,
    /// Opaque provider payload, kept for diagnostics only
    pub raw: Value,
}

impl Quote {
    /// Build a quote, enforcing the construction invariants.
    ///
    /// Returns `None` when the pair address is not a lowercase-hex-40 address
    /// or the price is non-positive/non-finite. Optional fields are dropped
    /// unless positive and finite (zero FDV counts as absent).
    pub fn new(
        network: &str,
        pair: &str,
        price_usd: f64,
        change_pct: Option<f64>,
        liquidity_usd: Option<f64>,
        fdv: Option<f64>,
        raw: Value,
    ) -> Option<Self> {
        let pair = pair.trim().to_lowercase();
        if !is_hex_pair_address(&pair) {
            return None;
        }
        if !price_usd.is_finite() || price_usd <= 0.0 {
            return None;
        }

        Some(Self {
            network: network.to_lowercase(),
            pair,
            price_usd,
            change_pct: change_pct.filter(|c| c.is_finite()),
            liquidity_usd: liquidity_usd.filter(|l| l.is_finite() && *l > 0.0),
            fdv: fdv.filter(|f| f.is_finite() && *f > 0.0),
            fetched_at: Utc::now(),
            raw,
        })
    }
}

/// Check that `addr` is a lowercase `0x`-prefixed 40-hex-char pair address.
pub fn is_hex_pair_address(addr: &str) -> bool {
    let Some(hex) = addr.strip_prefix("0x") else {
        return false;
    };
    hex.len() == 40
        && hex
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Select the percent change to report: the first finite value among the
/// h24, h6, h1, m5 windows, in that priority order.
pub fn pick_change_pct(windows: [Option<f64>; 4]) -> Option<f64> {
    windows
        .into_iter()
        .flatten()
        .find(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAIR: &str = "0x3f0296bf652e19bca772ec3df08b32732f93014a";

    #[test]
    fn test_valid_quote_construction() {
        let q = Quote::new("base", PAIR, 1.25, Some(3.5), Some(1000.0), Some(5e6), json!({}))
            .unwrap();
        assert_eq!(q.network, "base");
        assert_eq!(q.pair, PAIR);
        assert_eq!(q.price_usd, 1.25);
        assert_eq!(q.change_pct, Some(3.5));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        assert!(Quote::new("base", PAIR, 0.0, None, None, None, json!({})).is_none());
        assert!(Quote::new("base", PAIR, -1.0, None, None, None, json!({})).is_none());
        assert!(Quote::new("base", PAIR, f64::NAN, None, None, None, json!({})).is_none());
        assert!(Quote::new("base", PAIR, f64::INFINITY, None, None, None, json!({})).is_none());
    }

    #[test]
    fn test_bad_pair_address_rejected() {
        assert!(Quote::new("base", "not-an-address", 1.0, None, None, None, json!({})).is_none());
        assert!(Quote::new("base", "0x1234", 1.0, None, None, None, json!({})).is_none());
    }

    #[test]
    fn test_pair_address_normalized_to_lowercase() {
        let upper = PAIR.to_uppercase().replace("0X", "0x");
        let q = Quote::new("base", &upper, 1.0, None, None, None, json!({})).unwrap();
        assert_eq!(q.pair, PAIR);
    }

    #[test]
    fn test_zero_fdv_treated_as_absent() {
        let q = Quote::new("base", PAIR, 1.0, None, Some(0.0), Some(0.0), json!({})).unwrap();
        assert_eq!(q.fdv, None);
        assert_eq!(q.liquidity_usd, None);
    }

    #[test]
    fn test_non_finite_change_dropped() {
        let q = Quote::new("base", PAIR, 1.0, Some(f64::NAN), None, None, json!({})).unwrap();
        assert_eq!(q.change_pct, None);
    }

    #[test]
    fn test_is_hex_pair_address() {
        assert!(is_hex_pair_address(PAIR));
        assert!(!is_hex_pair_address(&PAIR.to_uppercase()));
        assert!(!is_hex_pair_address("0x3f0296"));
        assert!(!is_hex_pair_address("3f0296bf652e19bca772ec3df08b32732f93014a"));
        assert!(!is_hex_pair_address(""));
    }

    #[test]
    fn test_change_window_priority() {
        // First finite value wins, h24 down to m5
        assert_eq!(
            pick_change_pct([Some(f64::NAN), Some(3.5), Some(1.0), None]),
            Some(3.5)
        );
        assert_eq!(pick_change_pct([Some(-2.0), Some(3.5), None, None]), Some(-2.0));
        assert_eq!(pick_change_pct([None, None, None, Some(0.4)]), Some(0.4));
        assert_eq!(pick_change_pct([None, None, None, None]), None);
        assert_eq!(pick_change_pct([Some(f64::NAN), None, None, None]), None);
    }
}
