//! Published Price Rows
//!
//! `PriceData` is one row of the published snapshot. Field names serialize in
//! camelCase because the stored JSON is read directly by the game backend.

use serde::{Deserialize, Serialize};

/// Source label for rows backfilled from the previous snapshot.
pub const SOURCE_CACHED: &str = "cached";

/// One row of the published snapshot, per token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    pub token_id: String,
    pub symbol: String,
    /// Current USD price, verbatim from the resolving provider
    pub p_live: f64,
    /// Baseline price at the start of the change window
    pub p0: f64,
    #[serde(default)]
    pub change_pct: f64,
    #[serde(default)]
    pub fdv: f64,
    /// ISO timestamp of this resolution
    pub ts: String,
    /// `dexscreener`, `gecko`, or `cached`
    pub source: String,
    /// Canonical external view URL for the pair
    pub dex_url: String,
}

/// Reconstruct the approximate price at the start of the change window.
///
/// `p0 = pLive / (1 + changePct/100)`, guarded: a change that is absent,
/// non-finite, zero, or at/below -100 (division blow-up) yields the current
/// price unchanged.
pub fn derive_baseline(current_price: f64, change_pct: Option<f64>) -> f64 {
    match change_pct {
        Some(c) if c.is_finite() && c > -100.0 && c != 0.0 => current_price / (1.0 + c / 100.0),
        _ => current_price,
    }
}

/// Canonical DexScreener view URL for a pair.
pub fn build_view_url(network: &str, pair: &str) -> String {
    format!("https://dexscreener.com/{}/{}", network, pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_baseline_from_positive_change() {
        assert_relative_eq!(derive_baseline(100.0, Some(25.0)), 80.0);
    }

    #[test]
    fn test_baseline_from_negative_change() {
        assert_relative_eq!(derive_baseline(50.0, Some(-50.0)), 100.0);
    }

    #[test]
    fn test_baseline_zero_change_is_identity() {
        assert_relative_eq!(derive_baseline(100.0, Some(0.0)), 100.0);
    }

    #[test]
    fn test_baseline_guards_against_blowup() {
        // change <= -100 would divide by zero or flip the sign
        assert_relative_eq!(derive_baseline(100.0, Some(-150.0)), 100.0);
        assert_relative_eq!(derive_baseline(100.0, Some(-100.0)), 100.0);
    }

    #[test]
    fn test_baseline_absent_or_nan_change() {
        assert_relative_eq!(derive_baseline(100.0, None), 100.0);
        assert_relative_eq!(derive_baseline(100.0, Some(f64::NAN)), 100.0);
    }

    #[test]
    fn test_price_data_wire_shape() {
        let row = PriceData {
            token_id: "virtual".into(),
            symbol: "VIRTUAL".into(),
            p_live: 1.5,
            p0: 1.2,
            change_pct: 25.0,
            fdv: 1e9,
            ts: "2026-01-01T00:00:00.000Z".into(),
            source: "dexscreener".into(),
            dex_url: build_view_url("base", "0x3f0296bf652e19bca772ec3df08b32732f93014a"),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["tokenId"], "virtual");
        assert_eq!(json["pLive"], 1.5);
        assert_eq!(json["p0"], 1.2);
        assert_eq!(json["changePct"], 25.0);
        assert_eq!(json["dexUrl"].as_str().unwrap().starts_with("https://dexscreener.com/base/"), true);

        let back: PriceData = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_view_url() {
        assert_eq!(
            build_view_url("base", "0xabc"),
            "https://dexscreener.com/base/0xabc"
        );
    }
}
