//! DexScreener Payload Handling
//!
//! The API is loose about types: `priceUsd` is a string, `fdv` shows up as
//! either a number or `{usd: number}`, and any field can be missing. Payloads
//! are therefore walked as `serde_json::Value` and normalized into the domain
//! `Quote` in one place, keeping the raw item for diagnostics.

use serde_json::Value;

use crate::domain::quote::{pick_change_pct, Quote};

/// Coerce a JSON value to f64: numbers directly, numeric strings parsed.
pub(crate) fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_f64(item: &Value, pointer: &str) -> Option<f64> {
    item.pointer(pointer).and_then(value_as_f64)
}

/// `pairs` array of a batch/token/search response, empty when absent.
pub(crate) fn pairs_array(body: &Value) -> &[Value] {
    body.get("pairs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The pair object of a single-pair response: `pair`, else `pairs[0]`.
pub(crate) fn single_pair(body: &Value) -> Option<&Value> {
    body.get("pair")
        .filter(|p| p.is_object())
        .or_else(|| pairs_array(body).first())
}

/// Normalize one `pairs[]` item into a validated `Quote`.
///
/// Returns `None` when the item fails the address-format or price-positivity
/// checks; nothing partially valid ever leaves this function.
pub(crate) fn quote_from_pair(network: &str, item: &Value) -> Option<Quote> {
    let address = item.get("pairAddress")?.as_str()?;
    let price = field_f64(item, "/priceUsd")?;

    let change = pick_change_pct([
        field_f64(item, "/priceChange/h24"),
        field_f64(item, "/priceChange/h6"),
        field_f64(item, "/priceChange/h1"),
        field_f64(item, "/priceChange/m5"),
    ]);

    let liquidity = field_f64(item, "/liquidity/usd");

    // fdv: plain number or {usd: number}
    let fdv = item
        .get("fdv")
        .and_then(|v| value_as_f64(v).or_else(|| v.get("usd").and_then(value_as_f64)));

    Quote::new(network, address, price, change, liquidity, fdv, item.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAIR: &str = "0x7f670f78b17dec44d5ef68a48740b6f8849cc2e6";

    fn payload() -> Value {
        json!({
            "pairAddress": PAIR,
            "priceUsd": "1.2345",
            "priceChange": { "h24": 25.0, "h6": 3.5, "h1": 1.0, "m5": 0.1 },
            "liquidity": { "usd": 150000.0 },
            "fdv": 5000000.0,
            "chainId": "base",
            "baseToken": { "address": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa" },
            "quoteToken": { "address": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb" }
        })
    }

    #[test]
    fn test_quote_from_valid_payload() {
        let q = quote_from_pair("base", &payload()).unwrap();
        assert_eq!(q.pair, PAIR);
        assert_eq!(q.price_usd, 1.2345);
        assert_eq!(q.change_pct, Some(25.0));
        assert_eq!(q.liquidity_usd, Some(150000.0));
        assert_eq!(q.fdv, Some(5000000.0));
        assert_eq!(q.raw["chainId"], "base");
    }

    #[test]
    fn test_string_price_parsed() {
        let mut item = payload();
        item["priceUsd"] = json!("0.000031");
        assert_eq!(quote_from_pair("base", &item).unwrap().price_usd, 0.000031);
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut item = payload();
        item["priceUsd"] = json!("0");
        assert!(quote_from_pair("base", &item).is_none());

        item["priceUsd"] = json!("not a number");
        assert!(quote_from_pair("base", &item).is_none());
    }

    #[test]
    fn test_missing_address_rejected() {
        let mut item = payload();
        item.as_object_mut().unwrap().remove("pairAddress");
        assert!(quote_from_pair("base", &item).is_none());
    }

    #[test]
    fn test_change_window_fallback() {
        let mut item = payload();
        item["priceChange"] = json!({ "h6": 3.5, "h1": 1.0 });
        assert_eq!(quote_from_pair("base", &item).unwrap().change_pct, Some(3.5));

        item["priceChange"] = json!({});
        assert_eq!(quote_from_pair("base", &item).unwrap().change_pct, None);
    }

    #[test]
    fn test_fdv_object_form() {
        let mut item = payload();
        item["fdv"] = json!({ "usd": 123.0 });
        assert_eq!(quote_from_pair("base", &item).unwrap().fdv, Some(123.0));

        item["fdv"] = json!(0);
        assert_eq!(quote_from_pair("base", &item).unwrap().fdv, None);
    }

    #[test]
    fn test_single_pair_shapes() {
        let body = json!({ "pair": payload() });
        assert!(single_pair(&body).is_some());

        let body = json!({ "pairs": [payload()] });
        assert!(single_pair(&body).is_some());

        let body = json!({ "pairs": [] });
        assert!(single_pair(&body).is_none());

        let body = json!({ "pair": null });
        assert!(single_pair(&body).is_none());
    }

    #[test]
    fn test_pairs_array_absent() {
        assert!(pairs_array(&json!({})).is_empty());
        assert!(pairs_array(&json!({ "pairs": null })).is_empty());
    }
}
