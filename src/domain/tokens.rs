//! Token Universe
//!
//! Loads the static token list that defines which cards/tokens the oracle
//! tracks. The list originates from a spreadsheet export, so rows carry both
//! the sheet's column headers and plain fallback keys, and the pair field is
//! frequently a full GeckoTerminal/DexScreener URL rather than a bare
//! address. Everything is normalized here, once, at load time.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Network every listed token trades on unless the row says otherwise.
pub const DEFAULT_NETWORK: &str = "base";

/// One tracked token, normalized from the raw list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub network: String,
    /// Cleaned pair address, when one could be extracted from the row
    pub pair: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenListError {
    #[error("failed to read token list: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse token list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Extract the first `0x` + 40-hex-char address from a raw string, which may
/// be a bare address, a pool URL, or arbitrary pasted text. Returned
/// lowercase.
pub fn extract_pair_address(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i + 42 <= bytes.len() {
        if bytes[i] == b'0' && (bytes[i + 1] == b'x' || bytes[i + 1] == b'X') {
            let window = &bytes[i + 2..i + 42];
            if window.iter().all(u8::is_ascii_hexdigit) {
                let hex = std::str::from_utf8(window).ok()?;
                return Some(format!("0x{}", hex.to_ascii_lowercase()));
            }
        }
        i += 1;
    }
    None
}

/// Derive a stable token id from a ticker or name: lowercase alphanumerics,
/// leading `$` stripped.
pub fn sanitize_id(input: &str) -> String {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if cleaned.is_empty() {
        "token".to_string()
    } else {
        cleaned
    }
}

fn row_str(row: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| row.get(*k).and_then(Value::as_str))
        .unwrap_or("")
        .trim()
        .to_string()
}

fn row_to_token(row: &serde_json::Map<String, Value>) -> Token {
    let name = row_str(row, &["CARD NAME / TOKEN NAME", "name"]);
    let symbol = row_str(row, &["TICKER", "symbol"])
        .replace('$', "")
        .to_uppercase();
    let raw_link = row_str(row, &["GECKO TERMINAL POOL LINK", "dexscreenerPair", "pair"]);

    let id = {
        let from_symbol = sanitize_id(&symbol);
        if from_symbol != "token" {
            from_symbol
        } else {
            sanitize_id(&name)
        }
    };

    Token {
        symbol: if symbol.is_empty() {
            id.to_uppercase()
        } else {
            symbol
        },
        name,
        network: DEFAULT_NETWORK.to_string(),
        pair: extract_pair_address(&raw_link),
        id,
    }
}

fn rows_of(value: &Value) -> Vec<&serde_json::Map<String, Value>> {
    // Either a plain array of rows, or a sheet export: one object whose
    // values are row arrays
    let arrays: Vec<&Vec<Value>> = match value {
        Value::Array(rows) => vec![rows],
        Value::Object(sheets) => sheets.values().filter_map(Value::as_array).collect(),
        _ => vec![],
    };
    arrays
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .collect()
}

/// Tokens seeded into every universe when the list does not carry them.
fn seed_tokens() -> Vec<Token> {
    vec![Token {
        id: "virtual".to_string(),
        symbol: "VIRTUAL".to_string(),
        name: "Virtual Protocol".to_string(),
        network: DEFAULT_NETWORK.to_string(),
        pair: Some("0x3f0296bf652e19bca772ec3df08b32732f93014a".to_string()),
    }]
}

/// Parse a token-list JSON document into the ordered universe.
pub fn parse_universe(value: &Value) -> Vec<Token> {
    let mut tokens: Vec<Token> = rows_of(value).into_iter().map(row_to_token).collect();

    let existing: std::collections::HashSet<String> =
        tokens.iter().map(|t| t.id.clone()).collect();
    for seed in seed_tokens() {
        if !existing.contains(&seed.id) {
            tokens.push(seed);
        }
    }
    tokens
}

/// Load the token universe from a JSON file.
pub fn load_universe<P: AsRef<Path>>(path: P) -> Result<Vec<Token>, TokenListError> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(parse_universe(&value))
}

/// Index a universe by token id.
pub fn token_map(universe: &[Token]) -> HashMap<String, Token> {
    universe.iter().map(|t| (t.id.clone(), t.clone())).collect()
}
