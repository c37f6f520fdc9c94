//! DexScreener Adapter
//!
//! Primary market-data provider: batched pair lookups, single-pair fetch,
//! and the bare-token to best-pair resolver.

mod client;
mod resolver;
mod types;

pub use client::{
    DexscreenerClient, DexscreenerConfig, PairOutcome, CHUNK_PACING, CHUNK_SIZE,
    DEFAULT_API_URL, ORACLE_USER_AGENT,
};
