//! GeckoTerminal Adapter
//!
//! Secondary quote provider, fallback for pairs the primary cannot price.

mod client;

pub use client::{GeckoClient, GeckoConfig, DEFAULT_API_URL as GECKO_API_URL};
