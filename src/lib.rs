#![allow(dead_code)]
//! FlipFlop Oracle - price-data subsystem for the FlipFlop token-card game.
//!
//! Periodically fetches live USD prices for the tracked token universe from
//! DexScreener (primary) and GeckoTerminal (fallback), reconciles the
//! sources, and publishes one consistent snapshot for the leaderboard and
//! card-economy consumers.
//!
//! # Modules
//!
//! - `domain`: Quote, PriceData, QuoteCache, token universe
//! - `ports`: Trait abstractions (QuoteSource, SnapshotStore) and mocks
//! - `adapters`: Provider clients (DexScreener, GeckoTerminal), store, CLI
//! - `application`: PriceOrchestrator
//! - `config`: Configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
