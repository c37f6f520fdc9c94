//! Adapters Layer
//!
//! Implementations against the outside world: the DexScreener and
//! GeckoTerminal provider clients, the snapshot store, the CLI surface, and
//! the shared fetch plumbing they build on.

pub mod cli;
pub mod dexscreener;
pub mod fetch;
pub mod gecko;
pub mod store;

pub use fetch::{Backoff, FetchError, RetryPolicy};
