//! Ports Layer
//!
//! Trait contracts for everything external to the pipeline: price providers
//! and the snapshot store. Mocks live here too so tests across the crate
//! share one set.

pub mod mocks;
pub mod quote_source;
pub mod snapshot_store;

pub use quote_source::{QuoteSource, SourceError};
pub use snapshot_store::{SnapshotStore, StoreError};
