//! Application Layer
//!
//! Orchestration over the domain and ports.

pub mod orchestrator;

pub use orchestrator::{PriceOrchestrator, SNAPSHOT_KEY};
