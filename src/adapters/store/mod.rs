//! Snapshot Store Adapters

mod file_store;

pub use file_store::FileSnapshotStore;
