//! Hand-rolled mocks for the port traits, used by unit and integration
//! tests. Responses are scripted per key and every call is recorded, so
//! tests can assert both outcomes and call patterns.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::quote::Quote;
use crate::ports::quote_source::{QuoteSource, SourceError};
use crate::ports::snapshot_store::{SnapshotStore, StoreError};

/// Mock quote source with fixed per-pair responses. Unconfigured pairs
/// resolve to `Ok(None)`.
#[derive(Debug)]
pub struct MockQuoteSource {
    name: &'static str,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    responses: Arc<Mutex<HashMap<String, Result<Option<Quote>, SourceError>>>>,
}

impl MockQuoteSource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Builder method: this pair resolves to the given quote
    pub fn with_quote(self, pair: &str, quote: Quote) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(pair.to_lowercase(), Ok(Some(quote)));
        self
    }

    /// Builder method: this pair fails with a provider error
    pub fn with_failure(self, pair: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(pair.to_lowercase(), Err(SourceError::Provider(message.to_string())));
        self
    }

    /// All recorded `(network, pair)` calls, in order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made for one pair
    pub fn call_count(&self, pair: &str) -> usize {
        let pair = pair.to_lowercase();
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p)| *p == pair)
            .count()
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn try_quote(
        &self,
        network: &str,
        pair: &str,
        _symbol: &str,
    ) -> Result<Option<Quote>, SourceError> {
        let pair = pair.to_lowercase();
        self.calls
            .lock()
            .unwrap()
            .push((network.to_string(), pair.clone()));
        self.responses
            .lock()
            .unwrap()
            .get(&pair)
            .cloned()
            .unwrap_or(Ok(None))
    }
}

/// In-memory snapshot store.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: pre-seed a stored value
    pub fn with_value(self, key: &str, value: Value) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value);
        self
    }

    /// Peek at a stored value without going through the trait
    pub fn stored(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value);
        Ok(())
    }
}
