//! Quote Source Port
//!
//! Uniform contract over price providers. The orchestrator holds an ordered
//! list of sources and takes the first one to yield a valid quote, so adding
//! a third provider means implementing this trait and appending it to the
//! list - no orchestrator changes.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::quote::Quote;

/// Provider-side failure. Callers treat this as "no quote for this attempt"
/// and retry; it never escapes an orchestration run.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("provider error: {0}")]
    Provider(String),
}

/// A price provider that can be asked for one pair's quote.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Stable label recorded in the published snapshot's `source` field
    fn name(&self) -> &'static str;

    /// Try to resolve a quote for `pair` on `network`.
    ///
    /// `Ok(None)` is a definitive "provider has no quote" for this attempt;
    /// `Err` is a transport/provider failure. `symbol` is advisory, for
    /// providers and logs that want it.
    async fn try_quote(
        &self,
        network: &str,
        pair: &str,
        symbol: &str,
    ) -> Result<Option<Quote>, SourceError>;
}
