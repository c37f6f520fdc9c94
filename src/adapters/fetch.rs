//! Shared Fetch Plumbing
//!
//! One retry policy abstraction used by the batch fetcher, the single-pair
//! fetch, the GeckoTerminal client, and the orchestrator's per-token retry,
//! parameterized per call site instead of each loop hand-rolling its own
//! schedule. Also the transport-level error taxonomy shared by the provider
//! clients.

use std::time::Duration;

use thiserror::Error;

/// Transport/provider failure. Clonable because a chunk failure fans the same
/// error out to every address awaiting that chunk.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Non-2xx, non-429 response; not retried
    #[error("provider responded {0}")]
    Status(u16),
    /// Still rate limited after exhausting the retry ceiling
    #[error("rate limited after {0} attempts")]
    RateLimited(u32),
    /// Network-level failure (connect, timeout, body decode)
    #[error("network error: {0}")]
    Network(String),
    /// HTTP client construction failed
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Same delay every attempt
    Fixed(Duration),
    /// `base * 2^attempt` (attempt is zero-based)
    Exponential { base: Duration },
}

/// Bounded retry with a configurable delay schedule.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { base },
        }
    }

    /// Delay to wait after the given zero-based attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(d) => d,
            Backoff::Exponential { base } => base.saturating_mul(2u32.saturating_pow(attempt)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_schedule() {
        let policy = RetryPolicy::exponential(3, Duration::from_millis(250));

        // Strictly increasing: 250ms, 500ms, 1000ms
        assert_eq!(policy.delay(0), Duration::from_millis(250));
        assert_eq!(policy.delay(1), Duration::from_millis(500));
        assert_eq!(policy.delay(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_fixed_schedule() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(500));

        assert_eq!(policy.delay(0), Duration::from_millis(500));
        assert_eq!(policy.delay(2), Duration::from_millis(500));
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(500).to_string(), "provider responded 500");
        assert_eq!(
            FetchError::RateLimited(3).to_string(),
            "rate limited after 3 attempts"
        );
    }
}
