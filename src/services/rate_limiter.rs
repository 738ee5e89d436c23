//! Fixed-window rate limiter backed by the key-value store
//!
//! One counter per client address under `rate:share:<address>`. The first
//! request of a window creates the counter with the window as its TTL; later
//! requests increment it without touching the TTL. Bursts straddling a window
//! boundary are accepted.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::storage::{KvStore, rate_limit_key};

/// Outcome of one rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// `count` is this request's position in the current window
    Allowed { count: u64 },
    Limited { count: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count this request against `client_address` and decide
    pub async fn check(&self, client_address: &str) -> Result<RateLimitDecision> {
        let key = rate_limit_key(client_address);
        let count = self.store.increment(&key, self.window).await?;

        if count > self.max_requests {
            warn!(
                "Share rate limit exceeded for {} ({} requests in window, max {})",
                client_address, count, self.max_requests
            );
            Ok(RateLimitDecision::Limited { count })
        } else {
            debug!(
                "Share request {}/{} for {}",
                count, self.max_requests, client_address
            );
            Ok(RateLimitDecision::Allowed { count })
        }
    }
}
