//! Bounded retry with exponential backoff
//!
//! Each remote call site carries its own [`RetryPolicy`]. The loop is explicit:
//! an attempt counter, a computed delay, and a hard cap on both.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempt bound and backoff shape for one call site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Base of the exponential backoff
    pub multiplier: Duration,
    /// Lower bound on any single delay
    pub min_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::recipe_fetch()
    }
}

impl RetryPolicy {
    /// Short name-extraction completions: 2 attempts, 2-4 s backoff
    pub fn extraction() -> Self {
        Self {
            max_attempts: 2,
            multiplier: Duration::from_secs(1),
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(4),
        }
    }

    /// Full recipe-document completions: 2 attempts, 4-10 s backoff
    pub fn recipe_fetch() -> Self {
        Self {
            max_attempts: 2,
            multiplier: Duration::from_secs(1),
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }

    /// Policy without waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    ///
    /// `clamp(multiplier * 2^(attempt-1), min_delay, max_delay)`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let raw = self.multiplier.saturating_mul(1u32 << exponent);
        raw.max(self.min_delay).min(self.max_delay.max(self.min_delay))
    }

    /// Run `op` until it succeeds or the attempts are used up
    ///
    /// Returns the last error when every attempt fails. A policy with
    /// `max_attempts == 0` still makes one attempt.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", operation, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if attempt >= max_attempts => return Err(e),
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying after {:?}: {}",
                        operation, attempt, max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
