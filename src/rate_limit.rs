//! Sliding-window admission control for remote calls
//!
//! One [`RateLimiter`] instance is built per process and handed to every
//! component that talks to the remote service. A denial is immediate: the call
//! is not queued and nothing sleeps.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

/// Limit and window of a [`RateLimiter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admissions inside one window
    pub limit: usize,
    /// Length of the trailing window
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// `limit` calls per minute
    pub fn per_minute(limit: usize) -> Self {
        Self {
            limit,
            window: Duration::from_secs(60),
        }
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Denied; the oldest recorded call leaves the window after `retry_after`
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Sliding-window rate limiter
///
/// Keeps the timestamps of admitted calls. Timestamps at least `window` old
/// are dropped on every check, so the number of timestamps younger than the
/// window never exceeds `limit` after an admission.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    calls: Mutex<VecDeque<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            calls: Mutex::new(VecDeque::with_capacity(config.limit)),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Admit or deny one call now, recording it when admitted
    pub fn admit(&self) -> Admission {
        let admission = self.admit_at(Instant::now());
        if let Admission::Denied { retry_after } = admission {
            warn!(
                "Rate limit reached ({} calls per {:?}), next slot in {:?}",
                self.config.limit, self.config.window, retry_after
            );
        }
        admission
    }

    pub(crate) fn admit_at(&self, now: Instant) -> Admission {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.config.window;

        while let Some(&oldest) = calls.front() {
            if now.saturating_duration_since(oldest) >= window {
                calls.pop_front();
            } else {
                break;
            }
        }

        if calls.len() >= self.config.limit {
            let retry_after = calls
                .front()
                .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(window);
            return Admission::Denied { retry_after };
        }

        calls.push_back(now);
        Admission::Allowed
    }

    /// Admitted calls still inside the window
    pub fn recent_calls(&self) -> usize {
        let now = Instant::now();
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) < self.config.window)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: usize, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            limit,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn test_admits_up_to_limit_then_denies() {
        let limiter = limiter(3, 60);
        let t0 = Instant::now();

        for i in 0..3 {
            assert!(limiter.admit_at(t0 + Duration::from_secs(i)).is_allowed());
        }
        let denied = limiter.admit_at(t0 + Duration::from_secs(10));
        assert_eq!(
            denied,
            Admission::Denied {
                retry_after: Duration::from_secs(50)
            }
        );
    }

    #[test]
    fn test_capacity_reopens_when_oldest_ages_out() {
        let limiter = limiter(2, 10);
        let t0 = Instant::now();

        assert!(limiter.admit_at(t0).is_allowed());
        assert!(limiter.admit_at(t0 + Duration::from_secs(5)).is_allowed());
        assert!(!limiter.admit_at(t0 + Duration::from_secs(9)).is_allowed());

        // t0 is exactly one window old: one slot frees up, not two
        assert!(limiter.admit_at(t0 + Duration::from_secs(10)).is_allowed());
        assert!(!limiter.admit_at(t0 + Duration::from_secs(11)).is_allowed());
    }

    #[test]
    fn test_denial_is_not_recorded() {
        let limiter = limiter(1, 10);
        let t0 = Instant::now();

        assert!(limiter.admit_at(t0).is_allowed());
        for i in 1..5 {
            assert!(!limiter.admit_at(t0 + Duration::from_secs(i)).is_allowed());
        }
        assert!(limiter.admit_at(t0 + Duration::from_secs(10)).is_allowed());
    }

    #[test]
    fn test_zero_limit_denies_everything() {
        let limiter = limiter(0, 60);
        assert!(!limiter.admit().is_allowed());
        assert_eq!(limiter.recent_calls(), 0);
    }

    #[test]
    fn test_recent_calls() {
        let limiter = RateLimiter::default();
        assert!(limiter.admit().is_allowed());
        assert!(limiter.admit().is_allowed());
        assert_eq!(limiter.recent_calls(), 2);
    }
}
