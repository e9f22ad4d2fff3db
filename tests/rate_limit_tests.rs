//! Sliding-window rate limiting, alone and shared between remote clients

mod common;

use common::ScriptedProvider;
use recipe_resolver::{
    Admission, KnowledgeClient, RateLimitConfig, RateLimiter, RetryPolicy,
};
use std::sync::Arc;
use std::time::Duration;

fn limiter(limit: usize, window_ms: u64) -> RateLimiter {
    RateLimiter::new(RateLimitConfig {
        limit,
        window: Duration::from_millis(window_ms),
    })
}

#[test]
fn test_limit_then_deny_without_blocking() {
    let limiter = limiter(5, 60_000);
    for _ in 0..5 {
        assert_eq!(limiter.admit(), Admission::Allowed);
    }

    let start = std::time::Instant::now();
    let denied = limiter.admit();
    assert!(!denied.is_allowed());
    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(limiter.recent_calls(), 5);
}

#[tokio::test]
async fn test_window_reopens() {
    let limiter = limiter(2, 150);
    assert!(limiter.admit().is_allowed());
    assert!(limiter.admit().is_allowed());
    assert!(!limiter.admit().is_allowed());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(limiter.admit().is_allowed());
    assert_eq!(limiter.recent_calls(), 1);
}

#[test]
fn test_shared_limiter_across_clients() {
    let shared = Arc::new(limiter(1, 60_000));
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_name("first long request text here", "Dhokla")
            .with_name("second long request text here", "Vada Pav"),
    );

    let first = KnowledgeClient::new(provider.clone(), Arc::clone(&shared))
        .with_retry_policies(RetryPolicy::immediate(2), RetryPolicy::immediate(2));
    let second = KnowledgeClient::new(provider.clone(), Arc::clone(&shared))
        .with_retry_policies(RetryPolicy::immediate(2), RetryPolicy::immediate(2));

    let name = tokio_test::block_on(first.fetch_name("first long request text here"));
    assert_eq!(name.as_deref(), Some("Dhokla"));

    let name = tokio_test::block_on(second.fetch_name("second long request text here"));
    assert!(name.is_none());
    assert_eq!(provider.calls(), 1);
}
