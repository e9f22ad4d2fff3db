//! Race semantics of the parallel resolver

mod common;

use common::{builtin_recipe, SlowLookup};
use recipe_resolver::{ParallelResolver, RecipeLookup, SourceTag};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_local_first_wins_even_when_remote_succeeds() {
    let local = Arc::new(SlowLookup::new(SourceTag::Local, 10, Some(builtin_recipe("dhokla"))));
    let remote = Arc::new(SlowLookup::new(
        SourceTag::Remote,
        150,
        Some(builtin_recipe("dal_baati")),
    ));
    let remote_finished = Arc::clone(&remote.finished);
    let resolver = ParallelResolver::new(local, remote);

    let (recipe, source) = resolver.fetch("dhokla").await.unwrap();
    assert_eq!(source, SourceTag::Local);
    assert_eq!(recipe.id, "dhokla");

    // the loser keeps running in the background and its result is dropped
    assert_eq!(remote_finished.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(remote_finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_remote_wins_when_local_exceeds_deadline() {
    let local: Arc<dyn RecipeLookup> = Arc::new(SlowLookup::new(
        SourceTag::Local,
        1_000,
        Some(builtin_recipe("dhokla")),
    ));
    let remote: Arc<dyn RecipeLookup> = Arc::new(SlowLookup::new(
        SourceTag::Remote,
        20,
        Some(builtin_recipe("vada_pav")),
    ));
    let resolver = ParallelResolver::with_deadline(local, remote, Duration::from_millis(200));

    let (recipe, source) = resolver.fetch("vada pav").await.unwrap();
    assert_eq!(source, SourceTag::Remote);
    assert_eq!(recipe.id, "vada_pav");
}

#[tokio::test]
async fn test_deadline_without_result() {
    let local: Arc<dyn RecipeLookup> =
        Arc::new(SlowLookup::new(SourceTag::Local, 1_000, Some(builtin_recipe("dhokla"))));
    let remote: Arc<dyn RecipeLookup> =
        Arc::new(SlowLookup::new(SourceTag::Remote, 1_000, Some(builtin_recipe("dhokla"))));
    let resolver = ParallelResolver::with_deadline(local, remote, Duration::from_millis(100));

    let start = Instant::now();
    assert!(resolver.fetch("dhokla").await.is_none());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(900));
}

#[tokio::test]
async fn test_default_deadline_is_five_seconds() {
    let local: Arc<dyn RecipeLookup> = Arc::new(SlowLookup::new(SourceTag::Local, 0, None));
    let remote: Arc<dyn RecipeLookup> = Arc::new(SlowLookup::new(SourceTag::Remote, 0, None));
    let resolver = ParallelResolver::new(local, remote);
    assert_eq!(resolver.deadline(), Duration::from_secs(5));
    assert!(resolver.fetch("anything").await.is_none());
}
