//! Deadline-bounded race between two recipe lookups
//!
//! Both lookups run as spawned tasks. The first one to produce a recipe wins;
//! the other task is detached and whatever it returns later is dropped with
//! the channel.

use crate::dataset::Recipe;
use crate::lookup::{RecipeLookup, SourceTag};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Default time the race may take
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

pub struct ParallelResolver {
    local: Arc<dyn RecipeLookup>,
    remote: Arc<dyn RecipeLookup>,
    deadline: Duration,
}

impl ParallelResolver {
    pub fn new(local: Arc<dyn RecipeLookup>, remote: Arc<dyn RecipeLookup>) -> Self {
        Self::with_deadline(local, remote, DEFAULT_DEADLINE)
    }

    pub fn with_deadline(
        local: Arc<dyn RecipeLookup>,
        remote: Arc<dyn RecipeLookup>,
        deadline: Duration,
    ) -> Self {
        Self {
            local,
            remote,
            deadline,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// First recipe found by either lookup, tagged with its source
    ///
    /// Returns `None` when the deadline passes without a result, or earlier
    /// when both lookups have already come back empty.
    pub async fn fetch(&self, name: &str) -> Option<(Arc<Recipe>, SourceTag)> {
        let (tx, mut rx) = mpsc::channel(2);

        for lookup in [&self.local, &self.remote] {
            let lookup = Arc::clone(lookup);
            let tx = tx.clone();
            let name = name.to_string();
            // JoinHandle dropped: the task is detached, never aborted
            tokio::spawn(async move {
                if let Some(recipe) = lookup.lookup(&name).await {
                    let _ = tx.send((recipe, lookup.source())).await;
                }
            });
        }
        drop(tx);

        match tokio::time::timeout(self.deadline, rx.recv()).await {
            Ok(Some((recipe, source))) => {
                debug!("Race for '{}' won by {}: {}", name, source, recipe.id);
                Some((recipe, source))
            }
            Ok(None) => {
                debug!("Race for '{}': neither lookup found a recipe", name);
                None
            }
            Err(_) => {
                warn!(
                    "Race for '{}' hit the {:?} deadline without a result",
                    name, self.deadline
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use async_trait::async_trait;

    struct Delayed {
        source: SourceTag,
        delay: Duration,
        recipe: Option<Arc<Recipe>>,
    }

    #[async_trait]
    impl RecipeLookup for Delayed {
        fn source(&self) -> SourceTag {
            self.source
        }

        async fn lookup(&self, _name: &str) -> Option<Arc<Recipe>> {
            tokio::time::sleep(self.delay).await;
            self.recipe.clone()
        }
    }

    fn recipe(id: &str) -> Option<Arc<Recipe>> {
        Dataset::builtin().unwrap().get(id).cloned()
    }

    fn delayed(source: SourceTag, millis: u64, id: Option<&str>) -> Arc<dyn RecipeLookup> {
        Arc::new(Delayed {
            source,
            delay: Duration::from_millis(millis),
            recipe: id.and_then(recipe),
        })
    }

    #[tokio::test]
    async fn test_faster_lookup_wins() {
        let resolver = ParallelResolver::new(
            delayed(SourceTag::Local, 10, Some("dhokla")),
            delayed(SourceTag::Remote, 200, Some("vada_pav")),
        );
        let (recipe, source) = resolver.fetch("dhokla").await.unwrap();
        assert_eq!(source, SourceTag::Local);
        assert_eq!(recipe.id, "dhokla");
    }

    #[tokio::test]
    async fn test_empty_result_does_not_win() {
        let resolver = ParallelResolver::new(
            delayed(SourceTag::Local, 0, None),
            delayed(SourceTag::Remote, 30, Some("vada_pav")),
        );
        let (_, source) = resolver.fetch("vada pav").await.unwrap();
        assert_eq!(source, SourceTag::Remote);
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let resolver = ParallelResolver::with_deadline(
            delayed(SourceTag::Local, 500, Some("dhokla")),
            delayed(SourceTag::Remote, 500, Some("dhokla")),
            Duration::from_millis(50),
        );
        let start = std::time::Instant::now();
        assert!(resolver.fetch("dhokla").await.is_none());
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_both_empty_returns_before_deadline() {
        let resolver = ParallelResolver::new(
            delayed(SourceTag::Local, 0, None),
            delayed(SourceTag::Remote, 10, None),
        );
        let start = std::time::Instant::now();
        assert!(resolver.fetch("nothing").await.is_none());
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
