//! Candidate recipe names from free-form requests
//!
//! Rules first: a known request phrase ("how to make ...") marks where the name
//! starts; otherwise a dataset recipe named in the text wins; otherwise the
//! request minus a small stop-word list is used. Short rule results (up to
//! three words) are trusted. Longer ones are handed to the remote service once,
//! falling back to the rule result when that fails.

use crate::cache::{BoundedCache, CacheConfig};
use crate::dataset::Dataset;
use crate::remote::KnowledgeClient;
use crate::text::normalize;
use std::sync::Arc;
use tracing::debug;

/// Phrases that precede a recipe name, checked in this order
const PREFIX_PHRASES: &[&str] = &[
    "recipe for",
    "how to make",
    "how do i make",
    "cook",
    "prepare",
    "can you help me make",
    "show me how to make",
    "i want to make",
];

const FILLER_WORDS: &[&str] = &["a", "an", "the", "some"];

const STOP_WORDS: &[&str] = &[
    "recipe", "make", "cook", "how", "to", "can", "you", "help", "me",
];

/// Rule results with at most this many words skip the remote fallback
const MAX_TRUSTED_WORDS: usize = 3;

pub struct NameExtractor {
    dataset: Arc<Dataset>,
    remote: Arc<KnowledgeClient>,
    cache: BoundedCache<String>,
}

impl NameExtractor {
    pub fn new(dataset: Arc<Dataset>, remote: Arc<KnowledgeClient>, cache: CacheConfig) -> Self {
        Self {
            dataset,
            remote,
            cache: BoundedCache::new(cache),
        }
    }

    /// Candidate recipe name for `text`; may be empty when nothing is left
    pub async fn extract(&self, text: &str) -> String {
        let key = normalize(text);
        if let Some(name) = self.cache.get(&key) {
            debug!("Extraction cache hit for '{}'", key);
            return name;
        }

        let rule_based = self.extract_rule_based(text);
        let words = rule_based.split_whitespace().count();
        if words > 0 && words <= MAX_TRUSTED_WORDS {
            debug!("Rule-based extraction: '{}' -> '{}'", key, rule_based);
            self.cache.insert(key, rule_based.clone());
            return rule_based;
        }

        if self.remote.is_available() {
            if let Some(name) = self.remote.fetch_name(text).await {
                debug!("Remote extraction: '{}' -> '{}'", key, name);
                self.cache.insert(key, name.clone());
                return name;
            }
        }

        debug!("Falling back to rule-based extraction '{}'", rule_based);
        rule_based
    }

    /// Rule-only extraction, no cache and no remote call
    pub fn extract_rule_based(&self, text: &str) -> String {
        let lowered = text.to_lowercase();

        for phrase in PREFIX_PHRASES {
            if let Some(rest) = text_after_last_phrase(&lowered, phrase) {
                return strip_fillers(rest);
            }
        }

        if let Some(recipe) = self
            .dataset
            .iter()
            .find(|r| lowered.contains(&normalize(&r.name)))
        {
            return recipe.name.clone();
        }

        lowered
            .split_whitespace()
            .map(trim_punctuation)
            .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Text after the last whole-word occurrence of `phrase`
fn text_after_last_phrase<'a>(text: &'a str, phrase: &str) -> Option<&'a str> {
    text.match_indices(phrase)
        .filter(|&(start, _)| {
            let end = start + phrase.len();
            let before = text[..start].chars().next_back();
            let after = text[end..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .last()
        .map(|(start, _)| &text[start + phrase.len()..])
}

fn strip_fillers(text: &str) -> String {
    text.split_whitespace()
        .map(trim_punctuation)
        .filter(|w| !w.is_empty() && !FILLER_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn trim_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimiter;

    fn extractor() -> NameExtractor {
        let dataset = Arc::new(Dataset::builtin().unwrap());
        let remote = Arc::new(KnowledgeClient::disabled(Arc::new(RateLimiter::default())));
        NameExtractor::new(dataset, remote, CacheConfig::extractions())
    }

    #[test]
    fn test_prefix_phrases() {
        let extractor = extractor();
        assert_eq!(extractor.extract_rule_based("How to make Dal Makhani?"), "dal makhani");
        assert_eq!(extractor.extract_rule_based("recipe for a masala dosa"), "masala dosa");
        assert_eq!(
            extractor.extract_rule_based("I want to make the best vada pav"),
            "best vada pav"
        );
    }

    #[test]
    fn test_prefix_phrase_needs_word_boundary() {
        let extractor = extractor();
        // "cook" inside "cookies" is not a request phrase
        assert_eq!(
            extractor.extract_rule_based("chocolate chip cookies"),
            "chocolate chip cookies"
        );
    }

    #[test]
    fn test_dataset_name_scan() {
        let extractor = extractor();
        assert_eq!(extractor.extract_rule_based("butter chicken"), "Butter Chicken");
        assert_eq!(
            extractor.extract_rule_based("tell me about chicken 65 tonight"),
            "Chicken 65"
        );
    }

    #[test]
    fn test_stop_word_fallback() {
        let extractor = extractor();
        assert_eq!(extractor.extract_rule_based("can you help me, paneer tikka"), "paneer tikka");
        assert_eq!(extractor.extract_rule_based("help me"), "");
    }

    #[tokio::test]
    async fn test_extract_caches_short_results() {
        let extractor = extractor();
        assert_eq!(extractor.extract("how do I make pani puri").await, "pani puri");
        assert_eq!(extractor.cache_len(), 1);
        assert_eq!(extractor.extract("How do I make Pani Puri ").await, "pani puri");
        assert_eq!(extractor.cache_len(), 1);
    }

    #[tokio::test]
    async fn test_long_result_without_remote_falls_back() {
        let extractor = extractor();
        let name = extractor
            .extract("my grandmother's famous slow cooked lamb stew")
            .await;
        assert_eq!(name, "my grandmother's famous slow cooked lamb stew");
        assert_eq!(extractor.cache_len(), 0);
    }
}
