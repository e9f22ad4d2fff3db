//! Deterministic string similarity
//!
//! The ratio is the Ratcliff/Obershelp "gestalt" measure: find the longest
//! common block, recurse on both sides of it, and report
//! `2 * matched / (len(a) + len(b))`. Scores for a pair are memoized in a small
//! bounded table owned by the matcher.

use crate::cache::{BoundedCache, CacheConfig};
use crate::text::{alphanumeric, normalize};

/// Default threshold for [`FuzzyMatcher::similar`]
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Similarity ratio in `[0, 1]` between two character sequences
///
/// Two empty inputs are identical (1.0).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Total size of the recursively found matching blocks
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`
///
/// Ties go to the block that starts earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // slot j - blo + 1 holds the length of the common run ending at (i, j)
    let width = bhi - blo;
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            current[slot] = if a[i] == b[j] { previous[slot - 1] + 1 } else { 0 };
            let k = current[slot];
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    (best_i, best_j, best_size)
}

/// Memoizing similarity scorer
pub struct FuzzyMatcher {
    memo: BoundedCache<f64>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(CacheConfig::fuzzy_memo())
    }
}

impl FuzzyMatcher {
    /// Create a matcher whose memo table follows `memo_config`
    pub fn new(memo_config: CacheConfig) -> Self {
        Self {
            memo: BoundedCache::new(memo_config),
        }
    }

    /// Similarity of the normalized (lowercased, trimmed) forms, in `[0, 1]`
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let a = normalize(a);
        let b = normalize(b);
        let key = format!("{}\u{1f}{}", a, b);

        if let Some(score) = self.memo.get(&key) {
            return score;
        }
        let score = ratio(&a, &b);
        self.memo.insert(key, score);
        score
    }

    /// Near-equality test with the default threshold
    pub fn similar(&self, a: &str, b: &str) -> bool {
        self.similar_with_threshold(a, b, DEFAULT_THRESHOLD)
    }

    /// Near-equality test
    ///
    /// True when the normalized strings are equal or one contains the other,
    /// when their alphanumeric-only forms are equal, or when the ratio of the
    /// alphanumeric-only forms exceeds `threshold`. Empty input never matches.
    pub fn similar_with_threshold(&self, a: &str, b: &str, threshold: f64) -> bool {
        let a = normalize(a);
        let b = normalize(b);
        if a.is_empty() || b.is_empty() {
            return false;
        }
        if a == b || a.contains(b.as_str()) || b.contains(a.as_str()) {
            return true;
        }

        let a_clean = alphanumeric(&a);
        let b_clean = alphanumeric(&b);
        if a_clean == b_clean {
            return true;
        }
        self.score(&a_clean, &b_clean) > threshold
    }

    /// Number of memoized pairs
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}
