//! Text normalization shared by the index, the caches and the matchers

/// Lowercase and trim; the canonical form for cache keys and name lookups
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Normalized whitespace-separated tokens
pub fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Lowercased form with every non-alphanumeric character removed
pub fn alphanumeric(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercase slug joined by `_`, used for ids of remote recipes
pub fn slug(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
