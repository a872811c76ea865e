//! Content fingerprints for the image cache.

use std::fmt;

use sha2::{Digest, Sha256};

/// Deterministic fingerprint of the fields that define a generated image.
///
/// Computed as lowercase hex SHA-256 over `title`, a NUL separator, and the
/// generation context (explicit prompt, else description). The separator
/// keeps `("a-b", "c")` and `("a", "b-c")` apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Fingerprint a title and its generation context.
    pub fn new(title: &str, context: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update([0u8]);
        hasher.update(context.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Fingerprint a request the way the generation client does: an explicit
    /// prompt replaces the description.
    pub fn for_request(title: &str, description: &str, prompt: Option<&str>) -> Self {
        Self::new(title, prompt.unwrap_or(description))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_deterministic() {
        let k1 = CacheKey::new("Vanguard", "rugged");
        let k2 = CacheKey::new("Vanguard", "rugged");
        assert_eq!(k1, k2);
        assert_eq!(k1.as_str().len(), 64);
    }

    #[test]
    fn key_differs_on_title() {
        assert_ne!(CacheKey::new("a", "x"), CacheKey::new("b", "x"));
    }

    #[test]
    fn key_differs_on_context() {
        assert_ne!(CacheKey::new("a", "x"), CacheKey::new("a", "y"));
    }

    #[test]
    fn key_separator_prevents_shifted_collision() {
        assert_ne!(CacheKey::new("a-b", "c"), CacheKey::new("a", "b-c"));
        assert_ne!(CacheKey::new("ab", ""), CacheKey::new("a", "b"));
    }

    #[test]
    fn prompt_replaces_description() {
        let with_prompt = CacheKey::for_request("t", "description", Some("prompt"));
        assert_eq!(with_prompt, CacheKey::new("t", "prompt"));
        let without = CacheKey::for_request("t", "description", None);
        assert_eq!(without, CacheKey::new("t", "description"));
    }
}
