//! Content-addressed cache keys

use sha2::{Digest, Sha256};
use std::fmt;

const KEY_PREFIX: &str = "emb:";

/// Key under which a normalized text's embedding is cached.
///
/// Derived only from the text bytes, so the same text always maps to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Length of every key: the prefix plus a hex-encoded SHA-256 digest.
    pub const LEN: usize = KEY_PREFIX.len() + 64;

    pub fn for_text(normalized: &str) -> Self {
        let digest = Sha256::digest(normalized.as_bytes());
        CacheKey(format!("{}{}", KEY_PREFIX, hex::encode(digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
