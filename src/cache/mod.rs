mod memory;
mod redis;

pub use memory::MemoryEmbeddingCache;
pub use redis::RedisEmbeddingCache;

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hit/miss statistics for monitoring cache effectiveness.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub connected: bool,
}

/// Append-only store for computed embedding vectors, keyed by a content hash
/// of the exact embedded text. Writes are idempotent upserts, so concurrent
/// races are harmless.
#[async_trait]
pub trait EmbeddingCache: Send + Sync {
    /// Look up a cached vector. Cache failures read as misses.
    async fn get_vector(&self, key: &str) -> Option<Vec<f32>>;

    /// Store a vector. Failures are logged, never propagated.
    async fn put_vector(&self, key: &str, vector: &[f32]);

    async fn get_stats(&self) -> CacheStats;

    fn backend_name(&self) -> &'static str;
}

/// Cache key for an embedding: hash of the exact text.
/// Identical text always yields the same key within a process.
pub fn embedding_cache_key(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("emb:{:x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        let a = embedding_cache_key("[category: lake] [tags: natural=water]");
        let b = embedding_cache_key("[category: lake] [tags: natural=water]");
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_for_different_text() {
        let a = embedding_cache_key("lake text");
        let b = embedding_cache_key("waterfall text");
        assert_ne!(a, b);
    }
}
