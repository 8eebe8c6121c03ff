use crate::cache::{CacheStats, EmbeddingCache};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory embedding cache backed by moka with TTL and bounded capacity.
/// All methods take `&self`; moka handles the locking internally.
pub struct MemoryEmbeddingCache {
    vectors: Cache<String, Arc<Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryEmbeddingCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let vectors = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MemoryEmbeddingCache {
            vectors,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingCache for MemoryEmbeddingCache {
    async fn get_vector(&self, key: &str) -> Option<Vec<f32>> {
        match self.vectors.get(key).await {
            Some(arc_vec) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache hit for embedding: {}", key);
                Some((*arc_vec).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache miss for embedding: {}", key);
                None
            }
        }
    }

    async fn put_vector(&self, key: &str, vector: &[f32]) {
        self.vectors
            .insert(key.to_string(), Arc::new(vector.to_vec()))
            .await;
        tracing::debug!("Memory cached embedding ({} dims): {}", vector.len(), key);
    }

    async fn get_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            connected: true,
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
