use crate::cache::{embedding_cache_key, EmbeddingCache};
use crate::error::{AppError, Result};
use crate::models::PoiRecord;
use crate::services::Embedder;
use std::sync::Arc;

/// Per-category vector index over POI descriptions.
///
/// Vectors are unit-normalized at embed time, so inner product equals cosine
/// similarity. Metadata is stored positionally alongside the vectors. Builds
/// are all-or-nothing: an embedder failure leaves the index unchanged and the
/// caller retries the whole bucket.
pub struct EmbeddingIndex {
    embedder: Arc<dyn Embedder>,
    cache: Arc<dyn EmbeddingCache>,
    vectors: Vec<Vec<f32>>,
    items: Vec<PoiRecord>,
}

impl EmbeddingIndex {
    pub fn new(embedder: Arc<dyn Embedder>, cache: Arc<dyn EmbeddingCache>) -> Self {
        EmbeddingIndex {
            embedder,
            cache,
            vectors: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Embed `texts` (cache-aware) and add `items` in the same order.
    pub async fn build(&mut self, items: Vec<PoiRecord>, texts: &[String]) -> Result<()> {
        if items.len() != texts.len() {
            return Err(AppError::Internal(format!(
                "Index build mismatch: {} items vs {} texts",
                items.len(),
                texts.len()
            )));
        }

        let vectors = self.embed_cached(texts).await?;
        self.vectors.extend(vectors);
        self.items.extend(items);
        Ok(())
    }

    /// Top-N inner-product search. Returns up to `top_n` `(item, cosine)`
    /// pairs sorted by descending cosine; fewer when the index is smaller,
    /// empty when the index is empty.
    pub async fn search(&self, query_text: &str, top_n: usize) -> Result<Vec<(PoiRecord, f64)>> {
        if self.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let query = self
            .embed_cached(std::slice::from_ref(&query_text.to_string()))
            .await?
            .remove(0);

        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, dot(&query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_n);

        Ok(scored
            .into_iter()
            .map(|(i, cosine)| (self.items[i].clone(), cosine))
            .collect())
    }

    /// Resolve texts to vectors, reading the cache first and batch-embedding
    /// only the misses. Newly computed vectors are normalized and upserted.
    async fn embed_cached(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut resolved: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut miss_texts: Vec<String> = Vec::new();
        let mut miss_positions: Vec<usize> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let key = embedding_cache_key(text);
            match self.cache.get_vector(&key).await {
                Some(vector) => resolved.push(Some(vector)),
                None => {
                    resolved.push(None);
                    miss_texts.push(text.clone());
                    miss_positions.push(i);
                }
            }
        }

        if !miss_texts.is_empty() {
            let computed = self.embedder.embed(&miss_texts).await?;
            if computed.len() != miss_texts.len() {
                return Err(AppError::Embedding(format!(
                    "Embedder returned {} vectors for {} texts",
                    computed.len(),
                    miss_texts.len()
                )));
            }

            for (vector, position) in computed.into_iter().zip(miss_positions) {
                let mut vector = vector;
                normalize(&mut vector);
                let key = embedding_cache_key(&texts[position]);
                self.cache.put_vector(&key, &vector).await;
                resolved[position] = Some(vector);
            }
        }

        let vectors: Vec<Vec<f32>> = resolved.into_iter().flatten().collect();
        if let Some(first) = vectors.first() {
            let dim = first.len();
            if vectors.iter().any(|v| v.len() != dim) {
                return Err(AppError::Embedding(
                    "Embedder returned vectors of mixed dimension".to_string(),
                ));
            }
        }
        Ok(vectors)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
