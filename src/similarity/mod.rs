//! Category-bucketed semantic similarity over regional POI pools.

mod index;
mod ranker;
mod scenic;
mod text;

pub use index::EmbeddingIndex;
pub use ranker::SimilarityRanker;
pub use scenic::scenic_boost;
pub use text::poi_text;
