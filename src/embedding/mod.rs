//! Embedding seam
//!
//! [`Embedder`] is the pluggable boundary between the engine and whatever
//! produces vectors. The shipped [`HashEmbedder`] is a deterministic stub:
//! it folds character codes into a fixed-width bucket vector, which is enough
//! to exercise ranking and grounding end to end. A real model client drops in
//! behind the same trait without touching callers; the only contract is a
//! fixed dimension and determinism for identical input.

pub mod codec;

use async_trait::async_trait;

use crate::errors::Result;

/// Maps a text fragment to a fixed-dimension vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Vector width produced by this implementation. Constant for its
    /// lifetime; all vectors compared together must share it.
    fn dimension(&self) -> usize;

    /// Embed one text. Deterministic for identical input; errors rather
    /// than returning a partially filled vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Default stub dimension
pub const HASH_EMBEDDER_DIM: usize = 8;

/// Deterministic character-folding embedder
///
/// Each character's code point is added into `position % dimension`. Purely
/// arithmetic, no I/O, identical input always yields the identical vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: HASH_EMBEDDER_DIM,
        }
    }

    /// Stub with a custom width, handy for tests with tiny vectors
    pub fn with_dimension(dimension: usize) -> Self {
        assert!(dimension > 0, "embedder dimension must be nonzero");
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut buckets = vec![0.0f32; self.dimension];
        for (i, ch) in text.chars().enumerate() {
            buckets[i % self.dimension] += ch as u32 as f32;
        }
        Ok(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_is_deterministic() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("alpha beta gamma").await.unwrap();
        let b = embedder.embed("alpha beta gamma").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_embed_dimension_is_fixed() {
        let embedder = HashEmbedder::new();
        let short = embedder.embed("x").await.unwrap();
        let long = embedder.embed(&"word ".repeat(500)).await.unwrap();
        assert_eq!(short.len(), HASH_EMBEDDER_DIM);
        assert_eq!(long.len(), HASH_EMBEDDER_DIM);
    }

    #[tokio::test]
    async fn test_different_input_differs() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("alpha").await.unwrap();
        let b = embedder.embed("omega").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_input_embeds_to_zero_vector() {
        let embedder = HashEmbedder::new();
        let v = embedder.embed("").await.unwrap();
        assert_eq!(v, vec![0.0; HASH_EMBEDDER_DIM]);
    }
}
