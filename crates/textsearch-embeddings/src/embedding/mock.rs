//! Deterministic embedding generator for tests

use super::traits::EmbeddingGenerator;
use crate::{EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use textsearch_common::CommonError;
use tokio_util::sync::CancellationToken;

/// Mock embedding generator
///
/// Without a fixed vector, text is embedded by hashing each lowercase
/// whitespace-separated token into one of `dimension` buckets and normalizing,
/// so identical text always yields the identical vector.
#[derive(Clone)]
pub struct MockEmbeddingGenerator {
    dimension: usize,
    fixed_vector: Option<Vec<f32>>,
    fail_on_generate: bool,
    calls: Arc<AtomicUsize>,
}

impl MockEmbeddingGenerator {
    /// Create a hashing generator producing `dimension`-sized vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fixed_vector: None,
            fail_on_generate: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always return `vector`, whatever the text
    #[must_use]
    pub fn with_fixed_vector(mut self, vector: Vec<f32>) -> Self {
        self.dimension = vector.len();
        self.fixed_vector = Some(vector);
        self
    }

    /// Configure to fail every call (for testing error handling)
    #[must_use]
    pub const fn with_failure(mut self) -> Self {
        self.fail_on_generate = true;
        self
    }

    /// Number of `generate_embedding` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hash_embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension.max(1)];
        for token in text.split_whitespace() {
            // FNV-1a
            let hash = token
                .to_lowercase()
                .bytes()
                .fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
                    (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
                });
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hash % vector.len() as u64) as usize;
            if let Some(slot) = vector.get_mut(bucket) {
                *slot += 1.0;
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingGenerator for MockEmbeddingGenerator {
    async fn generate_embedding(
        &self,
        text: &str,
        cancellation: &CancellationToken,
    ) -> EmbeddingResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if cancellation.is_cancelled() {
            return Err(EmbeddingError::cancelled(format!(
                "embedding of '{text}' cancelled"
            )));
        }
        if self.fail_on_generate {
            return Err(EmbeddingError::generation_error(
                "Mock generator configured to fail",
            ));
        }

        Ok(self
            .fixed_vector
            .clone()
            .unwrap_or_else(|| self.hash_embed(text)))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &'static str {
        "mock-embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedding_is_deterministic() {
        let generator = MockEmbeddingGenerator::new(16);
        let token = CancellationToken::new();

        let a = generator.generate_embedding("Rust async streams", &token).await.unwrap();
        let b = generator.generate_embedding("rust ASYNC streams", &token).await.unwrap();

        assert_eq!(a.len(), 16);
        assert_eq!(a, b);
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fixed_vector_and_failure_modes() {
        let token = CancellationToken::new();

        let fixed = MockEmbeddingGenerator::new(2).with_fixed_vector(vec![1.0, 0.0]);
        assert_eq!(
            fixed.generate_embedding("anything", &token).await.unwrap(),
            vec![1.0, 0.0]
        );

        let failing = MockEmbeddingGenerator::new(2).with_failure();
        assert!(matches!(
            failing.generate_embedding("anything", &token).await,
            Err(EmbeddingError::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let generator = MockEmbeddingGenerator::new(4);
        let token = CancellationToken::new();
        token.cancel();

        let err = generator.generate_embedding("query", &token).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_default_batch_preserves_order() {
        let generator = MockEmbeddingGenerator::new(8);
        let token = CancellationToken::new();

        let batch = generator
            .generate_embeddings(&["alpha", "beta"], &token)
            .await
            .unwrap();
        let alpha = generator.generate_embedding("alpha", &token).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.first(), Some(&alpha));
    }
}
