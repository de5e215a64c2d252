//! Trait abstraction for query embedding generation

use crate::{EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Turns text into a vector for similarity search
///
/// Implementations must be idempotent for identical text and model: the
/// search pipeline may embed the same query in several independent calls and
/// relies on getting the same vector back.
#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    /// Generate the embedding for a single piece of text
    ///
    /// Implementations should stop early and return
    /// [`EmbeddingError::Cancelled`] once `cancellation` fires.
    async fn generate_embedding(
        &self,
        text: &str,
        cancellation: &CancellationToken,
    ) -> EmbeddingResult<Vec<f32>>;

    /// Generate embeddings for several texts, in input order
    ///
    /// The default issues one call per text. Generators backed by a batch
    /// API should override it.
    async fn generate_embeddings(
        &self,
        texts: &[&str],
        cancellation: &CancellationToken,
    ) -> EmbeddingResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            if cancellation.is_cancelled() {
                return Err(EmbeddingError::Cancelled(
                    "batch embedding cancelled".to_string(),
                ));
            }
            embeddings.push(self.generate_embedding(text, cancellation).await?);
        }
        Ok(embeddings)
    }

    /// Dimensionality of the vectors this generator produces
    fn embedding_dimension(&self) -> usize;

    /// Name of the underlying model, for logging
    fn model_name(&self) -> &str;
}
