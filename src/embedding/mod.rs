//! Embedding provider abstraction.
//!
//! Same shape as [`crate::llm`]: an enum over concrete backends, built once
//! at startup by [`providers::build`] and cloned into the application state.
//! The knowledge index only ever calls [`EmbeddingProvider::embed`] and
//! [`EmbeddingProvider::embed_batch`].

pub mod providers;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("unknown embedding provider: {0}")]
    UnknownProvider(String),
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("embedding response mismatch: expected {expected} vectors, got {got}")]
    Mismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone)]
pub enum EmbeddingProvider {
    FastEmbed(providers::fast_embed::FastEmbedEmbedder),
    Hashing(providers::hashing::HashingEmbedder),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleEmbedder),
}

impl EmbeddingProvider {
    /// Embed a single text (used for queries).
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self {
            EmbeddingProvider::Hashing(p) => Ok(p.embed(text)),
            _ => {
                let mut vectors = self.embed_batch(&[text]).await?;
                vectors.pop().ok_or(EmbeddingError::Mismatch { expected: 1, got: 0 })
            }
        }
    }

    /// Embed many texts; the result has one vector per input, in input order.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self {
            EmbeddingProvider::FastEmbed(p) => p.embed_batch(texts).await,
            EmbeddingProvider::Hashing(p) => Ok(texts.iter().map(|t| p.embed(t)).collect()),
            EmbeddingProvider::OpenAiCompatible(p) => p.embed_batch(texts).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EmbeddingProvider::FastEmbed(_) => "fastembed",
            EmbeddingProvider::Hashing(_) => "hashing",
            EmbeddingProvider::OpenAiCompatible(_) => "openai",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_matches_single() {
        let p = EmbeddingProvider::Hashing(providers::hashing::HashingEmbedder::new(64));
        let batch = p.embed_batch(&["Dune", "Foundation"]).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], p.embed("Foundation").await.unwrap());
    }
}
