//! Embedding provider implementations.

pub mod fast_embed;
pub mod hashing;
pub mod openai_compatible;

use crate::config::EmbeddingConfig;
use crate::embedding::{EmbeddingError, EmbeddingProvider};

/// Construct an `EmbeddingProvider` from config and an optional API key
/// (`EMBEDDING_API_KEY` env).
pub fn build(
    config: &EmbeddingConfig,
    api_key: Option<String>,
) -> Result<EmbeddingProvider, EmbeddingError> {
    match config.provider.as_str() {
        "fastembed" => Ok(EmbeddingProvider::FastEmbed(fast_embed::FastEmbedEmbedder::new(
            config.fastembed.cache_dir.clone(),
            config.fastembed.batch_size,
        ))),
        "hashing" => Ok(EmbeddingProvider::Hashing(hashing::HashingEmbedder::new(
            config.hashing_dimensions,
        ))),
        "openai" | "openai-compatible" | "ollama" => {
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleEmbedder::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(EmbeddingProvider::OpenAiCompatible(p))
        }
        _ => Err(EmbeddingError::UnknownProvider(config.provider.clone())),
    }
}
