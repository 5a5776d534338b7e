//! In-process sentence embeddings via `fastembed` (ONNX, AllMiniLML6V2).
//!
//! The model is fetched into the cache directory and loaded on first use,
//! so building the provider at startup never touches the network. Encoding
//! is CPU-bound and runs on the blocking pool.

use std::path::PathBuf;
use std::sync::Arc;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::embedding::EmbeddingError;

/// Vector size of AllMiniLML6V2.
pub const DIMENSIONS: usize = 384;

#[derive(Clone)]
pub struct FastEmbedEmbedder {
    cache_dir: Option<PathBuf>,
    batch_size: usize,
    model: Arc<OnceCell<Arc<TextEmbedding>>>,
}

impl std::fmt::Debug for FastEmbedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedEmbedder")
            .field("cache_dir", &self.cache_dir)
            .field("batch_size", &self.batch_size)
            .field("loaded", &self.model.initialized())
            .finish()
    }
}

impl FastEmbedEmbedder {
    pub fn new(cache_dir: Option<PathBuf>, batch_size: usize) -> Self {
        Self {
            cache_dir,
            batch_size: batch_size.max(1),
            model: Arc::new(OnceCell::new()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<Arc<TextEmbedding>, EmbeddingError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let cache_dir = self.cache_dir.clone();
                let loaded = tokio::task::spawn_blocking(move || {
                    let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                        .with_show_download_progress(false);
                    if let Some(dir) = cache_dir {
                        options = options.with_cache_dir(dir);
                    }
                    TextEmbedding::try_new(options)
                })
                .await
                .map_err(|e| EmbeddingError::Request(format!("model load task failed: {e}")))?
                .map_err(|e| EmbeddingError::Request(format!("AllMiniLML6V2 unavailable: {e}")))?;
                info!(cache_dir = ?self.cache_dir, "AllMiniLML6V2 loaded");
                Ok::<_, EmbeddingError>(Arc::new(loaded))
            })
            .await?;
        Ok(Arc::clone(model))
    }

    /// Embed `texts`, one 384-dim vector per input in input order.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model().await?;
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let batch_size = self.batch_size;
        debug!(count = owned.len(), "fastembed batch");

        let vectors = tokio::task::spawn_blocking(move || model.embed(owned, Some(batch_size)))
            .await
            .map_err(|e| EmbeddingError::Request(format!("embedding task failed: {e}")))?
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::Mismatch { expected: texts.len(), got: vectors.len() });
        }
        Ok(vectors)
    }
}
