//! In-memory similarity index over fact documents.
//!
//! Every document is embedded once at build time; a query is embedded on
//! demand and scored against all entries by cosine similarity. The corpus is
//! a few hundred short facts, so a linear scan is all it needs.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::AppError;

use super::facts::FactDocument;

#[derive(Debug, Clone)]
struct IndexEntry {
    document: FactDocument,
    embedding: Vec<f32>,
}

/// A retrieved fact with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredFact {
    pub document: FactDocument,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct KnowledgeIndex {
    embedder: EmbeddingProvider,
    entries: Vec<IndexEntry>,
}

impl KnowledgeIndex {
    /// Embed `documents` and build the index. An empty corpus yields an
    /// empty index without calling the embedder.
    pub async fn build(
        documents: Vec<FactDocument>,
        embedder: EmbeddingProvider,
    ) -> Result<Self, AppError> {
        if documents.is_empty() {
            return Ok(Self::empty(embedder));
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(AppError::Server(format!(
                "embedder returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let entries = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| IndexEntry { document, embedding })
            .collect::<Vec<_>>();
        debug!(entries = entries.len(), embedder = embedder.name(), "knowledge index built");
        Ok(Self { embedder, entries })
    }

    pub fn empty(embedder: EmbeddingProvider) -> Self {
        Self { embedder, entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `k` facts most similar to `query`, best first.
    ///
    /// Equal scores keep corpus order. Fewer than `k` documents returns them
    /// all.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredFact>, AppError> {
        if k == 0 {
            return Err(AppError::BadRequest("k must be at least 1".into()));
        }
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let mut scored: Vec<ScoredFact> = self
            .entries
            .iter()
            .map(|entry| ScoredFact {
                document: entry.document.clone(),
                score: cosine_similarity(&entry.embedding, &query_embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::providers::hashing::HashingEmbedder;
    use crate::knowledge::facts::flatten;

    fn embedder() -> EmbeddingProvider {
        EmbeddingProvider::Hashing(HashingEmbedder::new(1024))
    }

    fn corpus() -> Vec<FactDocument> {
        vec![
            flatten("B1", "hasTitle", "Dune"),
            flatten("B1", "hasTheme", "Science Fiction"),
            flatten("B2", "hasTheme", "Fantasy"),
        ]
    }

    #[tokio::test]
    async fn returns_all_when_k_exceeds_corpus() {
        let index = KnowledgeIndex::build(corpus(), embedder()).await.unwrap();
        let hits = index.search("books", 5).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn most_similar_first() {
        let index = KnowledgeIndex::build(corpus(), embedder()).await.unwrap();
        let hits = index.search("science fiction", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.content, "B1 hasTheme Science Fiction");
    }

    #[tokio::test]
    async fn ties_keep_corpus_order() {
        let index = KnowledgeIndex::build(corpus(), embedder()).await.unwrap();
        // No tokens at all: the query vector is zero, so every score is 0.
        let hits = index.search("?!", 3).await.unwrap();
        let order: Vec<&str> = hits.iter().map(|h| h.document.content.as_str()).collect();
        assert_eq!(
            order,
            vec!["B1 hasTitle Dune", "B1 hasTheme Science Fiction", "B2 hasTheme Fantasy"]
        );
    }

    #[tokio::test]
    async fn empty_corpus_returns_nothing() {
        let index = KnowledgeIndex::build(Vec::new(), embedder()).await.unwrap();
        assert!(index.is_empty());
        assert!(index.search("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_k_rejected() {
        let index = KnowledgeIndex::build(corpus(), embedder()).await.unwrap();
        let err = index.search("dune", 0).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
