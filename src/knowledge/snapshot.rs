//! One complete, immutable build of the knowledge layer.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::embedding::EmbeddingProvider;
use crate::error::AppError;

use super::facts::FactDocument;
use super::graph::RdfGraph;
use super::index::KnowledgeIndex;
use super::metadata::MetadataTable;

/// Graph, facts, metadata and index from a single load. Never mutated after
/// construction; a reload builds a new one.
#[derive(Debug, Clone)]
pub struct KnowledgeSnapshot {
    pub graph: RdfGraph,
    pub documents: Vec<FactDocument>,
    pub metadata: MetadataTable,
    pub index: KnowledgeIndex,
    pub loaded_at: DateTime<Utc>,
}

impl KnowledgeSnapshot {
    /// Parse the graph file and build everything from it.
    pub async fn load(path: &Path, embedder: EmbeddingProvider) -> Result<Self, AppError> {
        let owned: PathBuf = path.to_path_buf();
        let graph = tokio::task::spawn_blocking(move || RdfGraph::load(&owned))
            .await
            .map_err(|e| AppError::Server(format!("graph loader task failed: {e}")))??;
        let snapshot = Self::from_graph(graph, embedder).await?;
        info!(
            path = %path.display(),
            facts = snapshot.documents.len(),
            subjects = snapshot.metadata.len(),
            "knowledge snapshot built"
        );
        Ok(snapshot)
    }

    pub async fn from_graph(graph: RdfGraph, embedder: EmbeddingProvider) -> Result<Self, AppError> {
        let documents = graph.fact_documents();
        let metadata = MetadataTable::from_triples(documents.iter().map(|d| &d.triple));
        let index = KnowledgeIndex::build(documents.clone(), embedder).await?;
        Ok(Self { graph, documents, metadata, index, loaded_at: Utc::now() })
    }
}
