//! Process-wide application state.
//!
//! The live [`KnowledgeSnapshot`] sits behind a read-write lock as an `Arc`.
//! Readers clone the `Arc` and drop the lock straight away, so a request
//! works against one snapshot from start to finish. Reloads build the next
//! snapshot completely before taking the write lock for the swap; if the
//! build fails the old snapshot stays in place. A mutex keeps reloads (and
//! graph edits, which end in a reload) from interleaving.

use std::path::PathBuf;
use std::sync::Arc;

use oxigraph::io::RdfFormat;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::error::AppError;
use crate::knowledge::graph::{GraphView, NewBook, RdfGraph};
use crate::knowledge::{AnswerComposer, BookRecord, KnowledgeSnapshot, search, starters};
use crate::llm::{self, LlmProvider};

/// Settings fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub graph_path: PathBuf,
    pub top_k: usize,
    pub namespace: String,
}

struct Inner {
    settings: StateSettings,
    embedder: EmbeddingProvider,
    llm: LlmProvider,
    composer: AnswerComposer,
    snapshot: RwLock<Arc<KnowledgeSnapshot>>,
    reload_lock: Mutex<()>,
}

/// Cheap to clone: everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

/// Outcome of a successful reload.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadSummary {
    pub facts: usize,
    pub subjects: usize,
}

/// Counters reported by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub facts: usize,
    pub books: usize,
    pub llm: &'static str,
    pub embedder: &'static str,
    pub loaded_at: String,
}

impl AppState {
    /// Build providers from config and run the initial load.
    pub async fn init(config: &Config) -> Result<Self, AppError> {
        let llm = llm::providers::build(&config.llm, config.llm_api_key.clone())?;
        let embedder =
            embedding::providers::build(&config.embedding, config.embedding_api_key.clone())?;
        let composer = AnswerComposer::from_path(config.answer_template.as_deref())?;
        let settings = StateSettings {
            graph_path: config.knowledge.graph_path.clone(),
            top_k: config.knowledge.top_k.max(1),
            namespace: config.knowledge.namespace.clone(),
        };

        let snapshot = KnowledgeSnapshot::load(&settings.graph_path, embedder.clone()).await?;
        info!(llm = llm.name(), embedder = embedder.name(), "providers ready");
        Ok(Self::new(settings, embedder, llm, composer, snapshot))
    }

    pub fn new(
        settings: StateSettings,
        embedder: EmbeddingProvider,
        llm: LlmProvider,
        composer: AnswerComposer,
        snapshot: KnowledgeSnapshot,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                embedder,
                llm,
                composer,
                snapshot: RwLock::new(Arc::new(snapshot)),
                reload_lock: Mutex::new(()),
            }),
        }
    }

    /// The snapshot current at the time of the call.
    pub async fn snapshot(&self) -> Arc<KnowledgeSnapshot> {
        self.inner.snapshot.read().await.clone()
    }

    /// Re-run the load pipeline and swap the result in, all or nothing.
    pub async fn reload(&self) -> Result<ReloadSummary, AppError> {
        let _guard = self.inner.reload_lock.lock().await;
        self.reload_locked().await
    }

    async fn reload_locked(&self) -> Result<ReloadSummary, AppError> {
        let path = &self.inner.settings.graph_path;
        let next = match KnowledgeSnapshot::load(path, self.inner.embedder.clone()).await {
            Ok(next) => next,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "reload failed; keeping previous snapshot");
                return Err(e);
            }
        };
        let summary = ReloadSummary { facts: next.documents.len(), subjects: next.metadata.len() };
        *self.inner.snapshot.write().await = Arc::new(next);
        info!(facts = summary.facts, subjects = summary.subjects, "knowledge snapshot swapped");
        Ok(summary)
    }

    /// Answer `message` from retrieved facts via the language model.
    pub async fn chat(&self, message: &str, book_id: Option<&str>) -> Result<String, AppError> {
        if message.trim().is_empty() {
            return Err(AppError::BadRequest("message required".into()));
        }

        let snapshot = self.snapshot().await;
        let hits = snapshot.index.search(message, self.inner.settings.top_k).await?;
        let book = book_id
            .filter(|id| !id.is_empty())
            .and_then(|id| snapshot.metadata.get(id).map(|attrs| (id, attrs)));
        let prompt = self.inner.composer.compose(message, book, &hits);

        debug!(hits = hits.len(), book = ?book_id, prompt_len = prompt.len(), "prompt composed");
        Ok(self.inner.llm.complete(&prompt).await?)
    }

    pub async fn conversation_starters(&self, context: &str, book_id: Option<&str>) -> Vec<String> {
        let snapshot = self.snapshot().await;
        starters::conversation_starters(context, book_id, &snapshot.metadata)
    }

    pub async fn search_books(&self, theme: &str, author: &str) -> Vec<BookRecord> {
        let snapshot = self.snapshot().await;
        search::search_books(&snapshot.metadata, theme, author)
    }

    pub async fn list_books(&self) -> Vec<BookRecord> {
        search::list_books(&self.snapshot().await.metadata)
    }

    pub async fn book(&self, id: &str) -> Result<BookRecord, AppError> {
        search::find_book(&self.snapshot().await.metadata, id)
            .ok_or_else(|| AppError::NotFound(format!("book '{id}'")))
    }

    pub async fn graph_view(&self) -> GraphView {
        self.snapshot().await.graph.visualize()
    }

    /// Visualize an uploaded RDF/XML document without touching the live graph.
    pub fn visualize(&self, body: &[u8]) -> Result<GraphView, AppError> {
        let graph = RdfGraph::parse(body, RdfFormat::RdfXml, None)
            .map_err(|e| AppError::BadRequest(format!("invalid RDF/XML: {e}")))?;
        Ok(graph.visualize())
    }

    /// Write a book into the graph file, then reload so it is searchable.
    ///
    /// Re-reads the file rather than editing the live snapshot's graph, so
    /// edits made to the file since the last load are kept.
    pub async fn add_book(&self, book: NewBook) -> Result<String, AppError> {
        let _guard = self.inner.reload_lock.lock().await;

        let path = self.inner.settings.graph_path.clone();
        let namespace = self.inner.settings.namespace.clone();
        let id = tokio::task::spawn_blocking(move || -> Result<String, AppError> {
            let mut graph = if path.exists() { RdfGraph::load(&path)? } else { RdfGraph::default() };
            let id = graph.upsert_book(&namespace, &book)?;
            graph.save(&path)?;
            Ok(id)
        })
        .await
        .map_err(|e| AppError::Server(format!("graph writer task failed: {e}")))??;

        info!(book = %id, "book written to graph");
        self.reload_locked().await?;
        Ok(id)
    }

    pub async fn health(&self) -> Health {
        let snapshot = self.snapshot().await;
        Health {
            status: "ok",
            facts: snapshot.documents.len(),
            books: search::list_books(&snapshot.metadata).len(),
            llm: self.inner.llm.name(),
            embedder: self.inner.embedder.name(),
            loaded_at: snapshot.loaded_at.to_rfc3339(),
        }
    }
}
