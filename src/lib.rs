//! Bookgraph RAG: question answering over a book knowledge graph.
//!
//! An RDF graph file is flattened into one-line fact documents, embedded
//! into an in-memory similarity index and aggregated into a per-book
//! metadata table. Chat questions retrieve the closest facts and hand them
//! to a language model; the rest of the HTTP surface searches, lists and
//! edits books.

pub mod config;
pub mod embedding;
pub mod error;
pub mod http;
pub mod knowledge;
pub mod llm;
pub mod logger;
pub mod state;

pub use error::AppError;
pub use state::AppState;
