//! Knowledge layer: everything derived from the graph file.
//!
//! Load pipeline, leaves first:
//!
//! ```text
//! graph file ──parse──▶ RdfGraph ──flatten──▶ Vec<FactDocument> ──embed──▶ KnowledgeIndex
//!                                   └─aggregate─▶ MetadataTable
//! ```
//!
//! [`snapshot::KnowledgeSnapshot`] bundles the four results; it is built
//! off to the side and swapped in whole by the application state.

pub mod composer;
pub mod facts;
pub mod graph;
pub mod index;
pub mod metadata;
pub mod search;
pub mod snapshot;
pub mod starters;

pub use composer::AnswerComposer;
pub use facts::{FactDocument, Triple};
pub use graph::RdfGraph;
pub use index::{KnowledgeIndex, ScoredFact};
pub use metadata::MetadataTable;
pub use search::BookRecord;
pub use snapshot::KnowledgeSnapshot;

/// Attribute names used by the book schema.
pub mod predicates {
    pub const TITLE: &str = "hasTitle";
    pub const AUTHOR: &str = "hasAuthor";
    pub const THEME: &str = "hasTheme";
    pub const LEVEL: &str = "suitableForLevel";
    /// `rdf:type` after normalization.
    pub const TYPE: &str = "type";
}

/// Placeholder for attributes a book does not carry.
pub const UNKNOWN: &str = "Unknown";
