//! Triple normalization and fact flattening.

use serde::Serialize;

/// One normalized (subject, predicate, object) row of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    /// Normalize raw term strings (full IRIs or literal values).
    pub fn from_terms(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: local_name(subject).to_string(),
            predicate: local_name(predicate).to_string(),
            object: local_name(object).to_string(),
        }
    }
}

/// A triple rendered as a short sentence, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactDocument {
    /// `"<subject> <predicate> <object>"`.
    pub content: String,
    pub triple: Triple,
}

impl FactDocument {
    pub fn new(triple: Triple) -> Self {
        let content = format!("{} {} {}", triple.subject, triple.predicate, triple.object);
        Self { content, triple }
    }
}

/// Text after the last `#`, else after the last `/`, else the input.
///
/// Applied to literals too, so a literal such as `"Sci-Fi/Fantasy"` comes
/// out as `"Fantasy"`.
pub fn local_name(term: &str) -> &str {
    if let Some(pos) = term.rfind('#') {
        &term[pos + 1..]
    } else if let Some(pos) = term.rfind('/') {
        &term[pos + 1..]
    } else {
        term
    }
}

/// Flatten one raw triple into a fact document.
pub fn flatten(subject: &str, predicate: &str, object: &str) -> FactDocument {
    FactDocument::new(Triple::from_terms(subject, predicate, object))
}
