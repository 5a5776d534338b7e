//! Per-subject attribute table folded from the triple stream.

use std::collections::{BTreeMap, HashMap};

use super::facts::Triple;

/// Attributes of one subject: predicate → last-seen object.
pub type Attributes = BTreeMap<String, String>;

/// subject → attributes, iterated in order of first appearance.
///
/// Single-valued by construction: a repeated (subject, predicate) pair keeps
/// the value seen last during the fold.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    order: Vec<String>,
    entries: HashMap<String, Attributes>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold triples into a fresh table.
    pub fn from_triples<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> Self {
        let mut table = Self::new();
        for t in triples {
            table.insert(&t.subject, &t.predicate, &t.object);
        }
        table
    }

    pub fn insert(&mut self, subject: &str, predicate: &str, object: &str) {
        if !self.entries.contains_key(subject) {
            self.order.push(subject.to_string());
        }
        self.entries
            .entry(subject.to_string())
            .or_default()
            .insert(predicate.to_string(), object.to_string());
    }

    pub fn get(&self, subject: &str) -> Option<&Attributes> {
        self.entries.get(subject)
    }

    /// Subjects and their attributes in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attributes)> {
        self.order
            .iter()
            .filter_map(|s| self.entries.get(s).map(|a| (s.as_str(), a)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
